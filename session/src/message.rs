//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Chat message value type and input sanitization

use crate::session::ChatSession;
use chrono::{DateTime, Local};
use std::sync::Arc;

/// An immutable chat message or event.
///
/// Messages are created once and never mutated; they live from hub receipt
/// until the last receiver has rendered them. The originating session rides
/// along so receivers can format the sender line and the hub can honor
/// per-receiver ignore lists.
#[derive(Clone)]
pub struct Message {
    timestamp: DateTime<Local>,
    from: Arc<dyn ChatSession>,
    channel: String,
    body: String,
}

impl Message {
    /// Creates a message on `channel` from `from`, stamping it with the
    /// current wall-clock time.
    pub fn new(body: impl Into<String>, channel: impl Into<String>, from: Arc<dyn ChatSession>) -> Self {
        Message {
            timestamp: Local::now(),
            from,
            channel: channel.into(),
            body: body.into(),
        }
    }

    /// The wall-clock time captured at construction.
    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    /// The timestamp as nanoseconds since the Unix epoch, for the chat log.
    pub fn timestamp_nanos(&self) -> i64 {
        self.timestamp.timestamp_nanos_opt().unwrap_or_default()
    }

    /// The session that produced this message.
    pub fn from(&self) -> &Arc<dyn ChatSession> {
        &self.from
    }

    /// The channel this message is addressed to.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// The message body.
    pub fn body(&self) -> &str {
        &self.body
    }
}

impl std::fmt::Debug for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Message")
            .field("timestamp", &self.timestamp)
            .field("from", &self.from.username())
            .field("channel", &self.channel)
            .field("body", &self.body)
            .finish()
    }
}

/// Strips a raw input buffer down to displayable chat text.
///
/// Retains CR, LF, and printable ASCII (32-126); everything else is dropped,
/// including any escape sequences a client pastes into the compose line.
/// Idempotent: sanitizing already-sanitized text is a no-op.
pub fn sanitize(input: &[u8]) -> String {
    input
        .iter()
        .copied()
        .filter(|&byte| byte == b'\r' || byte == b'\n' || (32..=126).contains(&byte))
        .map(char::from)
        .collect()
}
