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

//! Durable chat log serialization

use palaver_session::Message;
use std::io::Write;
use std::sync::Mutex;

/// Field separator between record columns: ASCII RECORD SEPARATOR.
pub const RECORD_SEPARATOR: u8 = 0x1e;

/// Append-only chat log over an arbitrary byte sink.
///
/// One record per chat message, written as a single call on the sink:
/// `<unix_nanos> RS <channel> RS <username> RS <body>` with no trailing
/// newline; the sanitized body carries its own CRLF. The sink lives for the
/// whole process; the hub never closes it.
pub struct ChatLog {
    sink: Mutex<Box<dyn Write + Send>>,
}

impl ChatLog {
    /// Wraps `sink` in a serialized chat log.
    pub fn new(sink: Box<dyn Write + Send>) -> Self {
        ChatLog {
            sink: Mutex::new(sink),
        }
    }

    /// Appends one record for `message`. The sink mutex is held only for
    /// the single write.
    pub fn append(&self, message: &Message) -> std::io::Result<()> {
        let record = format!(
            "{}\u{1e}{}\u{1e}{}\u{1e}{}",
            message.timestamp_nanos(),
            message.channel(),
            message.from().username(),
            message.body(),
        );
        let mut sink = self.sink.lock().unwrap();
        sink.write_all(record.as_bytes())
    }
}

impl std::fmt::Debug for ChatLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatLog").finish_non_exhaustive()
    }
}
