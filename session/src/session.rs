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

//! Session capability trait and handshake channel bundle

use crate::message::Message;
use crate::result::{SessionError, SessionResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

/// The channels a started session exposes to the hub.
///
/// `messages` and `events` carry chat traffic; `done` receives exactly one
/// value when the session terminates, after which no further traffic is sent.
pub struct SessionChannels {
    /// Chat messages produced from user input.
    pub messages: mpsc::Receiver<Message>,
    /// Hub-level events produced by the session.
    pub events: mpsc::Receiver<Message>,
    /// Termination signal carrying the reason the session ended.
    pub done: mpsc::Receiver<SessionError>,
}

/// Username admission check consulted during the handshake.
///
/// The hub implements this over its roster; the lookup runs under the same
/// lock that guards roster mutation so admission stays linearizable.
#[async_trait]
pub trait UsernameDirectory: Send + Sync {
    /// Returns true when `username` is free to claim.
    async fn username_available(&self, username: &str) -> bool;
}

/// Capability set every chat session variant provides.
///
/// The telnet variant in this crate is the only shipped implementation; the
/// trait is the seam where other transports would plug in. All methods are
/// callable from any task: identity and routing accessors take snapshots of
/// interior state, and delivery methods serialize on the session's writer.
#[async_trait]
pub trait ChatSession: Send + Sync {
    /// The username claimed during the handshake. Stable once assigned.
    fn username(&self) -> String;

    /// The palette color name assigned at construction.
    fn username_color(&self) -> String;

    /// The channel this session currently listens on.
    fn channel(&self) -> String;

    /// Snapshot of the ignore list. An entry that is present and `true`
    /// means the named user is ignored; missing or `false` means not.
    fn ignore_list(&self) -> HashMap<String, bool>;

    /// Runs the transport handshake, spawns the input loop, and returns the
    /// hub-facing channels. Must be called at most once.
    async fn start(
        self: Arc<Self>,
        directory: Arc<dyn UsernameDirectory>,
    ) -> SessionResult<SessionChannels>;

    /// Renders a chat message to this session's display.
    async fn send_message(&self, message: &Message) -> SessionResult<()>;

    /// Renders an event line to this session's display.
    async fn send_event(&self, event: &Message) -> SessionResult<()>;

    /// Tears down the underlying stream. Idempotent; after the first call
    /// no further writes are attempted.
    async fn close(&self) -> SessionResult<()>;
}
