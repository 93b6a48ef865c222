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

//! # Palaver Session Engine
//!
//! This crate provides the per-connection session layer of the Palaver chat
//! server. Each accepted connection is wrapped in a session that owns the
//! byte stream, negotiates terminal capabilities, and turns raw client input
//! into structured chat traffic for the hub.
//!
//! ## Core Components
//!
//! ### [`ChatSession`]
//!
//! The capability trait every session variant implements: identity
//! (`username`, `username_color`), routing state (`channel`, `ignore_list`),
//! the channel handshake (`start`), outgoing delivery (`send_message`,
//! `send_event`), and teardown (`close`). The hub only ever talks to
//! `Arc<dyn ChatSession>`, so additional transports can be added without
//! touching the broadcast layer.
//!
//! ### [`TelnetSession`]
//!
//! The telnet/ANSI variant, and the only transport this crate ships. It
//! negotiates the NAWS option (RFC 1073) to learn the terminal size, prompts
//! for a username, sanitizes inbound bytes, parses slash commands, and keeps
//! a scrolling virtual-terminal display repainted with CSI sequences.
//!
//! ### [`Message`]
//!
//! The immutable value exchanged between sessions and the hub: a body, the
//! originating session, a channel name, and a wall-clock timestamp captured
//! at construction.
//!
//! ## Concurrency Contract
//!
//! [`ChatSession::start`] runs the handshake inline, then spawns the input
//! loop as an independent task and hands back three receivers:
//!
//! - `messages` and `events` are capacity-1 bounded channels; the input task
//!   blocks until the hub accepts each item, so a slow hub slows every
//!   session uniformly instead of buffering unboundedly.
//! - `done` is capacity-1 and receives exactly one value when the session
//!   terminates, so teardown never blocks on a hub that has moved on.

#![warn(missing_docs, future_incompatible, rust_2018_idioms)]

mod buffer;
mod consts;
mod message;
mod result;
mod session;
mod telnet;

pub use self::buffer::ScrollbackBuffer;
pub use self::consts::{ansi, telnet as telnet_bytes, username_color, READ_BUFFER_SIZE};
pub use self::message::{sanitize, Message};
pub use self::result::{SessionError, SessionResult};
pub use self::session::{ChatSession, SessionChannels, UsernameDirectory};
pub use self::telnet::{TelnetSession, WindowSize};
