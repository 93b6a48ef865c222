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

//! # Palaver Broadcast Hub
//!
//! The hub is the process-wide coordinator of the Palaver chat server. It
//! owns the roster of live sessions keyed by username, accepts TCP
//! connections, spawns one session task per connection, and fans chat
//! traffic out by channel.
//!
//! ## Responsibilities
//!
//! - **Admission**: usernames are unique across the roster; the handshake
//!   consults the hub through [`UsernameDirectory`] and admission re-checks
//!   under the roster lock.
//! - **Broadcast**: messages are delivered to every session on the matching
//!   channel whose ignore list does not name the sender. Delivery failures
//!   deterministically remove the failed session.
//! - **Chat log**: every accepted chat message is appended to a durable
//!   record-separated log; events are never logged.
//! - **Teardown**: a session signals `done` once; the hub closes the stream
//!   exactly once and announces the departure to the remaining roster.
//!
//! [`UsernameDirectory`]: palaver_session::UsernameDirectory

#![warn(missing_docs, future_incompatible, rust_2018_idioms)]

mod chatlog;
mod config;
mod hub;
mod palette;
mod result;

pub use self::chatlog::{ChatLog, RECORD_SEPARATOR};
pub use self::config::{HubConfig, DEFAULT_USERNAME_COLORS};
pub use self::hub::{BroadcastKind, Hub};
pub use self::palette::ColorPalette;
pub use self::result::{HubError, HubResult};
