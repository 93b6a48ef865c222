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

//! Error types for the session layer

use thiserror::Error;

/// Result type for session operations
pub type SessionResult<T> = std::result::Result<T, SessionError>;

/// Session error types
///
/// Every variant is terminal for the session that produced it; errors are
/// reported to the hub over the `done` channel rather than propagated across
/// the session boundary.
#[derive(Debug, Error)]
pub enum SessionError {
    /// I/O error on the underlying byte stream
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The peer closed the connection
    #[error("peer disconnected")]
    Disconnected,

    /// The session was closed locally; no further writes are attempted
    #[error("session closed")]
    Closed,

    /// `start` was called more than once on the same session
    #[error("session already started")]
    AlreadyStarted,

    /// The hub dropped its receiver before the session finished
    #[error("hub receiver dropped")]
    HubGone,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe");
        let err = SessionError::from(io);
        assert!(matches!(err, SessionError::Io(_)));
    }

    #[test]
    fn display_is_stable() {
        assert_eq!(SessionError::Disconnected.to_string(), "peer disconnected");
        assert_eq!(SessionError::Closed.to_string(), "session closed");
    }
}
