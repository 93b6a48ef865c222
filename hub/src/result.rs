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

//! Error types for the hub

use thiserror::Error;

/// Result type for hub operations
pub type HubResult<T> = std::result::Result<T, HubError>;

/// Hub error types
#[derive(Debug, Error)]
pub enum HubError {
    /// I/O error from the listener or an accepted stream
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A chat log write failed. The broadcast that surfaced this still
    /// completed; only the durable record is missing.
    #[error("chat log write failed: {0}")]
    ChatLog(#[source] std::io::Error),

    /// The configuration failed validation
    #[error("invalid configuration: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_stable() {
        let err = HubError::Config("empty palette".to_string());
        assert_eq!(err.to_string(), "invalid configuration: empty palette");
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::AddrInUse, "busy");
        assert!(matches!(HubError::from(io), HubError::Io(_)));
    }
}
