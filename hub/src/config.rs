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

//! Hub configuration

/// The default username palette, applied round-robin as sessions join.
pub const DEFAULT_USERNAME_COLORS: [&str; 12] = [
    "red", "green", "brown", "blue", "purple", "cyan", "orange", "lime", "yellow", "indigo",
    "fuschia", "aqua",
];

/// Hub configuration
///
/// # Example
///
/// ```
/// use palaver_hub::HubConfig;
///
/// let config = HubConfig::default()
///     .with_session_buffer_size(50)
///     .with_default_channel("lobby");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Number of rendered lines each session buffers for redraws
    pub session_buffer_size: usize,

    /// Minimum trimmed length a message needs to be logged and delivered
    pub minimum_message_length: usize,

    /// The channel a session lands in after its handshake
    pub default_channel: String,

    /// Palette of username color names, applied round-robin
    pub username_colors: Vec<String>,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            session_buffer_size: 20,
            minimum_message_length: 1,
            default_channel: "general".to_string(),
            username_colors: DEFAULT_USERNAME_COLORS
                .iter()
                .map(|color| color.to_string())
                .collect(),
        }
    }
}

impl HubConfig {
    /// Set the per-session scrollback capacity
    pub fn with_session_buffer_size(mut self, size: usize) -> Self {
        self.session_buffer_size = size;
        self
    }

    /// Set the minimum message length
    pub fn with_minimum_message_length(mut self, length: usize) -> Self {
        self.minimum_message_length = length;
        self
    }

    /// Set the channel new sessions land in
    pub fn with_default_channel(mut self, channel: impl Into<String>) -> Self {
        self.default_channel = channel.into();
        self
    }

    /// Set the username color palette
    pub fn with_username_colors(mut self, colors: Vec<String>) -> Self {
        self.username_colors = colors;
        self
    }

    /// Validate the configuration
    ///
    /// Returns an error message if the configuration is unusable.
    pub fn validate(&self) -> Result<(), String> {
        if self.session_buffer_size == 0 {
            return Err("session_buffer_size must be greater than 0".to_string());
        }

        if self.default_channel.trim().is_empty() {
            return Err("default_channel must not be empty".to_string());
        }

        if self.username_colors.is_empty() {
            return Err("username_colors must not be empty".to_string());
        }

        Ok(())
    }
}
