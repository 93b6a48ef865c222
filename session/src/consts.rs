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

//! Wire-level constants: telnet control octets, ANSI escape sequences, and
//! the username color table.

/// Size of the fixed read buffer used by the input loop and the handshake.
/// Client lines and telnet control sequences are both expected to fit.
pub const READ_BUFFER_SIZE: usize = 128;

/// Telnet control octets (RFC 854) recognized by the session handshake.
pub mod telnet {
    /// Interpret As Command; prefixes every telnet control sequence.
    pub const IAC: u8 = 255;
    /// Demand the other party disable an option.
    pub const DONT: u8 = 254;
    /// Request the other party enable an option.
    pub const DO: u8 = 253;
    /// Refuse to enable an option locally.
    pub const WONT: u8 = 252;
    /// Offer to enable an option locally.
    pub const WILL: u8 = 251;
    /// Subnegotiation Begin.
    pub const SB: u8 = 250;
    /// Subnegotiation End.
    pub const SE: u8 = 240;
    /// Negotiate About Window Size option code (RFC 1073).
    pub const NAWS: u8 = 31;
}

/// CSI sequences used to drive the client terminal.
pub mod ansi {
    /// Clear the entire screen.
    pub const CLEAR_SCREEN: &str = "\x1b[2J";
    /// Move the cursor to the top-left corner.
    pub const CURSOR_HOME: &str = "\x1b[0;0H";
    /// Clear from the cursor to the end of the line.
    pub const CLEAR_LINE: &str = "\x1b[K";
    /// Save the current cursor position.
    pub const SAVE_CURSOR: &str = "\x1b[s";
    /// Restore the previously saved cursor position.
    pub const RESTORE_CURSOR: &str = "\x1b[u";
    /// Foreground color for message bodies (bright white).
    pub const MESSAGE_COLOR: &str = "\x1b[1;37m";
    /// Foreground color for events and chrome (bright black).
    pub const EVENT_COLOR: &str = "\x1b[1;30m";
}

/// Maps a palette color name to its ANSI foreground sequence.
///
/// Unrecognized names fall back to fuschia so a misconfigured palette still
/// renders rather than corrupting the frame.
pub fn username_color(name: &str) -> &'static str {
    match name {
        "red" => "\x1b[0;31m",
        "orange" => "\x1b[1;31m",
        "green" => "\x1b[0;32m",
        "lime" => "\x1b[1;32m",
        "brown" => "\x1b[0;33m",
        "yellow" => "\x1b[1;33m",
        "blue" => "\x1b[0;34m",
        "indigo" => "\x1b[1;34m",
        "purple" => "\x1b[0;35m",
        "fuschia" => "\x1b[1;35m",
        "cyan" => "\x1b[0;36m",
        "aqua" => "\x1b[1;36m",
        _ => "\x1b[1;35m",
    }
}
