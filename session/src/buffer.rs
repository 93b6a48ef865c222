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

//! Bounded newest-first line buffer backing session redraws

use std::collections::VecDeque;

/// A bounded buffer of rendered lines, newest first.
///
/// Holds the most recent `capacity` lines a session has displayed. New lines
/// are inserted at the front and the oldest line is evicted once the buffer
/// is full. Newest-first ordering matches the redraw loop, which paints the
/// terminal bottom-up: row `height - 1 - i` displays `line(i)`.
#[derive(Debug, Clone)]
pub struct ScrollbackBuffer {
    capacity: usize,
    lines: VecDeque<String>,
}

impl ScrollbackBuffer {
    /// Creates an empty buffer holding at most `capacity` lines.
    pub fn new(capacity: usize) -> Self {
        ScrollbackBuffer {
            capacity,
            lines: VecDeque::with_capacity(capacity),
        }
    }

    /// Inserts `line` as the newest entry, evicting the oldest entry if the
    /// buffer is at capacity.
    pub fn push(&mut self, line: String) {
        self.lines.push_front(line);
        self.lines.truncate(self.capacity);
    }

    /// Returns the line at `index`, where 0 is the newest line.
    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    /// Number of lines currently held. Always `<= capacity`.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// True when no lines are held.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Maximum number of lines this buffer will hold.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterates lines newest-first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_inserts_newest_first() {
        let mut buffer = ScrollbackBuffer::new(5);
        buffer.push("one".to_string());
        buffer.push("two".to_string());
        assert_eq!(buffer.line(0), Some("two"));
        assert_eq!(buffer.line(1), Some("one"));
        assert_eq!(buffer.line(2), None);
    }

    #[test]
    fn eviction_drops_oldest() {
        let mut buffer = ScrollbackBuffer::new(3);
        for line in ["a", "b", "c", "d"] {
            buffer.push(line.to_string());
        }
        assert_eq!(buffer.len(), 3);
        let held: Vec<&str> = buffer.iter().collect();
        assert_eq!(held, ["d", "c", "b"]);
    }

    #[test]
    fn length_never_exceeds_capacity() {
        let capacity = 10;
        let mut buffer = ScrollbackBuffer::new(capacity);
        for n in 0..100 {
            buffer.push(format!("line {n}"));
            assert!(buffer.len() <= capacity);
        }
    }

    #[test]
    fn holds_last_k_lines_newest_first() {
        let capacity = 7;
        let total = 25;
        let mut buffer = ScrollbackBuffer::new(capacity);
        for n in 0..total {
            buffer.push(format!("line {n}"));
        }
        let held: Vec<String> = buffer.iter().map(str::to_string).collect();
        let expected: Vec<String> = (total - capacity..total)
            .rev()
            .map(|n| format!("line {n}"))
            .collect();
        assert_eq!(held, expected);
    }

    #[test]
    fn zero_capacity_holds_nothing() {
        let mut buffer = ScrollbackBuffer::new(0);
        buffer.push("dropped".to_string());
        assert!(buffer.is_empty());
    }
}
