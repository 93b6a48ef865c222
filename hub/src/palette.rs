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

//! Round-robin username color assignment

use std::collections::VecDeque;
use std::sync::Mutex;

/// A circular queue of color names.
///
/// Each call to [`next_color`](ColorPalette::next_color) returns the head and
/// rotates it to the tail, so colors are handed out as evenly as possible.
/// The palette may be smaller than the roster; repeats are expected, the
/// goal is diversity rather than uniqueness.
#[derive(Debug)]
pub struct ColorPalette {
    colors: Mutex<VecDeque<String>>,
}

impl ColorPalette {
    /// Builds a palette from the given color names.
    pub fn new(colors: impl IntoIterator<Item = String>) -> Self {
        ColorPalette {
            colors: Mutex::new(colors.into_iter().collect()),
        }
    }

    /// Returns the next color in rotation. An empty palette falls back to
    /// fuschia rather than failing admission.
    pub fn next_color(&self) -> String {
        let mut colors = self.colors.lock().unwrap();
        match colors.pop_front() {
            Some(color) => {
                colors.push_back(color.clone());
                color
            }
            None => "fuschia".to_string(),
        }
    }
}
