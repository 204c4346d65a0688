// Copyright 2025 Quarry Project
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Map a search-result snippet back to its 1-based source line for
//! highlighting. Pure text scanning; no index involved.

/// Resolve the first line of `content` that carries `snippet`.
///
/// Two passes, first match wins: an exact substring scan, then a fuzzy
/// word-overlap scan for snippets whose whitespace or quoting was
/// normalized by the search layer. Snippets shorter than 3 characters are
/// rejected outright as too ambiguous. `None` means "highlight
/// unavailable", never a failure.
pub fn find_line_number(content: &str, snippet: &str) -> Option<usize> {
    if snippet.chars().count() < 3 {
        return None;
    }

    for (i, line) in content.lines().enumerate() {
        if line.contains(snippet) {
            return Some(i + 1);
        }
    }

    // Fuzzy pass: up to the first 3 tokens longer than 2 chars must mostly
    // reappear on a single line.
    let tokens: Vec<&str> = snippet
        .split_whitespace()
        .filter(|t| t.chars().count() > 2)
        .take(3)
        .collect();
    if tokens.is_empty() {
        return None;
    }
    let needed = (tokens.len() as f64 * 0.6).ceil() as usize;
    for (i, line) in content.lines().enumerate() {
        let hits = tokens.iter().filter(|t| line.contains(*t)).count();
        if hits >= needed {
            return Some(i + 1);
        }
    }
    None
}
