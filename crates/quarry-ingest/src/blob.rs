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

//! Git-compatible content addressing used for change detection.

use sha1::{Digest, Sha1};

/// Compute the Git blob object hash of `content`: SHA-1 over
/// `"blob " + decimal length + NUL + content`, rendered as lowercase hex.
///
/// Bit-exact with `git hash-object`, so stored hashes compare directly
/// against blob SHAs reported by GitHub's API without re-derivation.
pub fn blob_hash(content: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(b"blob ");
    hasher.update(content.len().to_string().as_bytes());
    hasher.update([0u8]);
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

/// Recompute the canonical hash of `content` and compare with `expected`.
/// No shortcut comparisons; this cannot drift from [`blob_hash`].
pub fn hash_matches(content: &[u8], expected: &str) -> bool {
    blob_hash(content) == expected
}
