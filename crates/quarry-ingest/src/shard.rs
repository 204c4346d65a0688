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

//! Deterministic shard routing. Each file in a dataset is owned by exactly
//! one shard, chosen purely from its filename and the shard count.

use crate::error::IngestError;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut h = FNV_OFFSET;
    for b in bytes {
        h ^= u64::from(*b);
        h = h.wrapping_mul(FNV_PRIME);
    }
    h
}

/// Assign `filename` to a shard in `[0, total_shards)`.
///
/// Jump consistent hash (Lamping–Veach) over an FNV-1a hash of the
/// filename: growing the shard count by one relocates roughly
/// `1/total_shards` of the keys instead of reshuffling everything.
/// Deterministic and side-effect-free; safe from any number of concurrent
/// callers. Callers should treat the shard count as fixed per dataset;
/// nothing here migrates previously assigned keys.
pub fn shard_for(filename: &str, total_shards: u32) -> Result<u32, IngestError> {
    if total_shards == 0 {
        return Err(IngestError::Configuration(
            "shard count must be at least 1".to_string(),
        ));
    }
    let mut key = fnv1a(filename.as_bytes());
    let mut b: i64 = -1;
    let mut j: i64 = 0;
    while j < i64::from(total_shards) {
        b = j;
        key = key.wrapping_mul(2_862_933_555_777_941_757).wrapping_add(1);
        j = ((b.wrapping_add(1)) as f64 * ((1u64 << 31) as f64 / ((key >> 33).wrapping_add(1) as f64)))
            as i64;
    }
    Ok(b as u32)
}
