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

//! The per-shard persistence seam. The pipeline treats each shard store as
//! an opaque target; retry policy and on-disk format live behind it.

use std::error::Error;
use std::fmt::{self, Display};

use crate::import::{FileRecord, SourceMeta};

/// Failure writing to a shard store. `fatal` distinguishes a store that
/// cannot accept any further writes from a single rejected file.
#[derive(Debug)]
pub struct StoreError {
    pub message: String,
    pub fatal: bool,
}

impl StoreError {
    pub fn per_file(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            fatal: false,
        }
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            fatal: true,
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for StoreError {}

/// An independently-owned storage partition holding a subset of a
/// dataset's files. Consistency for concurrent writes to the same path is
/// owned by the implementation; the pipeline never writes one path to two
/// shards.
pub trait ShardStore {
    fn persist(
        &mut self,
        dataset: &str,
        record: &FileRecord,
        content: &[u8],
        meta: &SourceMeta,
    ) -> Result<(), StoreError>;
}

/// One write captured by [`MemShardStore`].
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub dataset: String,
    pub path: String,
    pub content_hash: String,
    pub size_bytes: u64,
    pub shard: u32,
    pub parsed: bool,
    pub content: Vec<u8>,
    pub meta: SourceMeta,
}

/// In-memory shard store used by tests and the demo binary.
#[derive(Debug, Default)]
pub struct MemShardStore {
    pub writes: Vec<StoredFile>,
}

impl ShardStore for MemShardStore {
    fn persist(
        &mut self,
        dataset: &str,
        record: &FileRecord,
        content: &[u8],
        meta: &SourceMeta,
    ) -> Result<(), StoreError> {
        self.writes.push(StoredFile {
            dataset: dataset.to_string(),
            path: record.path.clone(),
            content_hash: record.content_hash.clone(),
            size_bytes: record.size_bytes,
            shard: record.shard,
            parsed: record.parse.is_some(),
            content: content.to_vec(),
            meta: meta.clone(),
        });
        Ok(())
    }
}
