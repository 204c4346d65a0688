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

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use crate::parse::ParseResult;

/// Where an import came from. Travels with every store write so shards
/// can attribute content to a source snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMeta {
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub branch: Option<String>,
    pub imported_at: DateTime<Utc>,
}

impl SourceMeta {
    pub fn now() -> Self {
        Self {
            owner: None,
            repo: None,
            branch: None,
            imported_at: Utc::now(),
        }
    }
}

/// One tracked file within a dataset.
///
/// `content_hash` is always the Git blob SHA-1 of the content this record
/// describes; the record is replaced as a unit whenever that content
/// changes, never field by field.
#[derive(Debug, Clone)]
pub struct FileRecord {
    pub path: String,
    pub content_hash: String,
    pub size_bytes: u64,
    pub last_imported_at: DateTime<Utc>,
    pub shard: u32,
    /// Absent when no grammar matched the file; not an error state.
    pub parse: Option<Arc<ParseResult>>,
}

/// Per-dataset table of tracked files, keyed by dataset-relative path.
/// The caller owns one catalog per dataset and passes it to each import.
#[derive(Debug, Default)]
pub struct Catalog {
    records: HashMap<String, FileRecord>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<&FileRecord> {
        self.records.get(path)
    }

    /// Replace (or create) the record for `record.path` as a unit. Only
    /// called after the owning shard accepted the write.
    pub(crate) fn replace(&mut self, record: FileRecord) {
        self.records.insert(record.path.clone(), record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// What happened to one tarball entry during an import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    /// New or changed content, written to its shard.
    Imported,
    /// Content hash matched the existing record; nothing was re-done.
    Unchanged,
    /// The owning shard rejected the write; the file is not counted.
    StoreFailed(String),
}

/// Per-file outcome, aggregated into the batch summary instead of thrown.
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub path: String,
    pub shard: u32,
    pub status: FileStatus,
    /// Whether this run parsed the file. False for unchanged files and
    /// for files with no matching grammar.
    pub parsed: bool,
}

/// Totals for one import run. `files_imported` and `total_size_bytes`
/// count exactly the files resident in a shard: written by this run, or
/// by an earlier run for unchanged paths.
#[derive(Debug, Default)]
pub struct ImportSummary {
    pub files_imported: usize,
    pub total_size_bytes: u64,
    pub outcomes: Vec<FileOutcome>,
}

/// Options for one import run.
pub struct ImportOptions<'a> {
    pub dataset: &'a str,
    /// Only entries whose path begins with this prefix are imported; the
    /// prefix is stripped to form the dataset-relative path.
    pub path_prefix: &'a str,
    pub meta: SourceMeta,
    pub shard_count: u32,
    /// Entries larger than this are skipped.
    pub max_file_size: usize,
    pub fetch_timeout: Duration,
    /// Cooperative cancellation, checked between entries. When set the
    /// pipeline stops consuming the stream and returns the totals
    /// accumulated so far; no per-file write is left half-applied.
    pub cancel: Option<&'a AtomicBool>,
}

impl<'a> ImportOptions<'a> {
    pub fn builder() -> ImportOptionsBuilder<'a> {
        ImportOptionsBuilder::default()
    }
}

#[derive(Default)]
pub struct ImportOptionsBuilder<'a> {
    dataset: Option<&'a str>,
    path_prefix: Option<&'a str>,
    meta: Option<SourceMeta>,
    shard_count: Option<u32>,
    max_file_size: Option<usize>,
    fetch_timeout: Option<Duration>,
    cancel: Option<&'a AtomicBool>,
}

impl<'a> ImportOptionsBuilder<'a> {
    pub fn dataset(mut self, dataset: &'a str) -> Self {
        self.dataset = Some(dataset);
        self
    }
    pub fn path_prefix(mut self, prefix: &'a str) -> Self {
        self.path_prefix = Some(prefix);
        self
    }
    pub fn meta(mut self, meta: SourceMeta) -> Self {
        self.meta = Some(meta);
        self
    }
    pub fn shard_count(mut self, n: u32) -> Self {
        self.shard_count = Some(n);
        self
    }
    pub fn max_file_size(mut self, sz: usize) -> Self {
        self.max_file_size = Some(sz);
        self
    }
    pub fn fetch_timeout(mut self, t: Duration) -> Self {
        self.fetch_timeout = Some(t);
        self
    }
    pub fn cancel(mut self, flag: &'a AtomicBool) -> Self {
        self.cancel = Some(flag);
        self
    }
    pub fn build(self) -> ImportOptions<'a> {
        ImportOptions {
            dataset: self.dataset.expect("dataset required"),
            path_prefix: self.path_prefix.unwrap_or(""),
            meta: self.meta.unwrap_or_else(SourceMeta::now),
            shard_count: self.shard_count.expect("shard_count required"),
            max_file_size: self.max_file_size.unwrap_or(1_000_000),
            fetch_timeout: self.fetch_timeout.unwrap_or(Duration::from_secs(30)),
            cancel: self.cancel,
        }
    }
}
