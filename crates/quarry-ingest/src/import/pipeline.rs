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

//! The import orchestrator: streams a source tarball, detects changed
//! files, parses them, and forwards each file to its owning shard.

use std::io::{BufRead, BufReader, Read};
use std::sync::atomic::Ordering;
use std::sync::Arc;

use flate2::read::GzDecoder;
use tracing::{debug, warn};

use crate::blob::blob_hash;
use crate::error::IngestError;
use crate::import::types::{
    Catalog, FileOutcome, FileRecord, FileStatus, ImportOptions, ImportSummary,
};
use crate::parse::{GrammarRegistry, ParseError, ParseResult};
use crate::shard::shard_for;
use crate::store::ShardStore;

/// Fetch `url` and run the tarball through [`import_from_reader`].
///
/// Transport concerns beyond a plain GET (retry, auth, redirects policy)
/// belong to the caller; a transport error or non-success status is a
/// [`IngestError::SourceFetch`] and nothing has been written.
pub fn import_from_url<S: ShardStore>(
    url: &str,
    opts: &ImportOptions<'_>,
    catalog: &mut Catalog,
    stores: &mut [S],
    grammars: &GrammarRegistry,
) -> Result<ImportSummary, IngestError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(opts.fetch_timeout)
        .build()
        .map_err(|e| IngestError::SourceFetch(e.to_string()))?;
    let resp = client
        .get(url)
        .send()
        .map_err(|e| IngestError::SourceFetch(format!("{}: {}", url, e)))?;
    if !resp.status().is_success() {
        return Err(IngestError::SourceFetch(format!(
            "{}: HTTP {}",
            url,
            resp.status()
        )));
    }
    import_from_reader(resp, opts, catalog, stores, grammars)
}

/// Run one import over a tar byte stream, optionally gzip-compressed.
///
/// Entries are processed strictly in stream order and the archive is
/// never buffered whole. Per-file problems (no grammar, parse failure, a
/// per-file store rejection) are recorded as outcomes and the stream
/// continues; a corrupt stream or a fatal store failure aborts with `Err`.
pub fn import_from_reader<R: Read, S: ShardStore>(
    source: R,
    opts: &ImportOptions<'_>,
    catalog: &mut Catalog,
    stores: &mut [S],
    grammars: &GrammarRegistry,
) -> Result<ImportSummary, IngestError> {
    if opts.shard_count == 0 {
        return Err(IngestError::Configuration(
            "shard count must be at least 1".to_string(),
        ));
    }
    if stores.len() != opts.shard_count as usize {
        return Err(IngestError::Configuration(format!(
            "{} stores provided for {} shards",
            stores.len(),
            opts.shard_count
        )));
    }

    let mut reader = BufReader::new(source);
    // Sniff the gzip magic so plain tars and .tar.gz both work.
    let compressed = {
        let head = reader.fill_buf()?;
        head.len() >= 2 && head[0] == 0x1f && head[1] == 0x8b
    };
    if compressed {
        consume_archive(GzDecoder::new(reader), opts, catalog, stores, grammars)
    } else {
        consume_archive(reader, opts, catalog, stores, grammars)
    }
}

fn consume_archive<R: Read, S: ShardStore>(
    stream: R,
    opts: &ImportOptions<'_>,
    catalog: &mut Catalog,
    stores: &mut [S],
    grammars: &GrammarRegistry,
) -> Result<ImportSummary, IngestError> {
    let mut archive = tar::Archive::new(stream);
    let mut entries = archive
        .entries()
        .map_err(|e| IngestError::SourceFetch(format!("tar stream: {}", e)))?;

    let mut summary = ImportSummary::default();
    loop {
        if let Some(cancel) = opts.cancel {
            if cancel.load(Ordering::Relaxed) {
                debug!(
                    files = summary.files_imported,
                    "import cancelled; returning partial totals"
                );
                break;
            }
        }
        let entry = match entries.next() {
            Some(e) => e,
            None => break,
        };
        // A broken entry header means the stream itself is unusable.
        let mut entry =
            entry.map_err(|e| IngestError::SourceFetch(format!("tar stream: {}", e)))?;
        if !entry.header().entry_type().is_file() {
            continue;
        }
        let raw = entry
            .path()
            .map_err(|e| IngestError::SourceFetch(format!("tar entry path: {}", e)))?
            .to_string_lossy()
            .into_owned();
        let rel = match strip_prefix(&raw, opts.path_prefix) {
            Some(r) if !r.is_empty() => r.to_string(),
            _ => continue,
        };

        let declared = entry.header().size().unwrap_or(0);
        if declared as usize > opts.max_file_size {
            debug!(path = %rel, size = declared, "skipping oversized file");
            continue;
        }
        let mut content = Vec::with_capacity(declared as usize);
        entry
            .read_to_end(&mut content)
            .map_err(|e| IngestError::SourceFetch(format!("tar entry {}: {}", rel, e)))?;

        let hash = blob_hash(&content);
        if let Some(existing) = catalog.get(&rel) {
            if existing.content_hash == hash {
                // Cheap pre-check hit: no re-parse, no re-store.
                summary.files_imported += 1;
                summary.total_size_bytes += existing.size_bytes;
                summary.outcomes.push(FileOutcome {
                    path: rel,
                    shard: existing.shard,
                    status: FileStatus::Unchanged,
                    parsed: false,
                });
                continue;
            }
        }

        let parse = parse_if_supported(grammars, &rel, &content);
        let shard = shard_for(&rel, opts.shard_count)?;
        let record = FileRecord {
            path: rel.clone(),
            content_hash: hash,
            size_bytes: content.len() as u64,
            last_imported_at: chrono::Utc::now(),
            shard,
            parse,
        };
        match stores[shard as usize].persist(opts.dataset, &record, &content, &opts.meta) {
            Ok(()) => {
                summary.files_imported += 1;
                summary.total_size_bytes += record.size_bytes;
                summary.outcomes.push(FileOutcome {
                    path: rel,
                    shard,
                    status: FileStatus::Imported,
                    parsed: record.parse.is_some(),
                });
                catalog.replace(record);
            }
            Err(e) if !e.fatal => {
                // The record is dropped, not cataloged: the next import
                // will see the old hash (or none) and retry the file.
                warn!(path = %rel, shard, error = %e, "shard store rejected file; continuing");
                summary.outcomes.push(FileOutcome {
                    path: rel,
                    shard,
                    status: FileStatus::StoreFailed(e.message),
                    parsed: record.parse.is_some(),
                });
            }
            Err(e) => return Err(IngestError::Storage(e.message)),
        }
    }
    Ok(summary)
}

/// Dataset-relative path of an entry under `prefix`, or `None` when the
/// entry lies outside the requested subtree.
fn strip_prefix<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    if prefix.is_empty() {
        return Some(path.trim_start_matches('/'));
    }
    path.strip_prefix(prefix)
        .map(|rest| rest.trim_start_matches('/'))
}

fn parse_if_supported(
    grammars: &GrammarRegistry,
    path: &str,
    content: &[u8],
) -> Option<Arc<ParseResult>> {
    let ext = std::path::Path::new(path)
        .extension()
        .and_then(|e| e.to_str())?;
    // Grammars are defined over text; binary blobs are stored unparsed.
    let text = std::str::from_utf8(content).ok()?;
    match grammars.parse(ext, text) {
        Ok(res) => Some(Arc::new(res)),
        Err(err @ ParseError::UnsupportedLanguage(_)) => {
            debug!(path = %path, error = %err, "no grammar for file");
            None
        }
        Err(err) => {
            warn!(path = %path, error = %err, "parse failed; storing without parse result");
            None
        }
    }
}
