//! Quarry ingestion core: sharded code intake for a hosted code-search
//! service. Focus: deterministic shard routing, Git-compatible change
//! detection, and tree-sitter parsing with graceful degradation.

pub mod auth;
pub mod blob;
pub mod config;
pub mod error;
pub mod import;
pub mod parse;
pub mod shard;
pub mod snippet;
pub mod store;

pub use crate::blob::{blob_hash, hash_matches};
pub use crate::config::{load_config, IngestConfig, MergeOpts};
pub use crate::error::IngestError;
pub use crate::import::{
    import_from_reader, import_from_url, Catalog, FileOutcome, FileRecord, FileStatus,
    ImportOptions, ImportSummary, SourceMeta,
};
pub use crate::parse::{GrammarRegistry, ParseError, ParseResult, SyntaxNode, SyntaxTree};
pub use crate::shard::shard_for;
pub use crate::snippet::find_line_number;
pub use crate::store::{MemShardStore, ShardStore, StoreError};
