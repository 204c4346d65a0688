// Import pipeline facade: orchestration plus the batch data model.

pub mod pipeline;
pub mod types;

pub use pipeline::{import_from_reader, import_from_url};
pub use types::{
    Catalog, FileOutcome, FileRecord, FileStatus, ImportOptions, ImportOptionsBuilder,
    ImportSummary, SourceMeta,
};
