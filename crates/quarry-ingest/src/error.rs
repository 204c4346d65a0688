use std::error::Error;
use std::fmt::{self, Display};

/// Typed errors returned by ingestion operations.
#[derive(Debug)]
pub enum IngestError {
    /// Invalid runtime configuration (e.g. a zero shard count).
    Configuration(String),
    /// The source tarball could not be fetched, or its stream is corrupt.
    SourceFetch(String),
    /// A shard store rejected a write irrecoverably.
    Storage(String),
}

impl Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestError::Configuration(s) => write!(f, "invalid configuration: {}", s),
            IngestError::SourceFetch(s) => write!(f, "source fetch failed: {}", s),
            IngestError::Storage(s) => write!(f, "storage error: {}", s),
        }
    }
}

impl Error for IngestError {}

// Conversions from common error types for easier propagation in binaries.
impl From<std::io::Error> for IngestError {
    fn from(e: std::io::Error) -> Self {
        IngestError::SourceFetch(e.to_string())
    }
}
