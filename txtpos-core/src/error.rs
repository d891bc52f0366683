use std::path::PathBuf;
use thiserror::Error;

/// Failures at the decoder boundary. The geometric core itself never fails.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid page dump: {0}")]
    InvalidDocument(#[from] serde_json::Error),

    #[error("page {page} is out of range (document has {page_count} pages)")]
    PageOutOfRange { page: u32, page_count: u32 },

    #[error("page {page} is malformed: {source}")]
    MalformedPage {
        page: u32,
        #[source]
        source: serde_json::Error,
    },
}
