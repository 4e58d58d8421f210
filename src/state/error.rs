use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading or changing the site on disk
#[derive(Debug, Error)]
pub enum SiteError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("unknown portfolio item: {0}")]
    UnknownItem(String),

    #[error("index {index} out of range for {len} items")]
    InvalidIndex { index: usize, len: usize },

    #[error("{path} is not a supported media file")]
    UnsupportedMedia { path: PathBuf },

    #[error("slot {0} does not accept video")]
    VideoNotSupported(String),
}

pub type SiteResult<T> = Result<T, SiteError>;
