use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("failed to read candidates from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed CSV in {path} at line {line}: {reason}")]
    Csv {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("candidate file {path} has no 'title' column")]
    MissingTitleColumn { path: PathBuf },

    #[error("unsupported candidate file format: {path} (expected .csv, .json or .jsonl)")]
    UnsupportedFormat { path: PathBuf },
}

pub type RecordResult<T> = Result<T, RecordError>;
