//! Screening and progress-log error types.

use std::path::PathBuf;
use thiserror::Error;

/// Failures of the append-only progress logs.
#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("progress log I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize progress entry: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("progress log {path} has no header line")]
    MissingHeader { path: PathBuf },

    #[error("progress log {path} holds '{found}' entries, expected '{expected}'")]
    KindMismatch {
        path: PathBuf,
        expected: &'static str,
        found: String,
    },

    #[error("progress log {path} has unsupported version {found}")]
    UnsupportedVersion { path: PathBuf, found: u32 },

    /// The log was scored under a different prompt (rubric or research question).
    #[error(
        "progress log {path} was scored under prompt {found}, current prompt is {expected}; \
         restore the previous research question or restart screening"
    )]
    FingerprintMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },

    /// A line other than the last one failed to parse.
    #[error("progress log {path} is corrupt at line {line}: {source}")]
    Corrupt {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

pub type ProgressResult<T> = Result<T, ProgressError>;

#[derive(Debug, Error)]
pub enum ScreeningError {
    #[error(transparent)]
    Progress(#[from] ProgressError),

    #[error("include threshold {include} must be greater than exclude threshold {exclude}")]
    InvalidThresholds { include: i32, exclude: i32 },

    #[error("threshold {value} is outside the score range [{min}, {max}]")]
    ThresholdOutOfRange { value: i32, min: i32, max: i32 },
}

pub type ScreeningResult<T> = Result<T, ScreeningError>;
