use thiserror::Error;

use crate::record::RecordKey;
use crate::screening::ProgressError;

/// Errors from a human review session.
#[derive(Debug, Error)]
pub enum ReviewError {
    #[error(transparent)]
    Progress(#[from] ProgressError),

    /// Human decisions are immutable once saved.
    #[error("record {key} already has a human decision")]
    AlreadyDecided { key: RecordKey },

    #[error("record {key} is not in this review queue")]
    NotQueued { key: RecordKey },

    #[error("reviewer console I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for review operations.
pub type ReviewResult<T> = Result<T, ReviewError>;
