//! Oracle error types.

use std::time::Duration;
use thiserror::Error;

/// Failures of a scoring call.
///
/// [`OracleError::is_transient`] splits the taxonomy: transient errors are
/// retried with backoff, everything else routes the record to the error zone
/// immediately.
#[derive(Debug, Clone, Error)]
pub enum OracleError {
    /// HTTP 429 or equivalent. `retry_after` carries the server's hint.
    #[error("rate limited by oracle")]
    RateLimited { retry_after: Option<Duration> },

    /// 5xx response.
    #[error("oracle server error (status {status})")]
    Server { status: u16 },

    #[error("oracle call timed out after {elapsed:?}")]
    Timeout { elapsed: Duration },

    /// Connection reset, DNS failure and similar.
    #[error("oracle transport error: {message}")]
    Transport { message: String },

    #[error("oracle rejected credentials (status {status})")]
    Auth { status: u16 },

    #[error("oracle rejected request (status {status}): {message}")]
    InvalidRequest { status: u16, message: String },

    /// The oracle answered but the answer is unusable.
    #[error("malformed oracle response: {reason}")]
    MalformedResponse { reason: String },

    #[error("oracle retries exhausted after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<OracleError>,
    },
}

impl OracleError {
    /// `true` for failures worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::Server { .. } | Self::Timeout { .. } | Self::Transport { .. }
        )
    }

    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            reason: reason.into(),
        }
    }
}

pub type OracleResult<T> = Result<T, OracleError>;
