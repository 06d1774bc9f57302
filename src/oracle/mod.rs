//! Scoring oracle adapter.
//!
//! The oracle is an external, non-deterministic capability that scores a
//! title/abstract against a fixed six-dimension rubric and cites evidence
//! quotes. [`ScoringOracle`] is the injected seam; [`OracleAdapter`] wraps
//! any implementation with:
//!
//! - a `governor` rate limiter and a per-call timeout
//! - bounded exponential backoff for transient failures, widened while the
//!   oracle keeps rate limiting
//! - score bounding and total recomputation
//! - evidence grounding against the abstract
//! - in-run memoization and usage counters
//!
//! Records with an empty abstract never reach the oracle.

pub mod adapter;
pub mod anthropic;
pub mod config;
pub mod error;
pub mod evidence;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod parse;
pub mod prompt;
pub mod types;
pub mod usage;

#[cfg(test)]
mod tests;

pub use adapter::{OracleAdapter, validate_response};
pub use anthropic::{AnthropicOracle, DEFAULT_ORACLE_MODEL, DEFAULT_ORACLE_URL};
pub use config::OracleConfig;
pub use error::{OracleError, OracleResult};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockOracle;
pub use parse::parse_response;
pub use prompt::ScreeningPrompt;
pub use types::{DimensionScores, OracleResponse, RawScores, ScoreRequest, ScoreResult, TokenUsage};
pub use usage::OracleUsage;

use async_trait::async_trait;

/// Anything that can score a record against the rubric.
#[async_trait]
pub trait ScoringOracle: Send + Sync {
    async fn score(
        &self,
        prompt: &ScreeningPrompt,
        request: ScoreRequest<'_>,
    ) -> OracleResult<OracleResponse>;

    /// Short name for logs.
    fn name(&self) -> &str {
        "oracle"
    }
}
