//! Configuration error types.

use thiserror::Error;

use crate::screening::ScreeningError;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable was set to something that does not parse.
    #[error("invalid value '{value}' for {name}: {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// `LITSCREEN_PROJECT_TYPE` named no known preset.
    #[error(
        "unknown project type '{value}': expected systematic-review, knowledge-repository or custom"
    )]
    UnknownProjectType { value: String },

    /// Threshold pair rejected by the screening policy.
    #[error("invalid screening thresholds: {0}")]
    Policy(#[from] ScreeningError),

    /// Duplicate threshold must lie in (0, 1].
    #[error("duplicate threshold {value} must be greater than 0 and at most 1")]
    InvalidDuplicateThreshold { value: f64 },

    /// A count that must be positive was zero.
    #[error("{name} must be at least 1")]
    ZeroCount { name: &'static str },

    /// A required environment variable was not set.
    #[error("missing required environment variable: {name}")]
    MissingEnvVar { name: &'static str },
}
