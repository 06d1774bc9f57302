//! litscreen library crate (used by the binary and integration tests).
//!
//! # Public API Surface
//!
//! The pipeline runs leaf to root:
//!
//! ## Records & Deduplication
//! - [`CandidateRecord`], [`RecordKey`], [`load_candidates`] - Input records and stable identity
//! - [`deduplicate`], [`DedupConfig`], [`DedupOutcome`] - Three-pass deduplication with removal log
//! - [`title_similarity`] - Normalized title comparison
//!
//! ## Scoring
//! - [`ScoringOracle`] - Pluggable classification capability
//! - [`OracleAdapter`], [`OracleConfig`] - Retries, pacing, evidence validation, usage accounting
//! - [`AnthropicOracle`] - HTTP oracle
//!
//! ## Screening
//! - [`classify`], [`ScreeningPolicy`], [`Zone`] - Zone routing with a resumable progress log
//! - [`Orchestrator`], [`StopSignal`] - Bounded-concurrency scheduling
//!
//! ## Human Review & Validation
//! - [`ReviewSession`], [`ConsoleReviewer`] - Resumable manual adjudication
//! - [`validate`], [`AgreementReport`], [`stratified_sample`] - Cohen's Kappa and sampling
//!
//! ## Outputs
//! - [`OutputDir`] - CSV tables, JSON reports and progress-log locations
//!
//! ## Test/Mock Support
//! [`MockOracle`] is available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod config;
pub mod constants;
pub mod dedup;
pub mod export;
pub mod hashing;
pub mod oracle;
pub mod orchestrator;
pub mod record;
pub mod review;
pub mod screening;
pub mod similarity;
pub mod validation;

pub use config::{Config, ConfigError};
pub use dedup::{DedupConfig, DedupOutcome, DedupReport, DuplicateReason, Removal, deduplicate};
pub use export::{ExportError, OutputDir};
pub use hashing::{hash_identity, hash_score_input, hash_to_u64};
#[cfg(any(test, feature = "mock"))]
pub use oracle::MockOracle;
pub use oracle::{
    AnthropicOracle, DimensionScores, OracleAdapter, OracleConfig, OracleError, OracleResponse,
    OracleUsage, ScoreResult, ScoringOracle, ScreeningPrompt,
};
pub use orchestrator::{Orchestrator, RunStats, StopSignal};
pub use record::{CandidateRecord, RecordError, RecordKey, load_candidates};
pub use review::{
    ConsoleReviewer, HumanDecision, HumanLabel, ReviewError, ReviewSession, Reviewer,
    ReviewerConfidence,
};
pub use screening::{
    PartitionedCorpus, ProgressLog, ProgressOptions, ScreeningDecision, ScreeningError,
    ScreeningPolicy, ScreeningSummary, Zone, classify,
};
pub use similarity::title_similarity;
pub use validation::{AgreementReport, KappaBand, ValidationError, stratified_sample, validate};
