//! Cross-cutting, shared constants.
//!
//! The rubric bounds are the single source of truth for score clamping, total
//! score validation and threshold validation. Derive secondary bounds from the
//! per-dimension ones to avoid drift.

/// Domain dimension bounds (PICOC context).
pub const DOMAIN_MIN: i32 = 0;
pub const DOMAIN_MAX: i32 = 10;

/// Intervention dimension bounds.
pub const INTERVENTION_MIN: i32 = 0;
pub const INTERVENTION_MAX: i32 = 10;

/// Method (study design rigor) dimension bounds.
pub const METHOD_MIN: i32 = 0;
pub const METHOD_MAX: i32 = 5;

/// Outcome dimension bounds.
pub const OUTCOME_MIN: i32 = 0;
pub const OUTCOME_MAX: i32 = 10;

/// Exclusion penalty bounds. Stacked penalties are capped at the minimum.
pub const EXCLUSION_MIN: i32 = -20;
pub const EXCLUSION_MAX: i32 = 0;

/// The title bonus is binary: either nothing or the full bonus.
pub const TITLE_BONUS_VALUE: i32 = 10;

pub const TOTAL_MIN: i32 = DOMAIN_MIN + INTERVENTION_MIN + METHOD_MIN + OUTCOME_MIN + EXCLUSION_MIN;

/// Ceiling of the published total range. Thresholds are validated against it;
/// the dimension maxima themselves sum to [`DIMENSION_SUM_MAX`].
pub const TOTAL_MAX: i32 = 50;

pub const DIMENSION_SUM_MAX: i32 =
    DOMAIN_MAX + INTERVENTION_MAX + METHOD_MAX + OUTCOME_MAX + EXCLUSION_MAX + TITLE_BONUS_VALUE;

/// Default title similarity at or above which two records are duplicates.
pub const DEFAULT_DUPLICATE_THRESHOLD: f64 = 0.85;

/// Systematic-review policy thresholds.
pub const STRICT_INCLUDE_THRESHOLD: i32 = 40;
pub const STRICT_EXCLUDE_THRESHOLD: i32 = 20;

/// Knowledge-repository policy thresholds.
pub const LENIENT_INCLUDE_THRESHOLD: i32 = 25;
pub const LENIENT_EXCLUDE_THRESHOLD: i32 = 10;

pub const DEFAULT_WORKERS: usize = 8;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BACKOFF_BASE_MS: u64 = 1_000;
pub const DEFAULT_REQUESTS_PER_MINUTE: u32 = 50;
pub const DEFAULT_CALL_TIMEOUT_SECS: u64 = 60;

/// Upper bound on a single retry delay unless the oracle asks for longer.
pub const DEFAULT_MAX_BACKOFF_SECS: u64 = 60;

/// In-run memo of scored (title, abstract) pairs.
pub const DEFAULT_SCORE_CACHE_CAPACITY: u64 = 20_000;

/// Response budget for one scoring call.
pub const DEFAULT_ORACLE_MAX_TOKENS: u32 = 1_000;

/// Progress-log appends between durability flushes.
pub const DEFAULT_FLUSH_EVERY: usize = 50;

/// Seed used for reproducible validation samples.
pub const DEFAULT_SAMPLE_SEED: u64 = 42;
pub const DEFAULT_SAMPLE_SIZE: usize = 50;

/// Directional disagreement ratio above which thresholds should move.
pub const DISAGREEMENT_IMBALANCE_RATIO: usize = 2;

/// Kappa below which the rubric itself is flagged for review.
pub const RUBRIC_REVIEW_KAPPA: f64 = 0.60;
