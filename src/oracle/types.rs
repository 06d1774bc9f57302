use serde::{Deserialize, Serialize};

use crate::constants::{
    DOMAIN_MAX, DOMAIN_MIN, EXCLUSION_MAX, EXCLUSION_MIN, INTERVENTION_MAX, INTERVENTION_MIN,
    METHOD_MAX, METHOD_MIN, OUTCOME_MAX, OUTCOME_MIN, TITLE_BONUS_VALUE,
};

/// Per-record input to a scoring call. The rubric and research question
/// travel separately in [`ScreeningPrompt`](super::ScreeningPrompt).
#[derive(Debug, Clone, Copy)]
pub struct ScoreRequest<'a> {
    pub title: &'a str,
    pub abstract_text: &'a str,
}

/// Dimension scores exactly as the oracle reported them.
///
/// All six fields are required; a response missing one is malformed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawScores {
    pub domain: f64,
    pub intervention: f64,
    pub method: f64,
    #[serde(alias = "outcomes")]
    pub outcome: f64,
    pub exclusion: f64,
    pub title_bonus: f64,
}

/// Token accounting reported by the oracle for one call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
    #[serde(default)]
    pub cache_read_input_tokens: u64,
    #[serde(default)]
    pub cache_creation_input_tokens: u64,
}

/// Unvalidated oracle answer.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OracleResponse {
    pub scores: RawScores,
    /// The oracle's own sum. Logged when it disagrees, never used.
    #[serde(default)]
    pub total_score: Option<f64>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub evidence_quotes: Vec<String>,
    #[serde(skip)]
    pub usage: TokenUsage,
}

impl OracleResponse {
    pub fn from_scores(
        domain: i32,
        intervention: i32,
        method: i32,
        outcome: i32,
        exclusion: i32,
        title_bonus: i32,
    ) -> Self {
        let scores = RawScores {
            domain: domain as f64,
            intervention: intervention as f64,
            method: method as f64,
            outcome: outcome as f64,
            exclusion: exclusion as f64,
            title_bonus: title_bonus as f64,
        };
        Self {
            scores,
            total_score: Some((domain + intervention + method + outcome + exclusion + title_bonus) as f64),
            ..Self::default()
        }
    }

    pub fn with_quotes<I, S>(mut self, quotes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.evidence_quotes = quotes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = Some(reasoning.into());
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn with_claimed_total(mut self, total: f64) -> Self {
        self.total_score = Some(total);
        self
    }
}

/// Six bounded dimension scores. The total is always their sum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionScores {
    pub domain: i32,
    pub intervention: i32,
    pub method: i32,
    pub outcome: i32,
    pub exclusion: i32,
    pub title_bonus: i32,
}

impl DimensionScores {
    pub const ZERO: Self = Self {
        domain: 0,
        intervention: 0,
        method: 0,
        outcome: 0,
        exclusion: 0,
        title_bonus: 0,
    };

    /// Rounds and clamps each raw score into its range. The title bonus
    /// snaps to `0` or the full bonus, whichever is nearer.
    pub fn bounded(raw: &RawScores) -> Self {
        Self {
            domain: clamp_score(raw.domain, DOMAIN_MIN, DOMAIN_MAX),
            intervention: clamp_score(raw.intervention, INTERVENTION_MIN, INTERVENTION_MAX),
            method: clamp_score(raw.method, METHOD_MIN, METHOD_MAX),
            outcome: clamp_score(raw.outcome, OUTCOME_MIN, OUTCOME_MAX),
            exclusion: clamp_score(raw.exclusion, EXCLUSION_MIN, EXCLUSION_MAX),
            title_bonus: if raw.title_bonus >= TITLE_BONUS_VALUE as f64 / 2.0 {
                TITLE_BONUS_VALUE
            } else {
                0
            },
        }
    }

    pub fn total(&self) -> i32 {
        self.domain + self.intervention + self.method + self.outcome + self.exclusion + self.title_bonus
    }
}

/// NaN maps to 0 and infinities saturate before clamping.
fn clamp_score(value: f64, min: i32, max: i32) -> i32 {
    (value.round() as i32).clamp(min, max)
}

/// Validated scoring outcome for one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub scores: DimensionScores,
    #[serde(default)]
    pub evidence_quotes: Vec<String>,
    /// Quotes that could not be found in the abstract.
    #[serde(default)]
    pub unverified_quotes: Vec<String>,
    #[serde(default)]
    pub reasoning: String,
    /// Oracle's self-reported confidence (0-100). Audit only.
    #[serde(default)]
    pub confidence: Option<u8>,
    /// Set when the record had no abstract and the oracle was not called.
    #[serde(default)]
    pub abstract_missing: bool,
}

impl ScoreResult {
    /// Deterministic result for records without an abstract.
    pub fn empty_abstract() -> Self {
        Self {
            scores: DimensionScores::ZERO,
            evidence_quotes: Vec::new(),
            unverified_quotes: Vec::new(),
            reasoning: "No abstract available for screening".to_string(),
            confidence: Some(0),
            abstract_missing: true,
        }
    }

    pub fn total(&self) -> i32 {
        self.scores.total()
    }

    /// `false` if any quote was not found in the abstract.
    pub fn evidence_verified(&self) -> bool {
        self.unverified_quotes.is_empty()
    }
}
