use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::RecordKey;
use crate::screening::{Keyed, Zone};

/// Reasoning stored when the reviewer leaves it blank.
pub const DEFAULT_REASONING: &str = "No reasoning provided";

/// Binary include/exclude judgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HumanLabel {
    Include,
    Exclude,
}

impl HumanLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Include => "include",
            Self::Exclude => "exclude",
        }
    }

    pub fn is_include(&self) -> bool {
        matches!(self, Self::Include)
    }
}

impl fmt::Display for HumanLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewerConfidence {
    Low,
    #[default]
    Medium,
    High,
}

impl ReviewerConfidence {
    /// Parses the console choices `1`, `2`, `3` or the level names.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "1" | "low" => Some(Self::Low),
            "2" | "medium" => Some(Self::Medium),
            "3" | "high" => Some(Self::High),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// One saved human judgment. Also the review progress-log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HumanDecision {
    pub key: RecordKey,
    pub title: String,
    pub label: HumanLabel,
    pub reasoning: String,
    pub confidence: ReviewerConfidence,
    pub reviewed_at: DateTime<Utc>,
    /// Zone the record was in when it was reviewed.
    pub ai_zone: Zone,
    #[serde(default)]
    pub ai_total: Option<i32>,
}

impl HumanDecision {
    /// `true` when the human label matches an automatic zone.
    pub fn agrees_with_ai(&self) -> bool {
        matches!(
            (self.label, self.ai_zone),
            (HumanLabel::Include, Zone::AutoInclude) | (HumanLabel::Exclude, Zone::AutoExclude)
        )
    }
}

impl Keyed for HumanDecision {
    const KIND: &'static str = "review";

    fn key(&self) -> &RecordKey {
        &self.key
    }
}

/// What the reviewer chose for the record on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewAction {
    Decide {
        label: HumanLabel,
        reasoning: String,
        confidence: ReviewerConfidence,
    },
    Skip,
    Quit,
}

/// Counts for one pass over the queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReviewSummary {
    /// Queue length at the start of the pass.
    pub queued: usize,
    pub decided: usize,
    pub included: usize,
    pub excluded: usize,
    pub skipped: usize,
    /// Still undecided after the pass (skipped or never reached).
    pub remaining: usize,
    pub quit_early: bool,
}

impl fmt::Display for ReviewSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Reviewed {} of {} ({} include, {} exclude), {} skipped, {} remaining",
            self.decided, self.queued, self.included, self.excluded, self.skipped, self.remaining
        )
    }
}
