use std::fmt;

use serde::{Deserialize, Serialize};

use super::policy::ScreeningPolicy;
use super::progress::Keyed;
use crate::oracle::{OracleError, ScoreResult};
use crate::record::{CandidateRecord, RecordKey};

/// Decision bucket for a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Zone {
    AutoInclude,
    AutoExclude,
    HumanReview,
    /// Scoring failed. Never counted as excluded.
    Error,
}

impl Zone {
    pub const ALL: [Zone; 4] = [
        Zone::AutoInclude,
        Zone::AutoExclude,
        Zone::HumanReview,
        Zone::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AutoInclude => "auto-include",
            Self::AutoExclude => "auto-exclude",
            Self::HumanReview => "human-review",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Zone for a validated score.
///
/// Missing abstracts are always auto-exclude. Otherwise the policy decides,
/// and unverified evidence moves an automatic zone to human review. Returns
/// the zone and whether such a downgrade happened.
pub fn decide(score: &ScoreResult, policy: &ScreeningPolicy) -> (Zone, bool) {
    if score.abstract_missing {
        return (Zone::AutoExclude, false);
    }

    let zone = policy.assign_zone(score.total());
    if !score.evidence_verified() && zone != Zone::HumanReview {
        (Zone::HumanReview, true)
    } else {
        (zone, false)
    }
}

/// Screening outcome for one record. Also the progress-log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningDecision {
    pub key: RecordKey,
    pub record: CandidateRecord,
    pub zone: Zone,
    /// Present for every zone except `Error`.
    #[serde(default)]
    pub score: Option<ScoreResult>,
    /// Unverified evidence forced this record into human review.
    #[serde(default)]
    pub downgraded: bool,
    #[serde(default)]
    pub error: Option<String>,
}

impl ScreeningDecision {
    pub fn scored(record: CandidateRecord, score: ScoreResult, policy: &ScreeningPolicy) -> Self {
        let (zone, downgraded) = decide(&score, policy);
        Self {
            key: record.key(),
            record,
            zone,
            score: Some(score),
            downgraded,
            error: None,
        }
    }

    pub fn failed(record: CandidateRecord, error: &OracleError) -> Self {
        Self {
            key: record.key(),
            record,
            zone: Zone::Error,
            score: None,
            downgraded: false,
            error: Some(error.to_string()),
        }
    }

    /// Replaces the record-derived key, for records disambiguated by
    /// [`assign_keys`](super::engine::assign_keys).
    pub fn with_key(mut self, key: RecordKey) -> Self {
        self.key = key;
        self
    }

    /// Total score, absent for failed records.
    pub fn total(&self) -> Option<i32> {
        self.score.as_ref().map(ScoreResult::total)
    }

    pub fn evidence_verified(&self) -> bool {
        self.score.as_ref().is_none_or(ScoreResult::evidence_verified)
    }

    /// Re-derives the zone under `policy` from the stored score.
    pub fn rezone(&mut self, policy: &ScreeningPolicy) {
        if let Some(score) = &self.score {
            let (zone, downgraded) = decide(score, policy);
            self.zone = zone;
            self.downgraded = downgraded;
        }
    }

    pub fn reasoning(&self) -> &str {
        match (&self.score, &self.error) {
            (Some(score), _) => &score.reasoning,
            (None, Some(error)) => error,
            (None, None) => "",
        }
    }
}

impl Keyed for ScreeningDecision {
    const KIND: &'static str = "screening";

    fn key(&self) -> &RecordKey {
        &self.key
    }
}
