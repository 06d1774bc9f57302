use std::fmt;

use serde::Serialize;

use super::policy::ScreeningPolicy;
use super::types::{ScreeningDecision, Zone};
use crate::oracle::OracleUsage;

/// Distribution of total scores over scored records.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreStats {
    pub mean: f64,
    pub median: f64,
    pub min: i32,
    pub max: i32,
}

impl ScoreStats {
    pub fn from_totals(totals: &[i32]) -> Option<Self> {
        if totals.is_empty() {
            return None;
        }
        let mut sorted = totals.to_vec();
        sorted.sort_unstable();

        let n = sorted.len();
        let mean = sorted.iter().map(|&t| t as f64).sum::<f64>() / n as f64;
        let median = if n % 2 == 1 {
            sorted[n / 2] as f64
        } else {
            (sorted[n / 2 - 1] as f64 + sorted[n / 2] as f64) / 2.0
        };

        Some(Self {
            mean,
            median,
            min: sorted[0],
            max: sorted[n - 1],
        })
    }
}

/// Per-run counts. Every zone is always present, including `error`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreeningSummary {
    pub policy: ScreeningPolicy,
    pub total: usize,
    pub auto_include: usize,
    pub auto_exclude: usize,
    pub human_review: usize,
    pub error: usize,
    /// Records whose evidence had at least one unverified quote.
    pub unverified_evidence: usize,
    /// Records moved to human review by unverified evidence.
    pub downgraded: usize,
    pub missing_abstract: usize,
    /// Decisions taken from an earlier, interrupted run.
    pub resumed: usize,
    /// Records not screened because the run was stopped.
    pub cancelled: usize,
    pub scores: Option<ScoreStats>,
    pub usage: OracleUsage,
}

impl ScreeningSummary {
    pub fn from_decisions(
        decisions: &[ScreeningDecision],
        policy: ScreeningPolicy,
        resumed: usize,
        cancelled: usize,
        usage: OracleUsage,
    ) -> Self {
        let count = |zone: Zone| decisions.iter().filter(|d| d.zone == zone).count();
        let totals: Vec<i32> = decisions.iter().filter_map(ScreeningDecision::total).collect();

        Self {
            policy,
            total: decisions.len(),
            auto_include: count(Zone::AutoInclude),
            auto_exclude: count(Zone::AutoExclude),
            human_review: count(Zone::HumanReview),
            error: count(Zone::Error),
            unverified_evidence: decisions.iter().filter(|d| !d.evidence_verified()).count(),
            downgraded: decisions.iter().filter(|d| d.downgraded).count(),
            missing_abstract: decisions
                .iter()
                .filter(|d| d.score.as_ref().is_some_and(|s| s.abstract_missing))
                .count(),
            resumed,
            cancelled,
            scores: ScoreStats::from_totals(&totals),
            usage,
        }
    }

    pub fn count(&self, zone: Zone) -> usize {
        match zone {
            Zone::AutoInclude => self.auto_include,
            Zone::AutoExclude => self.auto_exclude,
            Zone::HumanReview => self.human_review,
            Zone::Error => self.error,
        }
    }
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        100.0 * part as f64 / whole as f64
    }
}

impl fmt::Display for ScreeningSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Screening summary ({}, include >= {}, exclude < {})",
            self.policy.project_type.as_str(),
            self.policy.include_threshold,
            self.policy.exclude_threshold
        )?;
        writeln!(f, "  records screened: {}", self.total)?;
        for zone in Zone::ALL {
            let n = self.count(zone);
            writeln!(f, "  {:<13} {:>6} ({:.1}%)", zone.as_str(), n, percent(n, self.total))?;
        }
        if self.error > 0 {
            writeln!(
                f,
                "  WARNING: {} record(s) failed scoring and are NOT counted as excluded",
                self.error
            )?;
        }
        if self.unverified_evidence > 0 {
            writeln!(
                f,
                "  unverified evidence: {} ({} moved to human review)",
                self.unverified_evidence, self.downgraded
            )?;
        }
        if self.missing_abstract > 0 {
            writeln!(f, "  missing abstract (auto-excluded): {}", self.missing_abstract)?;
        }
        if let Some(stats) = &self.scores {
            writeln!(
                f,
                "  total score: mean {:.1}, median {:.1}, range {} to {}",
                stats.mean, stats.median, stats.min, stats.max
            )?;
        }
        if self.resumed > 0 {
            writeln!(f, "  resumed from progress log: {}", self.resumed)?;
        }
        if self.cancelled > 0 {
            writeln!(f, "  not screened (stopped): {}", self.cancelled)?;
        }
        write!(
            f,
            "  oracle: {} calls, {} retries, {} cache hits, {} input / {} output tokens",
            self.usage.calls,
            self.usage.retries,
            self.usage.cache_hits,
            self.usage.input_tokens,
            self.usage.output_tokens
        )
    }
}
