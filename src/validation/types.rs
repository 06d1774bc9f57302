use std::fmt;

use serde::Serialize;

use crate::record::RecordKey;
use crate::review::HumanLabel;
use crate::screening::Zone;

/// 2x2 counts with the human label as ground truth.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    /// Both include.
    pub true_positive: usize,
    /// Oracle include, human exclude (over-inclusive).
    pub false_positive: usize,
    /// Oracle exclude, human include (over-exclusive).
    pub false_negative: usize,
    /// Both exclude.
    pub true_negative: usize,
}

impl ConfusionMatrix {
    pub fn add(&mut self, ai: HumanLabel, human: HumanLabel) {
        match (ai, human) {
            (HumanLabel::Include, HumanLabel::Include) => self.true_positive += 1,
            (HumanLabel::Include, HumanLabel::Exclude) => self.false_positive += 1,
            (HumanLabel::Exclude, HumanLabel::Include) => self.false_negative += 1,
            (HumanLabel::Exclude, HumanLabel::Exclude) => self.true_negative += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.true_positive + self.false_positive + self.false_negative + self.true_negative
    }

    pub fn agreements(&self) -> usize {
        self.true_positive + self.true_negative
    }

    pub fn observed_agreement(&self) -> f64 {
        ratio(self.agreements(), self.total())
    }

    /// Agreement expected by chance from each rater's include rate.
    pub fn expected_agreement(&self) -> f64 {
        let n = self.total();
        if n == 0 {
            return 0.0;
        }
        let ai_include = ratio(self.true_positive + self.false_positive, n);
        let human_include = ratio(self.true_positive + self.false_negative, n);
        ai_include * human_include + (1.0 - ai_include) * (1.0 - human_include)
    }

    /// Cohen's Kappa. When chance agreement is total the statistic is
    /// undefined; perfect observed agreement then reads as 1.0, anything
    /// else as 0.0.
    pub fn kappa(&self) -> f64 {
        let po = self.observed_agreement();
        let pe = self.expected_agreement();
        if (1.0 - pe).abs() < f64::EPSILON {
            return if (1.0 - po).abs() < f64::EPSILON { 1.0 } else { 0.0 };
        }
        (po - pe) / (1.0 - pe)
    }

    pub fn precision(&self) -> f64 {
        ratio(self.true_positive, self.true_positive + self.false_positive)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.true_positive, self.true_positive + self.false_negative)
    }

    pub fn f1(&self) -> f64 {
        let (p, r) = (self.precision(), self.recall());
        if p + r == 0.0 { 0.0 } else { 2.0 * p * r / (p + r) }
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 { 0.0 } else { part as f64 / whole as f64 }
}

/// Landis and Koch style reading of a Kappa value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum KappaBand {
    Poor,
    Fair,
    Moderate,
    Substantial,
    AlmostPerfect,
}

impl KappaBand {
    pub fn from_kappa(kappa: f64) -> Self {
        match kappa {
            k if k < 0.20 => Self::Poor,
            k if k < 0.40 => Self::Fair,
            k if k < 0.60 => Self::Moderate,
            k if k < 0.80 => Self::Substantial,
            _ => Self::AlmostPerfect,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Poor => "Poor",
            Self::Fair => "Fair",
            Self::Moderate => "Moderate",
            Self::Substantial => "Substantial",
            Self::AlmostPerfect => "Almost perfect",
        }
    }
}

impl fmt::Display for KappaBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisagreementDirection {
    /// Oracle included what the human excluded.
    OverInclusive,
    /// Oracle excluded what the human included.
    OverExclusive,
}

/// One paired record where oracle and human differ.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Disagreement {
    pub key: RecordKey,
    pub title: String,
    pub ai_zone: Zone,
    pub ai_total: Option<i32>,
    pub human_label: HumanLabel,
    pub human_reasoning: String,
    pub direction: DisagreementDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Recommendation {
    /// Agreement is too low for threshold tuning alone to fix.
    ReviseRubric { kappa: f64 },
    /// Oracle includes too much.
    RaiseIncludeThreshold { over_inclusive: usize, over_exclusive: usize },
    /// Oracle excludes too much.
    LowerExcludeThreshold { over_inclusive: usize, over_exclusive: usize },
    KeepThresholds,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReviseRubric { kappa } => write!(
                f,
                "Kappa {kappa:.2} is below the 0.60 target: review the scoring rubric and research question"
            ),
            Self::RaiseIncludeThreshold {
                over_inclusive,
                over_exclusive,
            } => write!(
                f,
                "Oracle is over-inclusive ({over_inclusive} vs {over_exclusive}): raise the auto-include threshold"
            ),
            Self::LowerExcludeThreshold {
                over_inclusive,
                over_exclusive,
            } => write!(
                f,
                "Oracle is over-exclusive ({over_exclusive} vs {over_inclusive}): lower the auto-exclude threshold"
            ),
            Self::KeepThresholds => f.write_str("Agreement is acceptable: keep the current thresholds"),
        }
    }
}

/// Oracle-versus-human agreement over the paired records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgreementReport {
    /// Paired records used for the statistics.
    pub compared: usize,
    /// Human decisions whose record has no screening decision.
    pub unmatched_human: usize,
    /// Human decisions paired with an error-zone record and left out.
    pub skipped_error_zone: usize,
    pub matrix: ConfusionMatrix,
    pub observed_agreement: f64,
    pub expected_agreement: f64,
    pub kappa: f64,
    pub band: KappaBand,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub over_inclusive: usize,
    pub over_exclusive: usize,
    pub recommendations: Vec<Recommendation>,
    pub disagreements: Vec<Disagreement>,
}
