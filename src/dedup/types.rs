use std::collections::BTreeMap;

use serde::Serialize;

use crate::constants::DEFAULT_DUPLICATE_THRESHOLD;
use crate::record::{CandidateRecord, RecordKey};

/// Ordered list of origin tags. Earlier entries win identifier groups.
///
/// Matching is case-insensitive. Unknown or missing origins rank after every
/// listed one; ties fall back to input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePriority(Vec<String>);

impl SourcePriority {
    pub fn new<I, S>(sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            sources
                .into_iter()
                .map(|s| s.as_ref().trim().to_lowercase())
                .collect(),
        )
    }

    /// Rank of an origin tag; lower is preferred.
    pub fn rank(&self, source: Option<&str>) -> usize {
        source
            .map(|s| s.trim().to_lowercase())
            .and_then(|s| self.0.iter().position(|p| *p == s))
            .unwrap_or(self.0.len())
    }

    /// Default ordering for the primary (DOI) pass.
    pub fn primary_default() -> Self {
        Self::new(["Semantic Scholar", "OpenAlex", "arXiv"])
    }

    /// Default ordering for the secondary (preprint id) pass.
    pub fn secondary_default() -> Self {
        Self::new(["arXiv", "Semantic Scholar", "OpenAlex"])
    }
}

/// Deduplication settings.
#[derive(Debug, Clone)]
pub struct DedupConfig {
    /// Normalized title similarity at or above which records are duplicates.
    pub duplicate_threshold: f64,
    pub primary_priority: SourcePriority,
    pub secondary_priority: SourcePriority,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            duplicate_threshold: DEFAULT_DUPLICATE_THRESHOLD,
            primary_priority: SourcePriority::primary_default(),
            secondary_priority: SourcePriority::secondary_default(),
        }
    }
}

/// The pass that removed a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DedupPass {
    PrimaryIdentifier,
    SecondaryIdentifier,
    FuzzyTitle,
}

/// Why a record was removed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum DuplicateReason {
    /// Same normalized DOI as the survivor.
    PrimaryIdentifier { identifier: String },
    /// Same normalized preprint id as the survivor.
    SecondaryIdentifier { identifier: String },
    /// Title similarity with the survivor reached the threshold.
    FuzzyTitle { similarity: f64 },
}

impl DuplicateReason {
    pub fn pass(&self) -> DedupPass {
        match self {
            Self::PrimaryIdentifier { .. } => DedupPass::PrimaryIdentifier,
            Self::SecondaryIdentifier { .. } => DedupPass::SecondaryIdentifier,
            Self::FuzzyTitle { .. } => DedupPass::FuzzyTitle,
        }
    }

    /// Short label written to the removal log.
    pub fn label(&self) -> &'static str {
        match self {
            Self::PrimaryIdentifier { .. } => "identifier-duplicate",
            Self::SecondaryIdentifier { .. } => "secondary-identifier-duplicate",
            Self::FuzzyTitle { .. } => "fuzzy-title-duplicate",
        }
    }

    /// Human-readable detail (matched identifier or similarity).
    pub fn detail(&self) -> String {
        match self {
            Self::PrimaryIdentifier { identifier } | Self::SecondaryIdentifier { identifier } => {
                identifier.clone()
            }
            Self::FuzzyTitle { similarity } => format!("{similarity:.3}"),
        }
    }
}

/// One entry in the removal log. The removed record is kept verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct Removal {
    pub record: CandidateRecord,
    pub reason: DuplicateReason,
    pub absorbed_by: RecordKey,
    pub absorbed_by_title: String,
}

/// Survivors and removals of a single pass.
#[derive(Debug, Clone, Default)]
pub struct PassOutput {
    pub survivors: Vec<CandidateRecord>,
    pub removed: Vec<Removal>,
}

/// Removal counts for the run summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DedupReport {
    pub input: usize,
    pub unique: usize,
    pub primary_identifier_removed: usize,
    pub secondary_identifier_removed: usize,
    pub fuzzy_title_removed: usize,
    /// Removed records by origin tag (`"unknown"` when missing).
    pub removed_by_origin: BTreeMap<String, usize>,
}

impl DedupReport {
    pub fn total_removed(&self) -> usize {
        self.primary_identifier_removed + self.secondary_identifier_removed + self.fuzzy_title_removed
    }

    pub(crate) fn from_removals(input: usize, unique: usize, removed: &[Removal]) -> Self {
        let mut report = Self {
            input,
            unique,
            ..Self::default()
        };
        for removal in removed {
            match removal.reason.pass() {
                DedupPass::PrimaryIdentifier => report.primary_identifier_removed += 1,
                DedupPass::SecondaryIdentifier => report.secondary_identifier_removed += 1,
                DedupPass::FuzzyTitle => report.fuzzy_title_removed += 1,
            }
            let origin = removal
                .record
                .source
                .clone()
                .unwrap_or_else(|| "unknown".to_string());
            *report.removed_by_origin.entry(origin).or_default() += 1;
        }
        report
    }
}

/// Result of [`deduplicate`](super::deduplicate).
#[derive(Debug, Clone)]
pub struct DedupOutcome {
    /// Unique corpus, in input order.
    pub unique: Vec<CandidateRecord>,
    /// Removal log, in pass order.
    pub removed: Vec<Removal>,
    pub report: DedupReport,
}
