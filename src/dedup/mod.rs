//! Multi-pass deduplication.
//!
//! Three fixed-order passes, each over the survivors of the one before:
//!
//! 1. primary identifier (normalized DOI), best origin wins
//! 2. secondary identifier (normalized preprint id), best origin wins
//! 3. fuzzy title, single-linkage against already kept titles
//!
//! Each pass is a pure function from a record set to survivors plus a removal
//! log. Survivors keep input order and are never modified. Records without an
//! identifier never match in the identifier passes, and records without a
//! usable title are never fuzzy duplicates.

mod passes;
pub mod types;

#[cfg(test)]
mod tests;

pub use passes::{fuzzy_title_pass, primary_identifier_pass, secondary_identifier_pass};
pub use types::{
    DedupConfig, DedupOutcome, DedupPass, DedupReport, DuplicateReason, PassOutput, Removal,
    SourcePriority,
};

use tracing::info;

use crate::record::CandidateRecord;

/// Runs all three passes and returns the unique corpus with its removal log.
pub fn deduplicate(records: Vec<CandidateRecord>, config: &DedupConfig) -> DedupOutcome {
    let input = records.len();
    let mut removed = Vec::new();

    let primary = primary_identifier_pass(records, &config.primary_priority);
    removed.extend(primary.removed);

    let secondary = secondary_identifier_pass(primary.survivors, &config.secondary_priority);
    removed.extend(secondary.removed);

    let fuzzy = fuzzy_title_pass(secondary.survivors, config.duplicate_threshold);
    removed.extend(fuzzy.removed);

    let unique = fuzzy.survivors;
    let report = DedupReport::from_removals(input, unique.len(), &removed);

    info!(
        input,
        unique = report.unique,
        primary_removed = report.primary_identifier_removed,
        secondary_removed = report.secondary_identifier_removed,
        fuzzy_removed = report.fuzzy_title_removed,
        "Deduplication complete"
    );

    DedupOutcome {
        unique,
        removed,
        report,
    }
}
