use std::collections::HashMap;

use tracing::debug;

use super::types::{DuplicateReason, PassOutput, Removal, SourcePriority};
use crate::record::CandidateRecord;
use crate::similarity::{normalize_title, normalized_similarity};

/// Groups by normalized DOI and keeps the best-ranked record of each group.
pub fn primary_identifier_pass(
    records: Vec<CandidateRecord>,
    priority: &SourcePriority,
) -> PassOutput {
    identifier_pass(
        records,
        priority,
        CandidateRecord::normalized_doi,
        |identifier| DuplicateReason::PrimaryIdentifier { identifier },
    )
}

/// Groups by normalized preprint id and keeps the best-ranked record of each group.
pub fn secondary_identifier_pass(
    records: Vec<CandidateRecord>,
    priority: &SourcePriority,
) -> PassOutput {
    identifier_pass(
        records,
        priority,
        CandidateRecord::normalized_arxiv_id,
        |identifier| DuplicateReason::SecondaryIdentifier { identifier },
    )
}

fn identifier_pass<K, R>(
    records: Vec<CandidateRecord>,
    priority: &SourcePriority,
    key_of: K,
    reason_for: R,
) -> PassOutput
where
    K: Fn(&CandidateRecord) -> Option<String>,
    R: Fn(String) -> DuplicateReason,
{
    let keys: Vec<Option<String>> = records.iter().map(&key_of).collect();

    // identifier -> index of the record kept for it
    let mut winners: HashMap<&str, usize> = HashMap::new();
    for (idx, key) in keys.iter().enumerate() {
        let Some(key) = key.as_deref() else { continue };
        let rank = priority.rank(records[idx].source.as_deref());
        winners
            .entry(key)
            .and_modify(|best| {
                if rank < priority.rank(records[*best].source.as_deref()) {
                    *best = idx;
                }
            })
            .or_insert(idx);
    }

    let absorbed: HashMap<usize, (String, usize)> = keys
        .iter()
        .enumerate()
        .filter_map(|(idx, key)| {
            let key = key.as_deref()?;
            let winner = winners[key];
            (winner != idx).then(|| (idx, (key.to_string(), winner)))
        })
        .collect();

    let survivor_ids: Vec<_> = records
        .iter()
        .map(|r| (r.key(), r.title.clone()))
        .collect();

    let mut output = PassOutput::default();
    for (idx, record) in records.into_iter().enumerate() {
        match absorbed.get(&idx) {
            Some((identifier, winner)) => {
                let (absorbed_by, absorbed_by_title) = survivor_ids[*winner].clone();
                debug!(
                    identifier = %identifier,
                    absorbed_by = %absorbed_by,
                    "Removed identifier duplicate"
                );
                output.removed.push(Removal {
                    record,
                    reason: reason_for(identifier.clone()),
                    absorbed_by,
                    absorbed_by_title,
                });
            }
            None => output.survivors.push(record),
        }
    }

    output
}

/// Single-linkage title pass: a record is dropped when its normalized title
/// reaches `threshold` similarity with any record already kept.
pub fn fuzzy_title_pass(records: Vec<CandidateRecord>, threshold: f64) -> PassOutput {
    let mut output = PassOutput::default();
    let mut kept_titles: Vec<String> = Vec::new();

    for record in records {
        let title = normalize_title(&record.title);
        if title.is_empty() {
            output.survivors.push(record);
            kept_titles.push(title);
            continue;
        }

        let matched = kept_titles.iter().enumerate().find_map(|(i, kept)| {
            let similarity = normalized_similarity(&title, kept);
            (similarity >= threshold).then_some((i, similarity))
        });

        match matched {
            Some((i, similarity)) => {
                let survivor = &output.survivors[i];
                debug!(
                    similarity,
                    absorbed_by = %survivor.key(),
                    "Removed fuzzy title duplicate"
                );
                output.removed.push(Removal {
                    absorbed_by: survivor.key(),
                    absorbed_by_title: survivor.title.clone(),
                    record,
                    reason: DuplicateReason::FuzzyTitle { similarity },
                });
            }
            None => {
                output.survivors.push(record);
                kept_titles.push(title);
            }
        }
    }

    output
}
