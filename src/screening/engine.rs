use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info, warn};

use super::error::{ProgressError, ScreeningResult};
use super::policy::ScreeningPolicy;
use super::progress::ProgressLog;
use super::summary::ScreeningSummary;
use super::types::{ScreeningDecision, Zone};
use crate::constants::DEFAULT_FLUSH_EVERY;
use crate::oracle::OracleAdapter;
use crate::orchestrator::Orchestrator;
use crate::record::{CandidateRecord, RecordKey};

/// Screening decisions in corpus order plus the run summary.
#[derive(Debug, Clone)]
pub struct PartitionedCorpus {
    pub decisions: Vec<ScreeningDecision>,
    pub summary: ScreeningSummary,
}

impl PartitionedCorpus {
    pub fn zone(&self, zone: Zone) -> impl Iterator<Item = &ScreeningDecision> {
        self.decisions.iter().filter(move |d| d.zone == zone)
    }

    pub fn get(&self, key: &RecordKey) -> Option<&ScreeningDecision> {
        self.decisions.iter().find(|d| &d.key == key)
    }
}

/// Optional persistence for [`classify`].
#[derive(Debug, Clone, Copy)]
pub struct ProgressOptions<'a> {
    pub path: &'a Path,
    /// Appends between `sync_data` calls, also the progress-report interval.
    pub flush_every: usize,
}

impl<'a> ProgressOptions<'a> {
    pub fn new(path: &'a Path) -> Self {
        Self {
            path,
            flush_every: DEFAULT_FLUSH_EVERY,
        }
    }
}

/// Scores every record of the unique corpus and routes it to a zone.
///
/// With `progress`, decisions already in the log are reused (their zone is
/// re-derived under `policy`) and new decisions are appended as they
/// complete, so an interrupted run resumes where it stopped. The log is tied
/// to the prompt fingerprint; resuming under a different rubric or research
/// question is refused. Every input record gets exactly one decision (see
/// [`assign_keys`]). Per-record oracle failures land in [`Zone::Error`] and
/// never abort the run.
pub async fn classify(
    corpus: &[CandidateRecord],
    adapter: &OracleAdapter,
    policy: &ScreeningPolicy,
    orchestrator: &Orchestrator,
    progress: Option<ProgressOptions<'_>>,
) -> ScreeningResult<PartitionedCorpus> {
    policy.validate()?;

    let unique = assign_keys(corpus);

    let (mut log, previous) = match progress {
        Some(options) => {
            let fingerprint = adapter.prompt().fingerprint();
            let (log, entries) = ProgressLog::<ScreeningDecision>::open_scoped(
                options.path,
                options.flush_every,
                Some(&fingerprint),
            )?;
            (Some(log), entries)
        }
        None => (None, Vec::new()),
    };
    let report_every = progress.map_or(DEFAULT_FLUSH_EVERY, |o| o.flush_every.max(1));

    let mut decided: HashMap<RecordKey, ScreeningDecision> = HashMap::new();
    for mut decision in previous {
        decision.rezone(policy);
        decided.insert(decision.key.clone(), decision);
    }
    let resumed = unique.iter().filter(|(key, _)| decided.contains_key(key)).count();
    if resumed > 0 {
        info!(resumed, remaining = unique.len() - resumed, "Resuming screening");
    }

    let pending: Vec<(RecordKey, &CandidateRecord)> = unique
        .iter()
        .filter(|(key, _)| !decided.contains_key(key))
        .map(|(key, record)| (key.clone(), *record))
        .collect();
    let pending_total = pending.len();

    let mut done = 0usize;
    let stats = orchestrator
        .run(
            pending,
            move |(key, record)| async move {
                match adapter.score(&record.title, record.abstract_str()).await {
                    Ok(score) => ScreeningDecision::scored(record.clone(), score, policy).with_key(key),
                    Err(err) => {
                        warn!(
                            record_key = %key,
                            title = %record.title,
                            error = %err,
                            "Scoring failed, routing record to error zone"
                        );
                        ScreeningDecision::failed(record.clone(), &err).with_key(key)
                    }
                }
            },
            |_, decision: ScreeningDecision| {
                if let Some(log) = log.as_mut() {
                    log.append(&decision)?;
                }
                debug!(
                    record_key = %decision.key,
                    zone = %decision.zone,
                    total = ?decision.total(),
                    "Screened"
                );
                decided.insert(decision.key.clone(), decision);

                done += 1;
                if done % report_every == 0 || done == pending_total {
                    info!(done, total = pending_total, "Screening progress");
                }
                Ok::<_, ProgressError>(())
            },
        )
        .await?;

    if let Some(log) = log.as_mut() {
        log.sync()?;
    }

    let decisions: Vec<ScreeningDecision> = unique
        .iter()
        .filter_map(|(key, _)| decided.remove(key))
        .collect();

    let summary = ScreeningSummary::from_decisions(
        &decisions,
        *policy,
        resumed,
        stats.skipped,
        adapter.usage(),
    );

    if summary.error > 0 {
        warn!(errors = summary.error, "Some records failed scoring and need attention");
    }
    info!(
        auto_include = summary.auto_include,
        auto_exclude = summary.auto_exclude,
        human_review = summary.human_review,
        error = summary.error,
        cancelled = summary.cancelled,
        "Screening complete"
    );

    Ok(PartitionedCorpus { decisions, summary })
}

/// Pairs each record with a key unique within `corpus`.
///
/// The first record carrying a [`RecordKey`] keeps it. Later records with the
/// same key (untitled records without identifiers, or a corpus that skipped
/// deduplication) get an ordinal suffix in corpus order, so keys are stable
/// across resumed runs.
pub fn assign_keys(corpus: &[CandidateRecord]) -> Vec<(RecordKey, &CandidateRecord)> {
    let mut occurrences: HashMap<RecordKey, usize> = HashMap::new();
    let keyed: Vec<(RecordKey, &CandidateRecord)> = corpus
        .iter()
        .map(|record| {
            let base = record.key();
            let seen = occurrences.entry(base.clone()).or_insert(0);
            *seen += 1;
            let key = if *seen == 1 { base } else { base.with_ordinal(*seen) };
            (key, record)
        })
        .collect();

    let collided = occurrences.values().filter(|&&n| n > 1).count();
    if collided > 0 {
        debug!(records = corpus.len(), collided, "Disambiguated records sharing a key");
    }
    keyed
}
