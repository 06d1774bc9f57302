use std::collections::HashSet;
use std::path::Path;

use chrono::Utc;
use tracing::{debug, info};

use super::error::{ReviewError, ReviewResult};
use super::types::{
    DEFAULT_REASONING, HumanDecision, HumanLabel, ReviewAction, ReviewSummary, ReviewerConfidence,
};
use crate::record::RecordKey;
use crate::screening::{ProgressLog, ScreeningDecision, Zone};

/// Presents one queued record and returns the reviewer's choice.
pub trait Reviewer {
    /// `position` is 1-based within a queue of `queue_len` records.
    fn review(
        &mut self,
        decision: &ScreeningDecision,
        position: usize,
        queue_len: usize,
    ) -> ReviewResult<ReviewAction>;
}

/// Human-review zone records in corpus order.
pub fn human_review_queue<'a, I>(decisions: I) -> Vec<ScreeningDecision>
where
    I: IntoIterator<Item = &'a ScreeningDecision>,
{
    decisions
        .into_iter()
        .filter(|d| d.zone == Zone::HumanReview)
        .cloned()
        .collect()
}

/// Resumable manual adjudication over a fixed queue.
///
/// Decisions already in the review log are loaded on open and their records
/// are left out of the queue. Every new decision is appended to the log
/// before it is returned.
pub struct ReviewSession {
    queue: Vec<ScreeningDecision>,
    decided: HashSet<RecordKey>,
    decisions: Vec<HumanDecision>,
    log: ProgressLog<HumanDecision>,
}

impl ReviewSession {
    pub fn open<I>(log_path: &Path, candidates: I) -> ReviewResult<Self>
    where
        I: IntoIterator<Item = ScreeningDecision>,
    {
        let (log, decisions) = ProgressLog::<HumanDecision>::open_with_flush(log_path, 1)?;
        let decided: HashSet<RecordKey> = decisions.iter().map(|d| d.key.clone()).collect();

        let mut queued = HashSet::new();
        let queue: Vec<ScreeningDecision> = candidates
            .into_iter()
            .filter(|d| !decided.contains(&d.key) && queued.insert(d.key.clone()))
            .collect();

        info!(
            path = %log_path.display(),
            already_decided = decided.len(),
            pending = queue.len(),
            "Opened review session"
        );

        Ok(Self {
            queue,
            decided,
            decisions,
            log,
        })
    }

    /// Records still waiting for a decision, in queue order.
    pub fn pending(&self) -> impl Iterator<Item = &ScreeningDecision> {
        self.queue.iter().filter(|d| !self.decided.contains(&d.key))
    }

    pub fn pending_count(&self) -> usize {
        self.pending().count()
    }

    /// Every saved decision, earlier sessions included, in the order saved.
    pub fn decisions(&self) -> &[HumanDecision] {
        &self.decisions
    }

    pub fn into_decisions(self) -> Vec<HumanDecision> {
        self.decisions
    }

    /// Saves a decision for a queued record.
    pub fn record(
        &mut self,
        key: &RecordKey,
        label: HumanLabel,
        reasoning: &str,
        confidence: ReviewerConfidence,
    ) -> ReviewResult<&HumanDecision> {
        if self.decided.contains(key) {
            return Err(ReviewError::AlreadyDecided { key: key.clone() });
        }
        let Some(screening) = self.queue.iter().find(|d| &d.key == key) else {
            return Err(ReviewError::NotQueued { key: key.clone() });
        };

        let reasoning = reasoning.trim();
        let decision = HumanDecision {
            key: key.clone(),
            title: screening.record.title.clone(),
            label,
            reasoning: if reasoning.is_empty() {
                DEFAULT_REASONING.to_string()
            } else {
                reasoning.to_string()
            },
            confidence,
            reviewed_at: Utc::now(),
            ai_zone: screening.zone,
            ai_total: screening.total(),
        };

        self.log.append(&decision)?;
        debug!(record_key = %key, label = %label, "Saved human decision");

        self.decided.insert(key.clone());
        self.decisions.push(decision);
        Ok(&self.decisions[self.decisions.len() - 1])
    }

    /// Walks the pending queue once with `reviewer` until it ends or the
    /// reviewer quits.
    pub fn run<R: Reviewer + ?Sized>(&mut self, reviewer: &mut R) -> ReviewResult<ReviewSummary> {
        let pending: Vec<ScreeningDecision> = self.pending().cloned().collect();
        let mut summary = ReviewSummary {
            queued: pending.len(),
            ..ReviewSummary::default()
        };

        for (index, decision) in pending.iter().enumerate() {
            match reviewer.review(decision, index + 1, pending.len())? {
                ReviewAction::Decide {
                    label,
                    reasoning,
                    confidence,
                } => {
                    self.record(&decision.key, label, &reasoning, confidence)?;
                    summary.decided += 1;
                    match label {
                        HumanLabel::Include => summary.included += 1,
                        HumanLabel::Exclude => summary.excluded += 1,
                    }
                }
                ReviewAction::Skip => summary.skipped += 1,
                ReviewAction::Quit => {
                    summary.quit_early = true;
                    break;
                }
            }
        }

        self.log.sync()?;
        summary.remaining = summary.queued - summary.decided;
        info!(
            decided = summary.decided,
            skipped = summary.skipped,
            remaining = summary.remaining,
            "Review pass finished"
        );
        Ok(summary)
    }
}
