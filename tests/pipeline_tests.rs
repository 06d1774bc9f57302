//! End-to-end pipeline tests: load, deduplicate, screen, review, validate.

mod common;

use std::collections::VecDeque;

use litscreen::dedup::{DedupConfig, DuplicateReason, deduplicate};
use litscreen::export::{self, OutputDir};
use litscreen::oracle::{OracleAdapter, ScreeningPrompt};
use litscreen::orchestrator::Orchestrator;
use litscreen::record::load_candidates;
use litscreen::review::{
    HumanDecision, HumanLabel, ReviewAction, ReviewSession, ReviewerConfidence, human_review_queue,
};
use litscreen::screening::{ProgressLog, ProgressOptions, ScreeningDecision, ScreeningPolicy, Zone, classify};
use litscreen::validation::{KappaBand, stratified_sample, validate};

use common::fixtures::{
    BORDERLINE_TITLE, CANDIDATES_CSV, FAILING_TITLE, HALLUCINATED_TITLE, INCLUDED_TITLE,
    NO_ABSTRACT_TITLE, OFF_TOPIC_TITLE, ScriptedReviewer, fast_oracle_config, scripted_oracle,
};

const QUESTION: &str = "How do conversational agents affect L2 speaking skills?";

fn include(reason: &str) -> ReviewAction {
    ReviewAction::Decide {
        label: HumanLabel::Include,
        reasoning: reason.to_string(),
        confidence: ReviewerConfidence::High,
    }
}

fn exclude(reason: &str) -> ReviewAction {
    ReviewAction::Decide {
        label: HumanLabel::Exclude,
        reasoning: reason.to_string(),
        confidence: ReviewerConfidence::Medium,
    }
}

fn titles<'a>(decisions: impl Iterator<Item = &'a ScreeningDecision>) -> Vec<&'a str> {
    decisions.map(|d| d.record.title.as_str()).collect()
}

#[tokio::test]
async fn test_full_pipeline() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("candidates.csv");
    std::fs::write(&input, CANDIDATES_CSV).unwrap();
    let dir = OutputDir::create(tmp.path().join("out")).unwrap();

    // Deduplication
    let records = load_candidates(&input).unwrap();
    assert_eq!(records.len(), 9);

    let outcome = deduplicate(records, &DedupConfig::default());
    assert_eq!(outcome.unique.len(), 6);
    assert_eq!(outcome.report.primary_identifier_removed, 1);
    assert_eq!(outcome.report.secondary_identifier_removed, 1);
    assert_eq!(outcome.report.fuzzy_title_removed, 1);
    assert!(matches!(
        outcome.removed[0].reason,
        DuplicateReason::PrimaryIdentifier { .. }
    ));
    assert_eq!(outcome.removed[0].absorbed_by_title, INCLUDED_TITLE);
    assert_eq!(outcome.removed[1].record.source.as_deref(), Some("OpenAlex"));
    dir.write_dedup(&outcome).unwrap();

    // Screening
    let corpus = load_candidates(&dir.path(export::DEDUPLICATED_CSV)).unwrap();
    assert_eq!(corpus, outcome.unique);

    let oracle = scripted_oracle();
    let adapter = OracleAdapter::new(oracle.clone(), ScreeningPrompt::new(QUESTION), fast_oracle_config());
    let policy = ScreeningPolicy::strict();
    let log_path = dir.screening_log();

    let result = classify(
        &corpus,
        &adapter,
        &policy,
        &Orchestrator::new(4),
        Some(ProgressOptions::new(&log_path)),
    )
    .await
    .unwrap();

    assert_eq!(titles(result.zone(Zone::AutoInclude)), vec![INCLUDED_TITLE]);
    assert_eq!(
        titles(result.zone(Zone::AutoExclude)),
        vec![OFF_TOPIC_TITLE, NO_ABSTRACT_TITLE]
    );
    assert_eq!(
        titles(result.zone(Zone::HumanReview)),
        vec![BORDERLINE_TITLE, HALLUCINATED_TITLE]
    );
    assert_eq!(titles(result.zone(Zone::Error)), vec![FAILING_TITLE]);

    assert_eq!(oracle.calls_for(NO_ABSTRACT_TITLE), 0);
    assert_eq!(oracle.calls_for(FAILING_TITLE), 2);
    let usage = adapter.usage();
    assert_eq!(usage.empty_abstract_bypasses, 1);
    assert_eq!(usage.permanent_failures, 1);

    let summary = &result.summary;
    assert_eq!(summary.error, 1);
    assert_eq!(summary.downgraded, 1);
    assert!(summary.to_string().contains("WARNING: 1 record(s) failed scoring"));
    dir.write_screening(&result.decisions).unwrap();
    assert!(dir.path(export::ERRORS_CSV).exists());

    // Human review of the ambiguous zone
    let queue = human_review_queue(&result.decisions);
    let mut session = ReviewSession::open(&dir.review_log(), queue).unwrap();
    let mut reviewer = ScriptedReviewer::new(vec![
        (BORDERLINE_TITLE, include("speaking outcomes measured")),
        (HALLUCINATED_TITLE, exclude("")),
    ]);
    let review = session.run(&mut reviewer).unwrap();
    assert_eq!(review.decided, 2);
    assert_eq!(
        reviewer.seen,
        VecDeque::from([BORDERLINE_TITLE.to_string(), HALLUCINATED_TITLE.to_string()])
    );

    // Validation sample on top of the review queue
    let sample = stratified_sample(&result.decisions, 4, 42);
    assert_eq!(sample.len(), 4);
    let mut session = ReviewSession::open(&dir.review_log(), sample).unwrap();
    assert_eq!(session.pending_count(), 2);
    let mut reviewer = ScriptedReviewer::new(vec![
        (INCLUDED_TITLE, include("core study")),
        (OFF_TOPIC_TITLE, exclude("medical")),
        (NO_ABSTRACT_TITLE, exclude("no abstract to judge")),
    ]);
    session.run(&mut reviewer).unwrap();
    let human = session.into_decisions();
    assert_eq!(human.len(), 4);
    dir.write_human_decisions(&human).unwrap();

    // Agreement
    let screened = ProgressLog::<ScreeningDecision>::load(&log_path).unwrap();
    let reviewed = ProgressLog::<HumanDecision>::load(&dir.review_log()).unwrap();
    assert_eq!(reviewed, human);

    let report = validate(&screened, &reviewed).unwrap();
    assert_eq!(report.compared, 4);
    assert_eq!(report.matrix.true_positive, 1);
    assert_eq!(report.matrix.true_negative, 2);
    assert_eq!(report.over_exclusive, 1);
    assert_eq!(report.over_inclusive, 0);
    assert!(report.kappa > 0.0 && report.kappa < 1.0);
    assert_eq!(report.band, KappaBand::Moderate);

    dir.write_agreement(&report).unwrap();
    assert!(dir.path(export::KAPPA_REPORT_MD).exists());
    assert!(dir.path(export::KAPPA_REPORT_JSON).exists());
}

#[tokio::test]
async fn test_interrupted_screening_resumes_to_same_partition() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("candidates.csv");
    std::fs::write(&input, CANDIDATES_CSV).unwrap();
    let corpus = deduplicate(load_candidates(&input).unwrap(), &DedupConfig::default()).unique;
    let policy = ScreeningPolicy::strict();

    let full = classify(
        &corpus,
        &OracleAdapter::new(scripted_oracle(), ScreeningPrompt::new(QUESTION), fast_oracle_config()),
        &policy,
        &Orchestrator::new(3),
        None,
    )
    .await
    .unwrap();

    for cut in 0..=corpus.len() {
        let log_path = tmp.path().join(format!("progress_{cut}.jsonl"));
        let oracle = scripted_oracle();
        let adapter = OracleAdapter::new(oracle.clone(), ScreeningPrompt::new(QUESTION), fast_oracle_config());

        classify(
            &corpus[..cut],
            &adapter,
            &policy,
            &Orchestrator::new(3),
            Some(ProgressOptions::new(&log_path)),
        )
        .await
        .unwrap();

        let resumed = classify(
            &corpus,
            &adapter,
            &policy,
            &Orchestrator::new(3),
            Some(ProgressOptions::new(&log_path)),
        )
        .await
        .unwrap();

        assert_eq!(resumed.decisions, full.decisions, "cut after {cut}");
        assert_eq!(resumed.summary.resumed, cut);
        assert!(oracle.calls_for(INCLUDED_TITLE) <= 1);
    }
}
