use chrono::Utc;

use super::csv::parse_rows;
use super::*;
use crate::dedup::{DedupConfig, deduplicate};
use crate::oracle::{DimensionScores, OracleError, ScoreResult};
use crate::record::{CandidateRecord, load_candidates};
use crate::review::{HumanLabel, ReviewerConfidence};
use crate::screening::ScreeningPolicy;
use crate::validation::validate;

fn read_rows(dir: &OutputDir, name: &str) -> Vec<Vec<String>> {
    let text = std::fs::read_to_string(dir.path(name)).unwrap();
    parse_rows(&text).unwrap()
}

fn decision(title: &str, domain: i32, quotes: &[&str]) -> ScreeningDecision {
    let score = ScoreResult {
        scores: DimensionScores {
            domain,
            ..DimensionScores::ZERO
        },
        evidence_quotes: quotes.iter().map(|q| q.to_string()).collect(),
        unverified_quotes: Vec::new(),
        reasoning: format!("reasoning for {title}"),
        confidence: None,
        abstract_missing: false,
    };
    let record = CandidateRecord::new(title)
        .with_abstract("Students, teachers and \"chatbots\"")
        .with_year(2022);
    ScreeningDecision::scored(record, score, &ScreeningPolicy::custom(8, 3).unwrap())
}

fn decisions() -> Vec<ScreeningDecision> {
    vec![
        decision("Included paper", 10, &["Students", "teachers"]),
        decision("Excluded paper", 0, &[]),
        decision("Borderline paper", 5, &[]),
        ScreeningDecision::failed(
            CandidateRecord::new("Failed paper").with_abstract("x"),
            &OracleError::Timeout {
                elapsed: std::time::Duration::from_secs(60),
            },
        ),
    ]
}

#[test]
fn test_dedup_outputs_reload_as_candidates() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = OutputDir::create(tmp.path().join("run")).unwrap();

    let records = vec![
        CandidateRecord::new("Chatbots for speaking, a review")
            .with_doi("10.1/X")
            .with_abstract("Line one\nline \"two\"")
            .with_authors("Park, H.")
            .with_year(2021)
            .with_source("Semantic Scholar"),
        CandidateRecord::new("Chatbots for speaking, a review (reprint)")
            .with_doi("10.1/x")
            .with_source("OpenAlex"),
        CandidateRecord::new("Unrelated"),
    ];
    let outcome = deduplicate(records, &DedupConfig::default());
    dir.write_dedup(&outcome).unwrap();

    let reloaded = load_candidates(&dir.path(DEDUPLICATED_CSV)).unwrap();
    assert_eq!(reloaded, outcome.unique);

    let removed = read_rows(&dir, DEDUP_REMOVED_CSV);
    assert_eq!(removed[0], tables::REMOVAL_COLUMNS);
    assert_eq!(removed.len(), 2);
    assert_eq!(removed[1][4], "identifier-duplicate");
    assert_eq!(removed[1][7], "Chatbots for speaking, a review");

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path(DEDUP_REPORT_JSON)).unwrap()).unwrap();
    assert_eq!(report["primary_identifier_removed"], 1);
}

#[test]
fn test_screening_partitions_every_zone() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = OutputDir::create(tmp.path()).unwrap();
    let decisions = decisions();
    dir.write_screening(&decisions).unwrap();

    for (zone, title) in [
        (Zone::AutoInclude, "Included paper"),
        (Zone::AutoExclude, "Excluded paper"),
        (Zone::HumanReview, "Borderline paper"),
        (Zone::Error, "Failed paper"),
    ] {
        let rows = read_rows(&dir, zone_file(zone));
        assert_eq!(rows[0], tables::DECISION_COLUMNS);
        assert_eq!(rows.len(), 2, "{zone}");
        assert_eq!(rows[1][1], title);
        assert_eq!(rows[1][15], zone.as_str());
    }

    let all = read_rows(&dir, ALL_SCREENED_CSV);
    assert_eq!(all.len(), 5);

    let included = &all[1];
    assert_eq!(included[2], "Students, teachers and \"chatbots\"");
    assert_eq!(included[8], "10");
    assert_eq!(included[14], "10");
    assert_eq!(included[19], "Students | teachers");

    let failed = &all[4];
    assert_eq!(failed[14], "");
    assert!(failed[21].contains("timed out"));
}

#[test]
fn test_human_decisions_carry_agreement_flag() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = OutputDir::create(tmp.path()).unwrap();
    let decisions = decisions();

    let humans: Vec<HumanDecision> = [(0, HumanLabel::Include), (1, HumanLabel::Include)]
        .into_iter()
        .map(|(i, label)| HumanDecision {
            key: decisions[i].key.clone(),
            title: decisions[i].record.title.clone(),
            label,
            reasoning: "read it".to_string(),
            confidence: ReviewerConfidence::Low,
            reviewed_at: Utc::now(),
            ai_zone: decisions[i].zone,
            ai_total: decisions[i].total(),
        })
        .collect();
    dir.write_human_decisions(&humans).unwrap();

    let rows = read_rows(&dir, HUMAN_DECISIONS_CSV);
    assert_eq!(rows[0], tables::HUMAN_DECISION_COLUMNS);
    assert_eq!(rows[1][2], "include");
    assert_eq!(rows[1][4], "low");
    assert_eq!(rows[1][8], "true");
    assert_eq!(rows[2][6], "auto-exclude");
    assert_eq!(rows[2][8], "false");

    let report = validate(&decisions, &humans).unwrap();
    dir.write_agreement(&report).unwrap();
    let md = std::fs::read_to_string(dir.path(KAPPA_REPORT_MD)).unwrap();
    assert!(md.contains("Paired records: 2"));
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path(KAPPA_REPORT_JSON)).unwrap()).unwrap();
    assert_eq!(json["over_exclusive"], 1);
}

#[test]
fn test_log_paths_live_in_output_dir() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = OutputDir::create(tmp.path()).unwrap();
    assert_eq!(dir.screening_log(), tmp.path().join(SCREENING_PROGRESS_LOG));
    assert_eq!(dir.review_log(), tmp.path().join(REVIEW_PROGRESS_LOG));
    assert_eq!(dir.root(), tmp.path());
}
