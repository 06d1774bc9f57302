use super::*;
use crate::record::CandidateRecord;

fn record(title: &str) -> CandidateRecord {
    CandidateRecord::new(title)
}

#[test]
fn test_case_insensitive_doi_keeps_higher_priority_source() {
    let records = vec![
        record("Foo Bar").with_doi("10.1/X").with_source("arXiv"),
        record("Foo Bar (reprint)")
            .with_doi("10.1/x")
            .with_source("Semantic Scholar"),
    ];

    let outcome = deduplicate(records, &DedupConfig::default());

    assert_eq!(outcome.removed.len(), 1);
    assert_eq!(outcome.unique.len(), 1);
    assert_eq!(outcome.unique[0].source.as_deref(), Some("Semantic Scholar"));

    let removal = &outcome.removed[0];
    assert_eq!(removal.reason.label(), "identifier-duplicate");
    assert_eq!(removal.record.title, "Foo Bar");
    assert_eq!(removal.absorbed_by_title, "Foo Bar (reprint)");
    assert_eq!(removal.absorbed_by, outcome.unique[0].key());
}

#[test]
fn test_priority_ties_keep_first_in_input_order() {
    let records = vec![
        record("A").with_doi("10.1/a").with_source("Unknown DB"),
        record("A again").with_doi("10.1/a").with_source("Other DB"),
    ];
    let outcome = deduplicate(records, &DedupConfig::default());
    assert_eq!(outcome.unique[0].title, "A");
}

#[test]
fn test_missing_identifiers_never_match() {
    let records = vec![
        record("Alpha study of tutors"),
        record("Completely unrelated beta"),
        record("Gamma").with_doi("   "),
        record("Delta reading intervention").with_doi(""),
    ];
    let outcome = deduplicate(records, &DedupConfig::default());
    assert!(outcome.removed.is_empty());
    assert_eq!(outcome.unique.len(), 4);
}

#[test]
fn test_secondary_identifier_pass_uses_its_own_priority() {
    let records = vec![
        record("Preprint A").with_arxiv_id("2401.00001v1").with_source("OpenAlex"),
        record("Preprint A v2").with_arxiv_id("2401.00001v2").with_source("arXiv"),
    ];
    let outcome = deduplicate(records, &DedupConfig::default());
    assert_eq!(outcome.unique.len(), 1);
    assert_eq!(outcome.unique[0].source.as_deref(), Some("arXiv"));
    assert_eq!(
        outcome.removed[0].reason,
        DuplicateReason::SecondaryIdentifier {
            identifier: "2401.00001".to_string()
        }
    );
}

#[test]
fn test_fuzzy_title_duplicates_removed() {
    let records = vec![
        record("Chatbots for Second Language Speaking Practice"),
        record("Chatbots for second-language speaking practice."),
        record("Deep learning for medical imaging"),
    ];
    let outcome = deduplicate(records, &DedupConfig::default());

    assert_eq!(outcome.unique.len(), 2);
    assert_eq!(outcome.report.fuzzy_title_removed, 1);
    match &outcome.removed[0].reason {
        DuplicateReason::FuzzyTitle { similarity } => assert!(*similarity >= 0.85),
        other => panic!("unexpected reason {other:?}"),
    }
}

#[test]
fn test_empty_titles_are_never_fuzzy_duplicates() {
    let records = vec![record(""), record(""), record("   ...  ")];
    let outcome = deduplicate(records, &DedupConfig::default());
    assert_eq!(outcome.unique.len(), 3);
    assert!(outcome.removed.is_empty());
}

#[test]
fn test_deduplication_is_idempotent() {
    let records = vec![
        record("Foo Bar").with_doi("10.1/X").with_source("arXiv"),
        record("Foo Bar (reprint)").with_doi("10.1/x").with_source("OpenAlex"),
        record("Speaking anxiety and chatbots").with_arxiv_id("2301.1"),
        record("Speaking anxiety and chatbots!").with_arxiv_id("2301.1v2"),
        record("Speaking anxiety and chat bots"),
        record("Something else entirely"),
    ];
    let config = DedupConfig::default();
    let first = deduplicate(records, &config);
    let second = deduplicate(first.unique.clone(), &config);

    assert!(second.removed.is_empty());
    assert_eq!(second.unique, first.unique);
}

#[test]
fn test_survivors_are_unmodified_and_in_input_order() {
    let records = vec![
        record("Zeta").with_abstract("z").with_year(2020),
        record("Alpha").with_doi("10.9/a"),
        record("Zeta").with_abstract("dup"),
        record("Mu"),
    ];
    let expected = vec![records[0].clone(), records[1].clone(), records[3].clone()];
    let outcome = deduplicate(records, &DedupConfig::default());
    assert_eq!(outcome.unique, expected);
}

#[test]
fn test_report_counts_per_pass_and_origin() {
    let records = vec![
        record("A").with_doi("10.1/a").with_source("Semantic Scholar"),
        record("A copy").with_doi("10.1/A").with_source("OpenAlex"),
        record("B").with_arxiv_id("1").with_source("arXiv"),
        record("B copy").with_arxiv_id("1"),
        record("Learning outcomes with voice assistants"),
        record("Learning outcomes with voice assistants"),
    ];
    let outcome = deduplicate(records, &DedupConfig::default());
    let report = &outcome.report;

    assert_eq!(report.input, 6);
    assert_eq!(report.unique, 3);
    assert_eq!(report.primary_identifier_removed, 1);
    assert_eq!(report.secondary_identifier_removed, 1);
    assert_eq!(report.fuzzy_title_removed, 1);
    assert_eq!(report.total_removed(), 3);
    assert_eq!(report.removed_by_origin.get("OpenAlex"), Some(&1));
    assert_eq!(report.removed_by_origin.get("unknown"), Some(&2));
}

#[test]
fn test_threshold_is_configurable() {
    let records = vec![record("Speaking practice"), record("Speaking practise")];
    let strict = DedupConfig {
        duplicate_threshold: 1.0,
        ..DedupConfig::default()
    };
    assert_eq!(deduplicate(records.clone(), &strict).unique.len(), 2);
    assert_eq!(deduplicate(records, &DedupConfig::default()).unique.len(), 1);
}

#[test]
fn test_source_priority_rank() {
    let priority = SourcePriority::primary_default();
    assert_eq!(priority.rank(Some("semantic scholar")), 0);
    assert_eq!(priority.rank(Some("ARXIV")), 2);
    assert_eq!(priority.rank(Some("Scopus")), 3);
    assert_eq!(priority.rank(None), 3);
}
