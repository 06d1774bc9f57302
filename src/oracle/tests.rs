use std::sync::Arc;
use std::time::Duration;

use super::evidence::{normalize_quote, quote_in_abstract, unverified_quotes};
use super::*;

const ABSTRACT: &str = "We ran a randomized controlled trial with 120 university students. \
                        Speaking scores improved significantly after eight weeks of chatbot practice.";

fn fast_config() -> OracleConfig {
    OracleConfig {
        max_attempts: 3,
        backoff_base: Duration::from_millis(1),
        max_backoff: Duration::from_millis(10),
        requests_per_minute: 60_000,
        call_timeout: Duration::from_secs(5),
        cache_capacity: 100,
    }
}

fn adapter_with(mock: Arc<MockOracle>, config: OracleConfig) -> OracleAdapter {
    OracleAdapter::new(mock, ScreeningPrompt::new("Chatbots for speaking practice"), config)
}

// --- Score bounding ---

#[test]
fn test_bounded_clamps_every_dimension() {
    let raw = RawScores {
        domain: 14.0,
        intervention: -3.0,
        method: 9.0,
        outcome: 7.4,
        exclusion: -35.0,
        title_bonus: 3.0,
    };
    let scores = DimensionScores::bounded(&raw);
    assert_eq!(
        scores,
        DimensionScores {
            domain: 10,
            intervention: 0,
            method: 5,
            outcome: 7,
            exclusion: -20,
            title_bonus: 0,
        }
    );
    assert_eq!(scores.total(), 2);
}

#[test]
fn test_title_bonus_snaps_to_full_bonus() {
    let raw = RawScores {
        title_bonus: 7.0,
        ..RawScores::default()
    };
    assert_eq!(DimensionScores::bounded(&raw).title_bonus, 10);
}

#[test]
fn test_non_finite_scores_are_bounded() {
    let raw = RawScores {
        domain: f64::NAN,
        intervention: f64::INFINITY,
        method: f64::NEG_INFINITY,
        outcome: 0.0,
        exclusion: f64::NAN,
        title_bonus: f64::NAN,
    };
    let scores = DimensionScores::bounded(&raw);
    assert_eq!(scores.domain, 0);
    assert_eq!(scores.intervention, 10);
    assert_eq!(scores.method, 0);
    assert_eq!(scores.title_bonus, 0);
    assert!((-20..=50).contains(&scores.total()));
}

#[test]
fn test_extreme_totals_stay_in_range() {
    let max = DimensionScores::bounded(&RawScores {
        domain: 99.0,
        intervention: 99.0,
        method: 99.0,
        outcome: 99.0,
        exclusion: 99.0,
        title_bonus: 99.0,
    });
    let min = DimensionScores::bounded(&RawScores {
        domain: -99.0,
        intervention: -99.0,
        method: -99.0,
        outcome: -99.0,
        exclusion: -99.0,
        title_bonus: -99.0,
    });
    assert_eq!(max.total(), crate::constants::DIMENSION_SUM_MAX);
    assert!(max.total() <= crate::constants::TOTAL_MAX);
    assert_eq!(min.total(), -20);
}

// --- Parsing ---

#[test]
fn test_parse_bare_json() {
    let text = r#"{"scores": {"domain": 8, "intervention": 9, "method": 5, "outcomes": 7,
                   "exclusion": 0, "title_bonus": 10},
                   "total_score": 39, "confidence": 85, "decision": "auto-include",
                   "reasoning": "Relevant.", "evidence_quotes": ["university students"]}"#;
    let response = parse_response(text).unwrap();
    assert_eq!(response.scores.outcome, 7.0);
    assert_eq!(response.total_score, Some(39.0));
    assert_eq!(response.evidence_quotes, vec!["university students"]);
}

#[test]
fn test_parse_fenced_json_with_prose() {
    let text = "Here is my assessment:\n```json\n{\"scores\": {\"domain\": 1, \"intervention\": 2, \
                \"method\": 3, \"outcome\": 4, \"exclusion\": -5, \"title_bonus\": 0}}\n```\nThanks.";
    let response = parse_response(text).unwrap();
    assert_eq!(response.scores.exclusion, -5.0);
    assert!(response.evidence_quotes.is_empty());
}

#[test]
fn test_parse_rejects_missing_dimension() {
    let text = r#"{"scores": {"domain": 8, "intervention": 9}}"#;
    let err = parse_response(text).unwrap_err();
    assert!(matches!(err, OracleError::MalformedResponse { .. }));
    assert!(!err.is_transient());
}

#[test]
fn test_parse_rejects_non_json() {
    assert!(matches!(
        parse_response("I cannot score this paper."),
        Err(OracleError::MalformedResponse { .. })
    ));
}

// --- Evidence grounding ---

#[test]
fn test_normalize_quote_strips_decoration() {
    assert_eq!(
        normalize_quote("Domain: \"120 University   Students\""),
        "120 university students"
    );
    assert_eq!(normalize_quote("\u{201c}...speaking scores improved\u{2026}\u{201d}"), "speaking scores improved");
    assert_eq!(normalize_quote("  \"\"  "), "");
}

#[test]
fn test_quote_grounding_is_case_insensitive() {
    assert!(quote_in_abstract("RANDOMIZED CONTROLLED TRIAL", ABSTRACT));
    assert!(quote_in_abstract("Intervention: chatbot practice", ABSTRACT));
    assert!(!quote_in_abstract("students loved the chatbot", ABSTRACT));
}

#[test]
fn test_unverified_quotes_lists_only_hallucinations() {
    let quotes = vec![
        "eight weeks of chatbot practice".to_string(),
        "participants were K-12 pupils".to_string(),
        "".to_string(),
    ];
    assert_eq!(
        unverified_quotes(&quotes, ABSTRACT),
        vec!["participants were K-12 pupils".to_string()]
    );
}

#[test]
fn test_validate_response_recomputes_total() {
    let response = OracleResponse::from_scores(10, 10, 5, 10, 0, 10)
        .with_claimed_total(12.0)
        .with_confidence(140.0);
    let result = validate_response(response, ABSTRACT);
    assert_eq!(result.total(), 45);
    assert_eq!(result.confidence, Some(100));
    assert!(result.evidence_verified());
}

// --- Adapter ---

#[tokio::test]
async fn test_empty_abstract_bypasses_oracle() {
    let mock = Arc::new(MockOracle::new());
    let adapter = adapter_with(mock.clone(), fast_config());

    let result = adapter.score("Any title", "   ").await.unwrap();

    assert_eq!(result.scores, DimensionScores::ZERO);
    assert_eq!(result.total(), 0);
    assert!(result.abstract_missing);
    assert_eq!(mock.call_count(), 0);
    assert_eq!(adapter.usage().empty_abstract_bypasses, 1);
}

#[tokio::test]
async fn test_identical_inputs_are_scored_once() {
    let mock = Arc::new(
        MockOracle::new().with_response("T", OracleResponse::from_scores(5, 5, 2, 5, 0, 0)),
    );
    let adapter = adapter_with(mock.clone(), fast_config());

    let first = adapter.score("T", ABSTRACT).await.unwrap();
    let second = adapter.score("T", ABSTRACT).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(mock.call_count(), 1);
    assert_eq!(adapter.usage().cache_hits, 1);
}

#[tokio::test]
async fn test_transient_failures_are_retried() {
    let mock = Arc::new(
        MockOracle::new().with_response("T", OracleResponse::from_scores(8, 8, 4, 8, 0, 10)),
    );
    mock.push_failure("T", OracleError::RateLimited { retry_after: None });
    mock.push_failure("T", OracleError::Server { status: 503 });
    let adapter = adapter_with(mock.clone(), fast_config());

    let result = adapter.score("T", ABSTRACT).await.unwrap();

    assert_eq!(result.total(), 38);
    assert_eq!(mock.call_count(), 3);
    let usage = adapter.usage();
    assert_eq!(usage.calls, 3);
    assert_eq!(usage.retries, 2);
    assert_eq!(usage.transient_failures, 2);
    assert_eq!(usage.successes, 1);
}

#[tokio::test]
async fn test_retries_are_bounded() {
    let mock = Arc::new(
        MockOracle::new().with_response("T", OracleResponse::from_scores(8, 8, 4, 8, 0, 10)),
    );
    for _ in 0..5 {
        mock.push_failure("T", OracleError::Server { status: 500 });
    }
    let adapter = adapter_with(mock.clone(), fast_config());

    let err = adapter.score("T", ABSTRACT).await.unwrap_err();

    match err {
        OracleError::RetriesExhausted { attempts, last } => {
            assert_eq!(attempts, 3);
            assert!(matches!(*last, OracleError::Server { status: 500 }));
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(mock.call_count(), 3);
    assert_eq!(adapter.usage().exhausted, 1);
}

#[tokio::test]
async fn test_permanent_failures_are_not_retried() {
    let mock = Arc::new(
        MockOracle::new().with_response("T", OracleResponse::from_scores(8, 8, 4, 8, 0, 10)),
    );
    mock.push_failure("T", OracleError::Auth { status: 401 });
    let adapter = adapter_with(mock.clone(), fast_config());

    let err = adapter.score("T", ABSTRACT).await.unwrap_err();

    assert!(matches!(err, OracleError::Auth { status: 401 }));
    assert_eq!(mock.call_count(), 1);
    assert_eq!(adapter.usage().permanent_failures, 1);
}

#[tokio::test]
async fn test_slow_oracle_times_out() {
    let mock = Arc::new(
        MockOracle::new()
            .with_default(OracleResponse::from_scores(1, 1, 1, 1, 0, 0))
            .with_delay(Duration::from_millis(500)),
    );
    let config = OracleConfig {
        max_attempts: 1,
        call_timeout: Duration::from_millis(20),
        ..fast_config()
    };
    let adapter = adapter_with(mock, config);

    let err = adapter.score("T", ABSTRACT).await.unwrap_err();
    match err {
        OracleError::RetriesExhausted { last, .. } => {
            assert!(matches!(*last, OracleError::Timeout { .. }))
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn test_hallucinated_quote_is_flagged() {
    let mock = Arc::new(MockOracle::new().with_response(
        "T",
        OracleResponse::from_scores(10, 10, 5, 10, 0, 10)
            .with_quotes(["randomized controlled trial", "doubled vocabulary retention"]),
    ));
    let adapter = adapter_with(mock, fast_config());

    let result = adapter.score("T", ABSTRACT).await.unwrap();

    assert!(!result.evidence_verified());
    assert_eq!(result.unverified_quotes, vec!["doubled vocabulary retention"]);
    assert_eq!(result.evidence_quotes.len(), 2);
}

#[test]
fn test_base_delay_doubles_and_caps() {
    let config = OracleConfig {
        backoff_base: Duration::from_millis(100),
        max_backoff: Duration::from_millis(350),
        ..OracleConfig::default()
    };
    assert_eq!(config.base_delay(1), Duration::from_millis(100));
    assert_eq!(config.base_delay(2), Duration::from_millis(200));
    assert_eq!(config.base_delay(3), Duration::from_millis(350));
}

#[test]
fn test_rate_limit_streak_widens_backoff() {
    let config = OracleConfig {
        backoff_base: Duration::from_millis(100),
        max_backoff: Duration::from_secs(10),
        ..fast_config()
    };
    let adapter = adapter_with(Arc::new(MockOracle::new()), config);
    let limited = OracleError::RateLimited { retry_after: None };

    assert_eq!(adapter.retry_delay(1, &limited), Duration::from_millis(100));
    assert_eq!(adapter.retry_delay(1, &limited), Duration::from_millis(200));
    assert_eq!(adapter.retry_delay(1, &limited), Duration::from_millis(300));

    let server = OracleError::Server { status: 502 };
    assert_eq!(adapter.retry_delay(2, &server), Duration::from_millis(200));
}

#[test]
fn test_retry_after_hint_wins_when_longer() {
    let adapter = adapter_with(Arc::new(MockOracle::new()), fast_config());
    let limited = OracleError::RateLimited {
        retry_after: Some(Duration::from_secs(2)),
    };
    assert_eq!(adapter.retry_delay(1, &limited), Duration::from_secs(2));
}

#[test]
fn test_error_taxonomy() {
    assert!(OracleError::Timeout { elapsed: Duration::from_secs(1) }.is_transient());
    assert!(OracleError::Transport { message: "reset".into() }.is_transient());
    assert!(!OracleError::malformed("x").is_transient());
    let exhausted = OracleError::RetriesExhausted {
        attempts: 3,
        last: Box::new(OracleError::Server { status: 500 }),
    };
    assert!(!exhausted.is_transient());
}

#[test]
fn test_prompt_separates_static_and_dynamic_parts() {
    let prompt = ScreeningPrompt::new("Chatbots for speaking practice");
    assert!(prompt.system_text().contains("Research question: Chatbots for speaking practice"));
    assert!(!prompt.system_text().contains("Some title"));
    let user = prompt.user_text("Some title", "Some abstract");
    assert!(user.contains("Some title") && user.contains("Some abstract"));
    assert_eq!(prompt.fingerprint(), ScreeningPrompt::new("Chatbots for speaking practice").fingerprint());
}
