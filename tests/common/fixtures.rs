//! Shared corpus, scripted oracle and scripted reviewer.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use litscreen::oracle::{MockOracle, OracleConfig, OracleError, OracleResponse};
use litscreen::review::{ReviewAction, ReviewResult, Reviewer};
use litscreen::screening::ScreeningDecision;

pub const INCLUDED_TITLE: &str = "Chatbots for EFL speaking practice: a randomized trial";
pub const BORDERLINE_TITLE: &str = "Voice assistants and oral proficiency";
pub const OFF_TOPIC_TITLE: &str = "Deep learning for retinal image segmentation";
pub const NO_ABSTRACT_TITLE: &str = "Teacher perceptions of AI tutors";
pub const FAILING_TITLE: &str = "Automated writing feedback in secondary school";
pub const HALLUCINATED_TITLE: &str = "Speaking anxiety and conversational agents";

/// Nine rows: one identifier duplicate, one preprint-id duplicate and one
/// near-identical title, leaving six unique records.
pub const CANDIDATES_CSV: &str = "\
title,abstract,authors,year,doi,arxiv_id,source
\"Chatbots for EFL speaking practice: a randomized trial\",\"Learners who practised with a chatbot showed improved speaking fluency in a randomized trial.\",\"Kim, J.\",2023,10.1000/ABC,,Semantic Scholar
\"Chatbots for EFL speaking practice: a randomized trial (preprint)\",\"Learners who practised with a chatbot showed improved speaking fluency in a randomized trial.\",\"Kim, J.\",2023,https://doi.org/10.1000/abc,2301.00001,arXiv
Voice assistants and oral proficiency,A mixed-methods study of voice assistants used by high school learners for speaking practice.,\"Lee, S.\",2022,,2302.12345,arXiv
Voice assistants and oral proficiency,A mixed-methods study of voice assistants used by high school learners for speaking practice.,\"Lee, S.\",2022.0,,arXiv:2302.12345v2,OpenAlex
Deep learning for retinal image segmentation,We segment retinal vessels using a convolutional network.,\"Chen, L.\",2021,10.2000/xyz,,OpenAlex
Deep Learning for Retinal Image Segmentation!,We segment retinal vessels using a convolutional network.,\"Chen, L.\",2021,,,nan
Teacher perceptions of AI tutors,,\"Park, H.\",2020,,,OpenAlex
Automated writing feedback in secondary school,Automated feedback on essays improved revision quality.,\"Ng, T.\",2024,10.3000/w,,Semantic Scholar
Speaking anxiety and conversational agents,Conversational agents reduced speaking anxiety among university students.,\"Ito, M.\",2024,10.4000/q,,Semantic Scholar
";

pub fn fast_oracle_config() -> OracleConfig {
    OracleConfig {
        max_attempts: 3,
        backoff_base: Duration::from_millis(1),
        max_backoff: Duration::from_millis(10),
        requests_per_minute: 60_000,
        call_timeout: Duration::from_secs(5),
        cache_capacity: 1_000,
    }
}

/// Oracle scripted for the unique records of [`CANDIDATES_CSV`].
pub fn scripted_oracle() -> Arc<MockOracle> {
    let oracle = MockOracle::new()
        .with_response(
            INCLUDED_TITLE,
            OracleResponse::from_scores(10, 10, 5, 10, 0, 10)
                .with_quotes(["Outcome: ...randomized trial"])
                .with_reasoning("Chatbot intervention with speaking outcomes"),
        )
        .with_response(
            BORDERLINE_TITLE,
            OracleResponse::from_scores(8, 8, 3, 6, 0, 0).with_reasoning("Relevant population, weak design"),
        )
        .with_response(
            OFF_TOPIC_TITLE,
            OracleResponse::from_scores(0, 0, 3, 0, -20, 0).with_reasoning("Medical imaging"),
        )
        .with_response(
            HALLUCINATED_TITLE,
            OracleResponse::from_scores(10, 10, 4, 10, 0, 10)
                .with_quotes(["students doubled their speaking fluency"]),
        );
    // one transient blip, then a permanent rejection
    oracle.push_failure(FAILING_TITLE, OracleError::Server { status: 503 });
    oracle.push_failure(
        FAILING_TITLE,
        OracleError::InvalidRequest {
            status: 400,
            message: "prompt rejected".to_string(),
        },
    );
    Arc::new(oracle)
}

/// Labels records by title; anything unlisted is skipped.
pub struct ScriptedReviewer {
    labels: Vec<(&'static str, ReviewAction)>,
    pub seen: VecDeque<String>,
}

impl ScriptedReviewer {
    pub fn new(labels: Vec<(&'static str, ReviewAction)>) -> Self {
        Self {
            labels,
            seen: VecDeque::new(),
        }
    }
}

impl Reviewer for ScriptedReviewer {
    fn review(&mut self, decision: &ScreeningDecision, _: usize, _: usize) -> ReviewResult<ReviewAction> {
        self.seen.push_back(decision.record.title.clone());
        Ok(self
            .labels
            .iter()
            .find(|(title, _)| *title == decision.record.title)
            .map(|(_, action)| action.clone())
            .unwrap_or(ReviewAction::Skip))
    }
}
