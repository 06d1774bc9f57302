use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::ScoringOracle;
use super::error::{OracleError, OracleResult};
use super::prompt::ScreeningPrompt;
use super::types::{OracleResponse, ScoreRequest};

/// Deterministic scripted oracle.
///
/// Responses are keyed by title. Queued errors for a title are returned
/// first, one per call, then the scripted response (or the default).
#[derive(Default)]
pub struct MockOracle {
    responses: Mutex<HashMap<String, OracleResponse>>,
    failures: Mutex<HashMap<String, VecDeque<OracleError>>>,
    default_response: Mutex<Option<OracleResponse>>,
    per_title_calls: Mutex<HashMap<String, usize>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl MockOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleeps before every reply.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_default(self, response: OracleResponse) -> Self {
        *self.default_response.lock() = Some(response);
        self
    }

    pub fn with_response(self, title: &str, response: OracleResponse) -> Self {
        self.set_response(title, response);
        self
    }

    pub fn set_response(&self, title: &str, response: OracleResponse) {
        self.responses.lock().insert(title.to_string(), response);
    }

    pub fn push_failure(&self, title: &str, error: OracleError) {
        self.failures
            .lock()
            .entry(title.to_string())
            .or_default()
            .push_back(error);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn calls_for(&self, title: &str) -> usize {
        self.per_title_calls.lock().get(title).copied().unwrap_or(0)
    }
}

#[async_trait]
impl ScoringOracle for MockOracle {
    async fn score(
        &self,
        _prompt: &ScreeningPrompt,
        request: ScoreRequest<'_>,
    ) -> OracleResult<OracleResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self
            .per_title_calls
            .lock()
            .entry(request.title.to_string())
            .or_default() += 1;

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let failure = self
            .failures
            .lock()
            .get_mut(request.title)
            .and_then(VecDeque::pop_front);
        if let Some(err) = failure {
            return Err(err);
        }

        if let Some(response) = self.responses.lock().get(request.title) {
            return Ok(response.clone());
        }

        self.default_response
            .lock()
            .clone()
            .ok_or_else(|| OracleError::malformed(format!("no scripted response for '{}'", request.title)))
    }

    fn name(&self) -> &str {
        "mock"
    }
}
