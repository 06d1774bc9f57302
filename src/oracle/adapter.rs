use std::num::NonZeroU32;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use moka::sync::Cache;
use tracing::{debug, warn};

use super::ScoringOracle;
use super::config::OracleConfig;
use super::error::{OracleError, OracleResult};
use super::evidence::unverified_quotes;
use super::prompt::ScreeningPrompt;
use super::types::{DimensionScores, OracleResponse, ScoreRequest, ScoreResult};
use super::usage::{OracleUsage, UsageCounters};
use crate::hashing::hash_score_input;

type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Wraps a [`ScoringOracle`] with pacing, retries, validation and usage
/// accounting. Shared by reference across concurrent scoring tasks.
pub struct OracleAdapter {
    oracle: Arc<dyn ScoringOracle>,
    prompt: ScreeningPrompt,
    config: OracleConfig,
    limiter: DirectLimiter,
    memo: Cache<[u8; 32], ScoreResult>,
    /// Consecutive rate-limit responses across all callers.
    rate_limit_streak: AtomicU32,
    usage: UsageCounters,
}

impl OracleAdapter {
    pub fn new(oracle: Arc<dyn ScoringOracle>, prompt: ScreeningPrompt, config: OracleConfig) -> Self {
        let per_minute = NonZeroU32::new(config.requests_per_minute).unwrap_or(NonZeroU32::MIN);
        let limiter = RateLimiter::direct(Quota::per_minute(per_minute));
        let memo = Cache::new(config.cache_capacity);

        debug!(
            oracle = oracle.name(),
            prompt = %prompt.fingerprint(),
            requests_per_minute = per_minute.get(),
            max_attempts = config.max_attempts,
            "Oracle adapter ready"
        );

        Self {
            oracle,
            prompt,
            config,
            limiter,
            memo,
            rate_limit_streak: AtomicU32::new(0),
            usage: UsageCounters::default(),
        }
    }

    pub fn prompt(&self) -> &ScreeningPrompt {
        &self.prompt
    }

    pub fn config(&self) -> &OracleConfig {
        &self.config
    }

    pub fn usage(&self) -> OracleUsage {
        self.usage.snapshot()
    }

    /// Scores one record.
    ///
    /// Records without an abstract get all-zero scores and never reach the
    /// oracle. Identical (title, abstract) pairs are scored once per adapter.
    pub async fn score(&self, title: &str, abstract_text: &str) -> OracleResult<ScoreResult> {
        if abstract_text.trim().is_empty() {
            self.usage.bypass();
            return Ok(ScoreResult::empty_abstract());
        }

        let memo_key = hash_score_input(title, abstract_text);
        if let Some(hit) = self.memo.get(&memo_key) {
            self.usage.cache_hit();
            return Ok(hit);
        }

        let response = self.call_with_retry(title, abstract_text).await?;
        let result = validate_response(response, abstract_text);
        self.memo.insert(memo_key, result.clone());
        Ok(result)
    }

    async fn call_with_retry(&self, title: &str, abstract_text: &str) -> OracleResult<OracleResponse> {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            self.limiter.until_ready().await;
            self.usage.call();

            let request = ScoreRequest {
                title,
                abstract_text,
            };
            let outcome = match tokio::time::timeout(
                self.config.call_timeout,
                self.oracle.score(&self.prompt, request),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => Err(OracleError::Timeout {
                    elapsed: self.config.call_timeout,
                }),
            };

            match outcome {
                Ok(response) => {
                    self.rate_limit_streak.store(0, Ordering::Release);
                    self.usage.success(&response.usage);
                    return Ok(response);
                }
                Err(err) if err.is_transient() => {
                    self.usage.transient_failure();
                    if attempt >= max_attempts {
                        self.usage.exhausted();
                        warn!(attempts = attempt, error = %err, "Oracle retries exhausted");
                        return Err(OracleError::RetriesExhausted {
                            attempts: attempt,
                            last: Box::new(err),
                        });
                    }

                    let delay = self.retry_delay(attempt, &err);
                    self.usage.retry();
                    warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Transient oracle failure, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => {
                    self.usage.permanent_failure();
                    warn!(error = %err, "Permanent oracle failure");
                    return Err(err);
                }
            }
        }
    }

    /// Exponential delay, widened by the current rate-limit streak. A
    /// server `retry-after` hint wins when it is longer.
    pub(crate) fn retry_delay(&self, attempt: u32, err: &OracleError) -> Duration {
        let base = self.config.base_delay(attempt);

        match err {
            OracleError::RateLimited { retry_after } => {
                let streak = self.rate_limit_streak.fetch_add(1, Ordering::AcqRel) + 1;
                let widened = base.saturating_mul(streak).min(self.config.max_backoff);
                retry_after.map_or(widened, |hint| widened.max(hint))
            }
            _ => base,
        }
    }
}

/// Bounds the scores, recomputes the total and checks evidence grounding.
pub fn validate_response(response: OracleResponse, abstract_text: &str) -> ScoreResult {
    let scores = DimensionScores::bounded(&response.scores);
    let total = scores.total();

    if let Some(claimed) = response.total_score
        && claimed.round() as i32 != total
    {
        debug!(claimed, recomputed = total, "Oracle total differs from dimension sum");
    }

    let unverified = unverified_quotes(&response.evidence_quotes, abstract_text);
    if !unverified.is_empty() {
        warn!(
            unverified = unverified.len(),
            quotes = response.evidence_quotes.len(),
            "Evidence quotes not found in abstract"
        );
    }

    let confidence = response
        .confidence
        .filter(|c| c.is_finite())
        .map(|c| c.round().clamp(0.0, 100.0) as u8);

    ScoreResult {
        scores,
        evidence_quotes: response.evidence_quotes,
        unverified_quotes: unverified,
        reasoning: response.reasoning.unwrap_or_default(),
        confidence,
        abstract_missing: false,
    }
}
