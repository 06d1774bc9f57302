use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use super::types::TokenUsage;

/// Aggregate oracle usage for reporting. Never consulted for decisions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleUsage {
    /// Oracle invocations, including retries.
    pub calls: u64,
    pub successes: u64,
    pub retries: u64,
    /// Transient failures observed across all attempts.
    pub transient_failures: u64,
    /// Records that failed with a non-retryable error.
    pub permanent_failures: u64,
    /// Records that ran out of attempts.
    pub exhausted: u64,
    pub cache_hits: u64,
    pub empty_abstract_bypasses: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_read_tokens: u64,
}

#[derive(Debug, Default)]
pub(crate) struct UsageCounters {
    calls: AtomicU64,
    successes: AtomicU64,
    retries: AtomicU64,
    transient_failures: AtomicU64,
    permanent_failures: AtomicU64,
    exhausted: AtomicU64,
    cache_hits: AtomicU64,
    empty_abstract_bypasses: AtomicU64,
    input_tokens: AtomicU64,
    output_tokens: AtomicU64,
    cache_read_tokens: AtomicU64,
}

impl UsageCounters {
    pub(crate) fn call(&self) {
        self.calls.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn success(&self, tokens: &TokenUsage) {
        self.successes.fetch_add(1, Ordering::Relaxed);
        self.input_tokens
            .fetch_add(tokens.input_tokens, Ordering::Relaxed);
        self.output_tokens
            .fetch_add(tokens.output_tokens, Ordering::Relaxed);
        self.cache_read_tokens
            .fetch_add(tokens.cache_read_input_tokens, Ordering::Relaxed);
    }

    pub(crate) fn retry(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn transient_failure(&self) {
        self.transient_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn permanent_failure(&self) {
        self.permanent_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn exhausted(&self) {
        self.exhausted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn bypass(&self) {
        self.empty_abstract_bypasses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> OracleUsage {
        OracleUsage {
            calls: self.calls.load(Ordering::Relaxed),
            successes: self.successes.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            transient_failures: self.transient_failures.load(Ordering::Relaxed),
            permanent_failures: self.permanent_failures.load(Ordering::Relaxed),
            exhausted: self.exhausted.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            empty_abstract_bypasses: self.empty_abstract_bypasses.load(Ordering::Relaxed),
            input_tokens: self.input_tokens.load(Ordering::Relaxed),
            output_tokens: self.output_tokens.load(Ordering::Relaxed),
            cache_read_tokens: self.cache_read_tokens.load(Ordering::Relaxed),
        }
    }
}
