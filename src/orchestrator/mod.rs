//! Bounded-concurrency scheduling.
//!
//! Work items run through `buffer_unordered` with a fixed width. Results are
//! handed to a single consumer as they complete, tagged with the item's input
//! index so callers can merge by identity rather than completion order.
//!
//! A [`StopSignal`] stops the orchestrator from starting new items. Items
//! already in flight run to completion (or their own timeout).


use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use futures_util::StreamExt;
use futures_util::stream;
use tracing::{debug, info};

use crate::constants::DEFAULT_WORKERS;

/// Cooperative "stop accepting new work" flag.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    stopped: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }
}

/// Counts for one [`Orchestrator::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub submitted: usize,
    pub completed: usize,
    /// Items never started because the stop signal was raised.
    pub skipped: usize,
}

#[derive(Debug, Clone)]
pub struct Orchestrator {
    width: usize,
    stop: StopSignal,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new(DEFAULT_WORKERS)
    }
}

impl Orchestrator {
    /// Width is clamped to at least one worker.
    pub fn new(width: usize) -> Self {
        Self {
            width: width.max(1),
            stop: StopSignal::new(),
        }
    }

    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Runs `work` over `items` with at most `width` in flight and passes
    /// each `(index, output)` to `on_complete` in completion order.
    ///
    /// An error from `on_complete` aborts the run. In-flight futures are
    /// dropped in that case.
    pub async fn run<I, T, E, F, Fut, C>(
        &self,
        items: Vec<I>,
        work: F,
        mut on_complete: C,
    ) -> Result<RunStats, E>
    where
        F: Fn(I) -> Fut,
        Fut: Future<Output = T>,
        C: FnMut(usize, T) -> Result<(), E>,
    {
        let submitted = items.len();
        let started = AtomicUsize::new(0);
        let stop = &self.stop;
        let work = &work;
        let started_ref = &started;

        debug!(submitted, width = self.width, "Orchestrator starting");

        let mut results = stream::iter(items.into_iter().enumerate())
            .take_while(|_| std::future::ready(!stop.is_stopped()))
            .map(|(index, item)| {
                started_ref.fetch_add(1, Ordering::Relaxed);
                let fut = work(item);
                async move { (index, fut.await) }
            })
            .buffer_unordered(self.width);

        let mut completed = 0;
        while let Some((index, output)) = results.next().await {
            completed += 1;
            on_complete(index, output)?;
        }
        drop(results);

        let skipped = submitted - started.load(Ordering::Relaxed);
        if skipped > 0 {
            info!(completed, skipped, "Stop requested, remaining work not started");
        }

        Ok(RunStats {
            submitted,
            completed,
            skipped,
        })
    }
}
