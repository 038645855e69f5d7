//! Bounded worker pool for one depth level
//!
//! This module handles:
//! - Sharing a level's task queue between exactly `parallels` workers
//! - Per-domain rate limiting before every fetch
//! - Fetch and extract for each task, with failures captured per task
//! - Cancellation: no task is started after the signal, rate-limit waits end
//!   at once, and in-flight fetches get a grace period before being abandoned
//!
//! The scheduler returns only once every worker has exited, which is the
//! barrier between one depth level and the next.

use crate::crawler::extractor::Extractor;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::rate_limiter::DomainRateLimiter;
use crate::crawler::result::{CrawlEvent, FailedUrl, ScrapedRecord};
use crate::crawler::stream::EventSink;
use crate::url::extract_domain;
use crate::CrawlError;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use url::Url;

/// A URL admitted to the run, with the BFS level it was discovered at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    pub url: Url,
    pub depth: u32,
}

/// Outcome of a single task
pub type TaskOutcome = Result<ScrapedRecord, FailedUrl>;

/// Shared pieces every worker needs
#[derive(Clone)]
struct Worker {
    queue: Arc<Mutex<VecDeque<(usize, CrawlTask)>>>,
    fetcher: Arc<dyn Fetcher>,
    extractor: Extractor,
    limiter: Arc<DomainRateLimiter>,
    cancel: CancellationToken,
    grace: Duration,
    done: mpsc::UnboundedSender<(usize, TaskOutcome)>,
}

/// Runs depth levels through a fixed-size worker pool
pub struct Scheduler {
    parallels: usize,
    fetcher: Arc<dyn Fetcher>,
    extractor: Extractor,
    limiter: Arc<DomainRateLimiter>,
    cancel: CancellationToken,
    grace: Duration,
}

impl Scheduler {
    pub fn new(
        parallels: usize,
        fetcher: Arc<dyn Fetcher>,
        extractor: Extractor,
        limiter: Arc<DomainRateLimiter>,
        cancel: CancellationToken,
        grace: Duration,
    ) -> Self {
        Self {
            parallels: parallels.max(1),
            fetcher,
            extractor,
            limiter,
            cancel,
            grace,
        }
    }

    /// Processes every task of one level and waits for all of them
    ///
    /// Each outcome is streamed to `sink` as it completes. The returned vector
    /// is indexed like `tasks`; a slot is `None` only for a task that was
    /// never started because the run was cancelled.
    pub(crate) async fn run_level(
        &self,
        tasks: Vec<CrawlTask>,
        sink: &EventSink,
    ) -> Vec<Option<TaskOutcome>> {
        let total = tasks.len();
        let mut slots: Vec<Option<TaskOutcome>> = (0..total).map(|_| None).collect();
        if total == 0 {
            return slots;
        }

        let queue = Arc::new(Mutex::new(
            tasks.into_iter().enumerate().collect::<VecDeque<_>>(),
        ));
        let (done_tx, mut done_rx) = mpsc::unbounded_channel();

        let workers = self.parallels.min(total);
        tracing::debug!("Starting {} workers for {} tasks", workers, total);

        let mut join_set = JoinSet::new();
        for worker_id in 0..workers {
            let worker = Worker {
                queue: Arc::clone(&queue),
                fetcher: Arc::clone(&self.fetcher),
                extractor: self.extractor,
                limiter: Arc::clone(&self.limiter),
                cancel: self.cancel.clone(),
                grace: self.grace,
                done: done_tx.clone(),
            };
            join_set.spawn(worker.run(worker_id));
        }
        // The channel closes once the last worker exits
        drop(done_tx);

        while let Some((index, outcome)) = done_rx.recv().await {
            let event = match &outcome {
                Ok(record) => CrawlEvent::Record(record.clone()),
                Err(failure) => CrawlEvent::Failure(failure.clone()),
            };
            sink.emit(event).await;
            slots[index] = Some(outcome);
        }

        while let Some(joined) = join_set.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Crawl worker failed: {}", e);
            }
        }

        slots
    }
}

impl Worker {
    async fn run(self, worker_id: usize) {
        loop {
            if self.cancel.is_cancelled() {
                tracing::trace!("Worker {} stopping: run cancelled", worker_id);
                break;
            }

            let next = {
                let mut queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
                queue.pop_front()
            };
            let Some((index, task)) = next else {
                break;
            };

            let outcome = self.process(&task).await;
            if self.done.send((index, outcome)).is_err() {
                break;
            }
        }
    }

    /// Rate limit, fetch and extract one task
    async fn process(&self, task: &CrawlTask) -> TaskOutcome {
        let fail = |reason: CrawlError| {
            tracing::warn!("Failed to scrape {}: {}", task.url, reason);
            FailedUrl {
                url: task.url.to_string(),
                depth: task.depth,
                reason,
            }
        };

        let domain = extract_domain(&task.url).map_err(|e| fail(e.into()))?;

        self.limiter
            .acquire(&domain, &self.cancel)
            .await
            .map_err(fail)?;

        tracing::debug!("Fetching {} (depth {})", task.url, task.depth);
        let fetched = tokio::select! {
            biased;
            fetched = self.fetcher.fetch(&task.url) => fetched,
            _ = grace_expired(&self.cancel, self.grace) => Err(CrawlError::Cancelled),
        };
        let content = fetched.map_err(fail)?;

        let record = self
            .extractor
            .extract(&content, &task.url, task.depth)
            .map_err(fail)?;

        tracing::debug!(
            "Scraped {} ({} chars, {} links)",
            record.source_url,
            record.data.chars().count(),
            record.links.len()
        );
        Ok(record)
    }
}

/// Resolves once the run has been cancelled for longer than `grace`
async fn grace_expired(cancel: &CancellationToken, grace: Duration) {
    cancel.cancelled().await;
    tokio::time::sleep(grace).await;
}
