//! Crawler coordinator - main crawl orchestration logic
//!
//! This module drives a run through its phases:
//! - Seeding: normalizing, filtering and admitting the seed URLs
//! - Running: one breadth-first level at a time, through the [`Scheduler`]
//! - Folding each finished level into the result in discovery order and
//!   admitting the links it found as the next level
//! - Stopping when the depth limit is reached, the frontier runs dry, or the
//!   run is cancelled
//!
//! Each run owns its visited set and rate limiter; nothing is shared between
//! runs.

use crate::config::{validate_fetcher_config, validate_settings, FetcherConfig, Settings};
use crate::crawler::extractor::Extractor;
use crate::crawler::fetcher::{Fetcher, HttpFetcher};
use crate::crawler::rate_limiter::DomainRateLimiter;
use crate::crawler::result::{CrawlEvent, CrawlResult, FailedUrl, SkippedUrl};
use crate::crawler::scheduler::{CrawlTask, Scheduler, TaskOutcome};
use crate::crawler::stream::{CrawlOutput, CrawlStream, EventSink, EVENT_BUFFER};
use crate::state::{RunPhase, VisitedSet};
use crate::url::{filter_candidate, Candidate};
use crate::{ConfigError, CrawlError, TrawlerError};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// How long in-flight fetches may continue after cancellation
pub const DEFAULT_CANCEL_GRACE: Duration = Duration::from_secs(5);

/// Entry point for crawl runs
///
/// A `Scraper` holds only immutable configuration and the fetcher; every call
/// to a run method starts an independent run with fresh state.
#[derive(Clone)]
pub struct Scraper {
    settings: Arc<Settings>,
    fetcher: Arc<dyn Fetcher>,
    cancel_grace: Duration,
}

impl Scraper {
    /// Creates a scraper that fetches over HTTP
    ///
    /// # Returns
    ///
    /// * `Ok(Scraper)` - Settings valid and HTTP client built
    /// * `Err(TrawlerError)` - Invalid configuration or client construction failure
    pub fn new(settings: Settings, fetcher_config: &FetcherConfig) -> Result<Self, TrawlerError> {
        validate_fetcher_config(fetcher_config)?;
        let fetcher = HttpFetcher::new(fetcher_config)?;
        Self::with_fetcher(settings, Arc::new(fetcher)).map_err(Into::into)
    }

    /// Creates a scraper around any [`Fetcher`]
    pub fn with_fetcher(settings: Settings, fetcher: Arc<dyn Fetcher>) -> Result<Self, ConfigError> {
        validate_settings(&settings)?;
        Ok(Self {
            settings: Arc::new(settings),
            fetcher,
            cancel_grace: DEFAULT_CANCEL_GRACE,
        })
    }

    /// Sets how long in-flight fetches may run on after cancellation
    pub fn with_cancel_grace(mut self, grace: Duration) -> Self {
        self.cancel_grace = grace;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Runs to completion and returns the aggregated result
    ///
    /// # Example
    ///
    /// ```no_run
    /// use trawler::config::{FetcherConfig, SettingsBuilder};
    /// use trawler::Scraper;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let settings = SettingsBuilder::new().handle_links(true).build()?;
    /// let scraper = Scraper::new(settings, &FetcherConfig::default())?;
    /// let result = scraper.run(["https://example.com/"]).await;
    /// println!("{} pages scraped", result.records.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run<I, S>(&self, seeds: I) -> CrawlResult
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.run_with_cancellation(seeds, CancellationToken::new())
            .await
    }

    /// Like [`Scraper::run`], stopping early when `cancel` fires
    pub async fn run_with_cancellation<I, S>(&self, seeds: I, cancel: CancellationToken) -> CrawlResult
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let sink = EventSink::discard(cancel.clone());
        self.new_run(cancel, sink).execute(collect_seeds(seeds)).await
    }

    /// Starts a run in the background and streams its events
    pub fn stream<I, S>(&self, seeds: I) -> CrawlStream
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stream_with_cancellation(seeds, CancellationToken::new())
    }

    /// Like [`Scraper::stream`], stopping early when `cancel` fires
    pub fn stream_with_cancellation<I, S>(&self, seeds: I, cancel: CancellationToken) -> CrawlStream
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let sink = EventSink::channel(tx, cancel.clone());
        let run = self.new_run(cancel.clone(), sink);
        let seeds = collect_seeds(seeds);

        // The sender lives inside the run, so the stream ends when the run does
        let handle = tokio::spawn(run.execute(seeds));
        CrawlStream::new(rx, handle, cancel)
    }

    /// Starts a run in the delivery mode selected by `Settings::async_mode`
    pub async fn start<I, S>(&self, seeds: I, cancel: CancellationToken) -> CrawlOutput
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.settings.async_mode {
            CrawlOutput::Streaming(self.stream_with_cancellation(seeds, cancel))
        } else {
            CrawlOutput::Complete(self.run_with_cancellation(seeds, cancel).await)
        }
    }

    fn new_run(&self, cancel: CancellationToken, sink: EventSink) -> CrawlRun {
        let settings = Arc::clone(&self.settings);
        let limiter = Arc::new(DomainRateLimiter::new(Duration::from_millis(
            settings.delay_millis,
        )));
        let extractor = Extractor::new(settings.handle_links, settings.max_scraped_data_length);
        let scheduler = Scheduler::new(
            settings.parallels,
            Arc::clone(&self.fetcher),
            extractor,
            limiter,
            cancel.clone(),
            self.cancel_grace,
        );

        CrawlRun {
            settings,
            scheduler,
            visited: VisitedSet::new(),
            skipped: HashSet::new(),
            phase: RunPhase::Idle,
            cancel,
            sink,
            result: CrawlResult::new(),
        }
    }
}

fn collect_seeds<I, S>(seeds: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    seeds.into_iter().map(Into::into).collect()
}

/// State of one run, discarded when it reaches `Done`
struct CrawlRun {
    settings: Arc<Settings>,
    scheduler: Scheduler,
    visited: VisitedSet,
    skipped: HashSet<String>,
    phase: RunPhase,
    cancel: CancellationToken,
    sink: EventSink,
    result: CrawlResult,
}

impl CrawlRun {
    async fn execute(mut self, seeds: Vec<String>) -> CrawlResult {
        let started = tokio::time::Instant::now();
        tracing::info!(
            "Starting crawl: {} seeds, max depth {}, {} parallel, {}ms delay",
            seeds.len(),
            self.settings.max_depth,
            self.settings.parallels,
            self.settings.delay_millis
        );

        if !self.advance(RunPhase::Seeding) {
            return self.result;
        }
        let mut frontier = self.seed(seeds).await;
        let mut depth = 0;

        while !frontier.is_empty() && !self.cancel.is_cancelled() {
            if !self.advance(RunPhase::Running { depth }) {
                break;
            }
            tracing::info!("Depth {}: {} URLs to fetch", depth, frontier.len());

            let outcomes = self.scheduler.run_level(frontier, &self.sink).await;
            frontier = self.fold_level(outcomes, depth).await;

            if depth >= self.settings.max_depth {
                break;
            }
            depth += 1;
        }

        if self.cancel.is_cancelled() {
            tracing::info!("Crawl cancelled");
            self.result.cancelled = true;
            self.sink.emit(CrawlEvent::Cancelled).await;
        } else {
            self.advance(RunPhase::Draining);
        }
        self.advance(RunPhase::Done);

        tracing::info!(
            "Crawl completed: {} scraped, {} failed, {} skipped in {:?}",
            self.result.records.len(),
            self.result.failures.len(),
            self.result.skipped.len(),
            started.elapsed()
        );

        // Dropping `self` here closes the event channel exactly once
        self.result
    }

    /// Moves to `next`; returns false, leaving the phase unchanged, when the
    /// transition is not allowed
    fn advance(&mut self, next: RunPhase) -> bool {
        match self.phase.transition(next) {
            Ok(()) => {
                tracing::trace!("Run phase: {}", self.phase);
                true
            }
            Err(e) => {
                tracing::error!("Refusing phase change: {}", e);
                false
            }
        }
    }

    /// Validates and admits the seed URLs as the depth-0 frontier
    async fn seed(&mut self, seeds: Vec<String>) -> Vec<CrawlTask> {
        let mut frontier = Vec::new();

        for raw in seeds {
            match filter_candidate(&raw, &self.settings.blacklist) {
                Ok(Candidate::Accepted(url)) => {
                    if self.visited.try_mark_visited(url.as_str()) {
                        frontier.push(CrawlTask { url, depth: 0 });
                    } else {
                        tracing::debug!("Duplicate seed ignored: {}", url);
                    }
                }
                Ok(Candidate::Blacklisted(url)) => self.skip(url.to_string(), 0).await,
                Err(e) => {
                    tracing::warn!("Invalid seed URL {}: {}", raw, e);
                    self.record_failure(FailedUrl {
                        url: raw,
                        depth: 0,
                        reason: CrawlError::from(e),
                    })
                    .await;
                }
            }
        }

        frontier
    }

    /// Adds a finished level to the result and builds the next frontier
    ///
    /// Outcomes are walked in task order and links in document order, so both
    /// the result and the next level follow discovery order.
    async fn fold_level(
        &mut self,
        outcomes: Vec<Option<TaskOutcome>>,
        depth: u32,
    ) -> Vec<CrawlTask> {
        let follow_links = self.settings.handle_links
            && depth < self.settings.max_depth
            && !self.cancel.is_cancelled();
        let mut next = Vec::new();

        for outcome in outcomes.into_iter().flatten() {
            match outcome {
                Ok(record) => {
                    if follow_links {
                        for link in &record.links {
                            self.admit_link(link, depth + 1, &mut next).await;
                        }
                    }
                    self.result.records.push(record);
                }
                Err(failure) => self.result.failures.push(failure),
            }
        }

        tracing::debug!(
            "Depth {} finished, {} new URLs discovered",
            depth,
            next.len()
        );
        next
    }

    async fn admit_link(&mut self, link: &str, depth: u32, next: &mut Vec<CrawlTask>) {
        match filter_candidate(link, &self.settings.blacklist) {
            Ok(Candidate::Accepted(url)) => {
                if self.visited.try_mark_visited(url.as_str()) {
                    next.push(CrawlTask { url, depth });
                } else {
                    tracing::trace!("Already visited: {}", url);
                }
            }
            Ok(Candidate::Blacklisted(url)) => self.skip(url.to_string(), depth).await,
            // Links were already resolved by the extractor; anything else is dropped
            Err(e) => tracing::trace!("Dropping link {}: {}", link, e),
        }
    }

    /// Records a blacklisted URL once per run
    async fn skip(&mut self, url: String, depth: u32) {
        if !self.skipped.insert(url.clone()) {
            return;
        }
        tracing::debug!("Blacklisted, skipping: {}", url);
        let skipped = SkippedUrl { url, depth };
        self.result.skipped.push(skipped.clone());
        self.sink.emit(CrawlEvent::Skipped(skipped)).await;
    }

    async fn record_failure(&mut self, failure: FailedUrl) {
        self.result.failures.push(failure.clone());
        self.sink.emit(CrawlEvent::Failure(failure)).await;
    }
}
