//! Async delivery of crawl results
//!
//! In async mode a run pushes every [`CrawlEvent`] into a bounded channel as
//! soon as it is known. The consumer reads them through [`CrawlStream`],
//! which ends exactly once, after the run has reached its terminal phase.

use crate::crawler::result::{CrawlEvent, CrawlResult};
use crate::TrawlerError;
use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tokio_util::sync::{CancellationToken, DropGuard};

/// Capacity of the event channel between a run and its consumer
pub(crate) const EVENT_BUFFER: usize = 64;

/// Producer side of a run's event channel
///
/// Synchronous runs use a sink without a channel, which discards events.
#[derive(Debug, Clone)]
pub(crate) struct EventSink {
    tx: Option<mpsc::Sender<CrawlEvent>>,
    cancel: CancellationToken,
}

impl EventSink {
    pub(crate) fn discard(cancel: CancellationToken) -> Self {
        Self { tx: None, cancel }
    }

    pub(crate) fn channel(tx: mpsc::Sender<CrawlEvent>, cancel: CancellationToken) -> Self {
        Self {
            tx: Some(tx),
            cancel,
        }
    }

    /// Delivers an event to the consumer
    ///
    /// A dropped consumer cancels the run. Once the run is cancelled, events
    /// that do not fit in the channel are dropped rather than waited on; the
    /// final [`CrawlResult`] still contains them.
    pub(crate) async fn emit(&self, event: CrawlEvent) {
        let Some(tx) = &self.tx else {
            return;
        };

        tokio::select! {
            biased;
            sent = tx.send(event) => {
                if sent.is_err() && !self.cancel.is_cancelled() {
                    tracing::info!("Result stream dropped by consumer, cancelling run");
                    self.cancel.cancel();
                }
            }
            _ = self.cancel.cancelled() => {
                tracing::debug!("Result stream full after cancellation, event dropped");
            }
        }
    }
}

/// Finite, non-restartable stream of a run's events
///
/// Dropping the stream before it ends cancels the run.
#[derive(Debug)]
pub struct CrawlStream {
    events: ReceiverStream<CrawlEvent>,
    handle: JoinHandle<CrawlResult>,
    cancel: CancellationToken,
    guard: DropGuard,
}

impl CrawlStream {
    pub(crate) fn new(
        rx: mpsc::Receiver<CrawlEvent>,
        handle: JoinHandle<CrawlResult>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            events: ReceiverStream::new(rx),
            handle,
            guard: cancel.clone().drop_guard(),
            cancel,
        }
    }

    /// Signals the run to stop; the stream still ends normally afterwards
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token that cancels the underlying run
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Drains any remaining events and returns the aggregated result
    ///
    /// The result is in discovery order, regardless of the order in which
    /// events were streamed.
    pub async fn finish(self) -> Result<CrawlResult, TrawlerError> {
        let CrawlStream {
            mut events,
            handle,
            guard,
            ..
        } = self;
        let _token = guard.disarm();

        while events.next().await.is_some() {}

        Ok(handle.await?)
    }
}

impl Stream for CrawlStream {
    type Item = CrawlEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.events).poll_next(cx)
    }
}

/// Result of [`Scraper::start`](crate::crawler::Scraper::start)
#[derive(Debug)]
pub enum CrawlOutput {
    /// Synchronous mode: the run has finished
    Complete(CrawlResult),
    /// Async mode: results arrive on the stream while the run proceeds
    Streaming(CrawlStream),
}

impl CrawlOutput {
    /// Waits for the run to end and returns the aggregated result
    pub async fn into_result(self) -> Result<CrawlResult, TrawlerError> {
        match self {
            CrawlOutput::Complete(result) => Ok(result),
            CrawlOutput::Streaming(stream) => stream.finish().await,
        }
    }
}
