//! Per-domain rate limiter
//!
//! Each domain gets its own async mutex around a [`DomainState`]. An
//! acquisition holds that mutex while it waits out the delay, so callers for
//! the same domain queue up behind each other while callers for other
//! domains proceed untouched.

use crate::state::DomainState;
use crate::CrawlError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Enforces a minimum delay between consecutive requests to the same domain
#[derive(Debug)]
pub struct DomainRateLimiter {
    delay: Duration,
    domains: Mutex<HashMap<String, Arc<AsyncMutex<DomainState>>>>,
}

impl DomainRateLimiter {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            domains: Mutex::new(HashMap::new()),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Waits until a request to `domain` is allowed, then records it
    ///
    /// The wait is abandoned as soon as `cancel` fires; in that case nothing
    /// is recorded and `CrawlError::Cancelled` is returned.
    pub async fn acquire(&self, domain: &str, cancel: &CancellationToken) -> Result<(), CrawlError> {
        let slot = self.slot(domain);

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(CrawlError::Cancelled),
            _ = wait_turn(&slot, self.delay) => Ok(()),
        }
    }

    /// Returns a copy of the recorded state for `domain`
    pub async fn domain_state(&self, domain: &str) -> Option<DomainState> {
        let slot = {
            let domains = self.domains.lock().unwrap_or_else(|e| e.into_inner());
            domains.get(domain).cloned()
        }?;
        let state = slot.lock().await;
        Some(state.clone())
    }

    fn slot(&self, domain: &str) -> Arc<AsyncMutex<DomainState>> {
        let mut domains = self.domains.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(
            domains
                .entry(domain.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(DomainState::new()))),
        )
    }
}

async fn wait_turn(slot: &AsyncMutex<DomainState>, delay: Duration) {
    let mut state = slot.lock().await;

    if let Some(wait) = state.time_until_next_request(delay, Instant::now()) {
        tracing::trace!("Rate limited, waiting {:?}", wait);
        tokio::time::sleep(wait).await;
    }

    // History is kept even with a zero delay
    state.record_request(Instant::now());
}
