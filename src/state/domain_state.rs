use std::time::Duration;
use tokio::time::Instant;

/// Tracks the request history of a domain during one run
///
/// Times are `tokio::time::Instant`, so tests running with a paused clock
/// observe exact virtual delays.
#[derive(Debug, Clone, Default)]
pub struct DomainState {
    /// Number of requests granted to this domain in the current run
    pub request_count: u32,

    /// When the last request to this domain was granted
    pub last_request_time: Option<Instant>,
}

impl DomainState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks if a request can be made to this domain at `now`
    pub fn can_request(&self, delay: Duration, now: Instant) -> bool {
        self.time_until_next_request(delay, now).is_none()
    }

    /// Records that a request was granted at `now`
    pub fn record_request(&mut self, now: Instant) {
        self.request_count += 1;
        self.last_request_time = Some(now);
    }

    /// Calculates the time until the next request can be made
    ///
    /// Returns None if a request can be made now, or the duration to wait otherwise.
    pub fn time_until_next_request(&self, delay: Duration, now: Instant) -> Option<Duration> {
        let last = self.last_request_time?;
        let elapsed = now.saturating_duration_since(last);
        if elapsed < delay {
            Some(delay - elapsed)
        } else {
            None
        }
    }

    /// Earliest instant at which the next request may be granted
    pub fn next_allowed_at(&self, delay: Duration) -> Option<Instant> {
        self.last_request_time.map(|last| last + delay)
    }
}
