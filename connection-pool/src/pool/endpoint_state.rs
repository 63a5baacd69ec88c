//! Per-endpoint health record.
//!
//! # State transitions
//! ```text
//! Alive --failure--> Dead --dead_until elapses--> Resurrecting
//!   ^                 ^                               |
//!   |                 +-----------failure-------------+
//!   +------------------------success------------------+
//! ```
//! `Resurrecting` is not stored: it is a `Dead` record whose `dead_until` is
//! in the past. Such an endpoint is selectable again, but only as a probe.
use std::time::{Duration, Instant};

/// Where an endpoint is in its health life cycle at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointStatus {
    /// Eligible for selection.
    Alive,
    /// Skipped by selection until its dead timeout elapses.
    Dead,
    /// Dead, but the timeout has elapsed: selectable for one probing attempt.
    Resurrecting,
}

/// Mutable health record attached to exactly one endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointState {
    alive: bool,
    failed_attempts: u32,
    dead_since: Option<Instant>,
    dead_until: Option<Instant>,
}

impl Default for EndpointState {
    fn default() -> Self {
        Self::new()
    }
}

impl EndpointState {
    /// Creates a fresh, alive record.
    pub fn new() -> Self {
        Self {
            alive: true,
            failed_attempts: 0,
            dead_since: None,
            dead_until: None,
        }
    }

    /// Whether the last report on this endpoint was a success.
    ///
    /// A dead endpoint stays flagged dead after its timeout elapses, until a
    /// success is reported; see [`status`](Self::status) for the time-aware view.
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Consecutive failures since the last success.
    pub fn failed_attempts(&self) -> u32 {
        self.failed_attempts
    }

    /// When the endpoint was last marked dead.
    pub fn dead_since(&self) -> Option<Instant> {
        self.dead_since
    }

    /// The instant before which normal selection skips the endpoint.
    pub fn dead_until(&self) -> Option<Instant> {
        self.dead_until
    }

    /// Returns the status of the endpoint at `now`.
    pub fn status(&self, now: Instant) -> EndpointStatus {
        if self.alive {
            return EndpointStatus::Alive;
        }
        match self.dead_until {
            Some(until) if until > now => EndpointStatus::Dead,
            _ => EndpointStatus::Resurrecting,
        }
    }

    /// Whether normal selection may pick the endpoint at `now`.
    pub fn is_selectable(&self, now: Instant) -> bool {
        self.status(now) != EndpointStatus::Dead
    }

    /// Applies a success report.
    pub(crate) fn mark_alive(&mut self) {
        self.alive = true;
        self.failed_attempts = 0;
        self.dead_since = None;
        self.dead_until = None;
    }

    /// Applies a failure report at `now` and returns the backoff that was applied.
    pub(crate) fn mark_dead(
        &mut self,
        now: Instant,
        dead_timeout: Duration,
        max_dead_timeout: Duration,
    ) -> Duration {
        self.failed_attempts = self.failed_attempts.saturating_add(1);
        let backoff = dead_backoff(self.failed_attempts, dead_timeout, max_dead_timeout)
            .min(MAX_DEAD_WINDOW);
        self.alive = false;
        self.dead_since = Some(now);
        self.dead_until = Some(instant_after(now, backoff));
        backoff
    }
}

/// Longest dead window applied, whatever timeouts a failure report carries.
pub(crate) const MAX_DEAD_WINDOW: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Adds `window` to `now`, shrinking the window until the platform's `Instant` can hold it.
fn instant_after(now: Instant, mut window: Duration) -> Instant {
    loop {
        match now.checked_add(window) {
            Some(instant) => return instant,
            None => window /= 2,
        }
    }
}

/// Computes `min(dead_timeout * 2^(attempt - 1), max_dead_timeout)`.
pub(crate) fn dead_backoff(
    attempt: u32,
    dead_timeout: Duration,
    max_dead_timeout: Duration,
) -> Duration {
    let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
    dead_timeout.saturating_mul(factor).min(max_dead_timeout)
}
