//! A [`ConnectionPool`] decides which endpoint serves the next request and
//! tracks endpoint health.
use std::time::Duration;

pub mod clock;
pub mod endpoint;
pub mod endpoint_state;
pub mod pool_config;
pub mod pool_error;
pub mod sniffing_pool;
pub mod static_pool;
#[cfg(test)]
pub(crate) mod test_utils;

use endpoint::Endpoint;
use pool_error::PoolError;

/// The outcome of a single [`ConnectionPool::next`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// The endpoint the next request should be sent to.
    pub endpoint: Endpoint,
    /// Seed to pass to the following `next` call to continue the round-robin sweep.
    pub next_seed: usize,
    /// Set when the endpoint was recently dead and should be health-probed
    /// before it is trusted with the real request.
    pub should_ping: bool,
}

/// Counts of the endpoints currently held by a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    /// Total number of endpoints in the active set.
    pub total: usize,
    /// Number of endpoints that are alive, or dead with an elapsed timeout.
    pub alive: usize,
}

impl PoolStats {
    /// Creates a new `PoolStats` instance.
    pub fn new(total: usize, alive: usize) -> Self {
        Self { total, alive }
    }
}

/// The interface a request-issuing client uses to pick endpoints and report outcomes.
///
/// All methods take `&self` and are safe to call from any number of threads.
/// None of them block on I/O.
pub trait ConnectionPool: std::fmt::Debug + Send + Sync {
    /// Selects the endpoint for the next request.
    ///
    /// `seed` is the [`Selection::next_seed`] of a previous call, or `None` to
    /// start from the pool's own round-robin cursor. Alive endpoints are
    /// preferred; when every endpoint is dead the one that has been dead the
    /// longest is returned. Fails only when the pool holds no endpoints.
    fn next(&self, seed: Option<usize>) -> Result<Selection, PoolError>;

    /// Marks the endpoint alive, resetting its failure count.
    ///
    /// Endpoints that are not part of the pool are ignored.
    fn report_success(&self, endpoint: &Endpoint);

    /// Marks the endpoint dead with an exponentially growing timeout.
    ///
    /// `dead_timeout` is the base timeout of the first failure and
    /// `max_dead_timeout` caps the growth; `None` falls back to the pool
    /// configuration. Endpoints that are not part of the pool are ignored.
    fn report_failure(
        &self,
        endpoint: &Endpoint,
        dead_timeout: Option<Duration>,
        max_dead_timeout: Option<Duration>,
    );

    /// Whether the endpoint set may be replaced at runtime.
    fn accepts_updates(&self) -> bool;

    /// Replaces the whole endpoint set, discarding all health history.
    ///
    /// Pools that do not accept updates return [`PoolError::UpdatesNotSupported`].
    fn update_endpoints(
        &self,
        _endpoints: Vec<Endpoint>,
        _from_startup: bool,
    ) -> Result<(), PoolError> {
        Err(PoolError::UpdatesNotSupported)
    }

    /// Returns the total number of endpoints and how many are selectable.
    fn stats(&self) -> PoolStats;
}
