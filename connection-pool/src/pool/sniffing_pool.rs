//! A [`ConnectionPool`] whose endpoint set can be replaced at runtime.
use std::{
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};

use parking_lot::RwLock;
use tracing::info;

use crate::pool::{
    endpoint::Endpoint, endpoint_state::EndpointState, pool_config::PoolConfig,
    pool_error::PoolError, static_pool::StaticPool, ConnectionPool, PoolStats, Selection,
};

const SNIFFING_POOL: &str = "SniffingPool";

/// A pool that layers topology replacement over [`StaticPool`].
///
/// Selection and health reports take the lock shared and only touch single
/// health records. [`replace_endpoints`](Self::replace_endpoints) builds the
/// new set aside and swaps it in under the exclusive lock, so a reader sees
/// either the old or the new set, never a mix. The lock is fair: a pending
/// replacement is not starved by a steady stream of readers.
#[derive(Debug)]
pub struct SniffingPool {
    inner: RwLock<StaticPool>,
    config: PoolConfig,
    seen_startup: AtomicBool,
}

impl SniffingPool {
    /// Creates a pool over `endpoints`, every one of them alive.
    pub fn new(endpoints: Vec<Endpoint>, config: PoolConfig) -> Self {
        Self {
            inner: RwLock::new(StaticPool::new(endpoints, config.clone())),
            config,
            seen_startup: AtomicBool::new(false),
        }
    }

    /// Atomically replaces the whole endpoint set.
    ///
    /// Every endpoint of the new set starts alive; all health history is
    /// discarded, including that of endpoints present in both sets.
    /// `from_startup` marks the replacement as the result of the discovery
    /// pass a client runs before its first request.
    pub fn replace_endpoints(&self, endpoints: Vec<Endpoint>, from_startup: bool) {
        let replacement = StaticPool::new(endpoints, self.config.clone());
        let new_len = replacement.len();
        // The previous set is dropped after the exclusive lock is released.
        let previous = std::mem::replace(&mut *self.inner.write(), replacement);
        let old_len = previous.len();
        if from_startup {
            self.seen_startup.store(true, Ordering::Release);
        }
        info!(
            "{SNIFFING_POOL}: replaced {old_len} endpoints with {new_len} endpoints (startup: {from_startup})"
        );
    }

    /// Whether a startup discovery pass has installed an endpoint set.
    pub fn seen_startup(&self) -> bool {
        self.seen_startup.load(Ordering::Acquire)
    }

    /// Returns the configuration the pool was built with.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Returns the endpoints of the active set in scan order.
    pub fn endpoints(&self) -> Vec<Endpoint> {
        self.inner.read().endpoints()
    }

    /// Returns a copy of the health record of `endpoint`, if it is part of the active set.
    pub fn endpoint_state(&self, endpoint: &Endpoint) -> Option<EndpointState> {
        self.inner.read().endpoint_state(endpoint)
    }

    /// Returns the active set paired with copies of its health records, taken
    /// under a single shared acquisition.
    pub fn snapshot(&self) -> Vec<(Endpoint, EndpointState)> {
        self.inner.read().snapshot()
    }

    /// Number of endpoints in the active set.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Whether the active set is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub(crate) fn is_consistent(&self) -> bool {
        self.inner.read().is_consistent()
    }
}

impl ConnectionPool for SniffingPool {
    fn next(&self, seed: Option<usize>) -> Result<Selection, PoolError> {
        self.inner.read().next(seed)
    }

    fn report_success(&self, endpoint: &Endpoint) {
        self.inner.read().report_success(endpoint)
    }

    fn report_failure(
        &self,
        endpoint: &Endpoint,
        dead_timeout: Option<Duration>,
        max_dead_timeout: Option<Duration>,
    ) {
        self.inner
            .read()
            .report_failure(endpoint, dead_timeout, max_dead_timeout)
    }

    fn accepts_updates(&self) -> bool {
        true
    }

    fn update_endpoints(
        &self,
        endpoints: Vec<Endpoint>,
        from_startup: bool,
    ) -> Result<(), PoolError> {
        self.replace_endpoints(endpoints, from_startup);
        Ok(())
    }

    fn stats(&self) -> PoolStats {
        self.inner.read().stats()
    }
}
