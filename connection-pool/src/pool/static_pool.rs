//! A [`ConnectionPool`] over a fixed set of endpoints.
use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
    time::{Duration, Instant},
};

use parking_lot::Mutex;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::pool::{
    clock::Clock,
    endpoint::Endpoint,
    endpoint_state::{EndpointState, EndpointStatus},
    pool_config::PoolConfig,
    pool_error::PoolError,
    ConnectionPool, PoolStats, Selection,
};

const STATIC_POOL: &str = "StaticPool";

/// A pool whose endpoint set never changes after construction.
///
/// Endpoints are scanned in their stored order, starting from a seed or from
/// an internal round-robin cursor. Health records are guarded one by one, so
/// concurrent reports on different endpoints never contend.
#[derive(Debug)]
pub struct StaticPool {
    /// Scan order of the endpoints.
    endpoints: Vec<Endpoint>,
    /// One health record per entry of `endpoints`.
    states: HashMap<Endpoint, Mutex<EndpointState>>,
    /// Start offset for unseeded selection. Wraps around on overflow.
    cursor: AtomicUsize,
    config: PoolConfig,
}

impl StaticPool {
    /// Creates a pool over `endpoints`, every one of them alive.
    ///
    /// Duplicates are dropped, keeping the position of the first occurrence.
    pub fn new(endpoints: Vec<Endpoint>, config: PoolConfig) -> Self {
        let mut states = HashMap::with_capacity(endpoints.len());
        let mut unique = Vec::with_capacity(endpoints.len());
        for endpoint in endpoints {
            if states.contains_key(&endpoint) {
                debug!("{STATIC_POOL}: dropping duplicate endpoint {endpoint}");
                continue;
            }
            states.insert(endpoint.clone(), Mutex::new(EndpointState::new()));
            unique.push(endpoint);
        }
        let cursor = if config.randomize_on_startup && !unique.is_empty() {
            rand::thread_rng().gen_range(0..unique.len())
        } else {
            0
        };
        Self {
            endpoints: unique,
            states,
            cursor: AtomicUsize::new(cursor),
            config,
        }
    }

    /// Returns the configuration the pool was built with.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Returns the endpoints in scan order.
    pub fn endpoints(&self) -> Vec<Endpoint> {
        self.endpoints.clone()
    }

    /// Returns a copy of the health record of `endpoint`, if it is part of the pool.
    pub fn endpoint_state(&self, endpoint: &Endpoint) -> Option<EndpointState> {
        self.states.get(endpoint).map(|state| state.lock().clone())
    }

    /// Returns every endpoint paired with a copy of its health record, in scan order.
    pub fn snapshot(&self) -> Vec<(Endpoint, EndpointState)> {
        self.endpoints
            .iter()
            .filter_map(|endpoint| {
                self.endpoint_state(endpoint)
                    .map(|state| (endpoint.clone(), state))
            })
            .collect()
    }

    /// Number of endpoints in the pool.
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Whether the pool has no endpoints.
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Whether the scan order and the health records describe the same endpoints.
    pub(crate) fn is_consistent(&self) -> bool {
        self.endpoints.len() == self.states.len()
            && self
                .endpoints
                .iter()
                .all(|endpoint| self.states.contains_key(endpoint))
    }

    fn selection(&self, idx: usize, should_ping: bool) -> Selection {
        Selection {
            endpoint: self.endpoints[idx].clone(),
            next_seed: idx + 1,
            should_ping,
        }
    }
}

impl ConnectionPool for StaticPool {
    fn next(&self, seed: Option<usize>) -> Result<Selection, PoolError> {
        let count = self.endpoints.len();
        if count == 0 {
            return Err(PoolError::EmptyPool);
        }
        let start = seed.unwrap_or_else(|| self.cursor.fetch_add(1, Ordering::Relaxed)) % count;
        let now = self.config.clock.now();
        // Dead endpoint with the oldest `dead_since`, used when nothing is selectable.
        let mut fallback: Option<(usize, Instant)> = None;
        for offset in 0..count {
            let idx = (start + offset) % count;
            let Some(state) = self.states.get(&self.endpoints[idx]) else {
                continue;
            };
            let state = state.lock();
            match state.status(now) {
                EndpointStatus::Alive => return Ok(self.selection(idx, false)),
                EndpointStatus::Resurrecting => {
                    debug!(
                        "{STATIC_POOL}: endpoint {} is resurrecting after {} failed attempts",
                        self.endpoints[idx],
                        state.failed_attempts()
                    );
                    return Ok(self.selection(idx, true));
                }
                EndpointStatus::Dead => {
                    let dead_since = state.dead_since().unwrap_or(now);
                    if fallback.map_or(true, |(_, oldest)| dead_since < oldest) {
                        fallback = Some((idx, dead_since));
                    }
                }
            }
        }
        let (idx, _) = fallback.ok_or(PoolError::EmptyPool)?;
        debug!(
            "{STATIC_POOL}: all {count} endpoints are dead, falling back to {}",
            self.endpoints[idx]
        );
        Ok(self.selection(idx, true))
    }

    fn report_success(&self, endpoint: &Endpoint) {
        let Some(state) = self.states.get(endpoint) else {
            debug!("{STATIC_POOL}: ignoring success report for unknown endpoint {endpoint}");
            return;
        };
        let mut state = state.lock();
        if !state.is_alive() {
            info!(
                "{STATIC_POOL}: endpoint {endpoint} is alive again after {} failed attempts",
                state.failed_attempts()
            );
        }
        state.mark_alive();
    }

    fn report_failure(
        &self,
        endpoint: &Endpoint,
        dead_timeout: Option<Duration>,
        max_dead_timeout: Option<Duration>,
    ) {
        let Some(state) = self.states.get(endpoint) else {
            debug!("{STATIC_POOL}: ignoring failure report for unknown endpoint {endpoint}");
            return;
        };
        let dead_timeout = dead_timeout.unwrap_or(self.config.dead_timeout);
        let max_dead_timeout = max_dead_timeout.unwrap_or(self.config.max_dead_timeout);
        let now = self.config.clock.now();
        let mut state = state.lock();
        let backoff = state.mark_dead(now, dead_timeout, max_dead_timeout);
        warn!(
            "{STATIC_POOL}: endpoint {endpoint} marked dead for {backoff:?} after {} failed attempts",
            state.failed_attempts()
        );
    }

    fn accepts_updates(&self) -> bool {
        false
    }

    fn stats(&self) -> PoolStats {
        let now = self.config.clock.now();
        let alive = self
            .states
            .values()
            .filter(|state| state.lock().is_selectable(now))
            .count();
        PoolStats::new(self.endpoints.len(), alive)
    }
}
