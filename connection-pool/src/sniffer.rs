//! Topology refresh ("sniffing") for a [`SniffingPool`].
//!
//! A [`Sniffer`] asks the cluster for its current members through a
//! [`Fetch`] implementation and installs the answer with
//! [`SniffingPool::replace_endpoints`]. It runs once at client startup, then
//! periodically in the background, and on demand after severe failures.
use std::{sync::Arc, time::Duration};

use thiserror::Error;
use tokio::{
    task::JoinHandle,
    time::{self, sleep, Instant},
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::pool::{pool_error::PoolError, sniffing_pool::SniffingPool, ConnectionPool};

/// Nodes fetch implementation.
pub mod nodes_fetch;
#[cfg(test)]
pub(crate) mod test_utils;

pub use nodes_fetch::Fetch;

const SNIFF_PERIOD: Duration = Duration::from_secs(5 * 60);
const SNIFF_RETRY_INTERVAL: Duration = Duration::from_millis(250);

const SNIFFER: &str = "Sniffer";

/// An error that occurred while refreshing the topology.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnifferError {
    /// Fetching the topology from one endpoint failed.
    #[error("An error when fetching endpoints: {0}")]
    NodesFetchError(String),
    /// Every endpoint asked during a sniff pass failed.
    #[error("None of the {0} endpoints asked returned a topology")]
    NoEndpointResponded(usize),
    /// The topology came back empty. The pool is left untouched, as an empty
    /// pool could never be refreshed again.
    #[error("The fetched topology has no endpoints")]
    EmptyTopology,
    /// The pool could not provide an endpoint to ask.
    #[error(transparent)]
    Pool(#[from] PoolError),
}

/// Keeps the endpoint set of a [`SniffingPool`] in line with the cluster topology.
#[derive(Debug)]
pub struct Sniffer {
    /// The pool to keep up to date.
    pool: Arc<SniffingPool>,
    /// Asks one endpoint for the whole topology.
    fetcher: Arc<dyn Fetch>,
    /// Periodicity of background sniffing.
    period: Duration,
    /// Interval for retrying a failed background sniff.
    retry_interval: Duration,
}

/// A builder for the [`Sniffer`].
#[derive(Debug)]
pub struct SnifferBuilder {
    pool: Arc<SniffingPool>,
    fetcher: Arc<dyn Fetch>,
    period: Duration,
    retry_interval: Duration,
}

impl SnifferBuilder {
    /// Creates a new instance of the builder.
    pub fn new(pool: Arc<SniffingPool>, fetcher: Arc<dyn Fetch>) -> Self {
        Self {
            pool,
            fetcher,
            period: SNIFF_PERIOD,
            retry_interval: SNIFF_RETRY_INTERVAL,
        }
    }

    /// Sets the background sniffing periodicity.
    pub fn with_sniff_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Sets the interval between retries of a failed background sniff.
    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    /// Builds an instance of the `Sniffer`.
    pub fn build(self) -> Sniffer {
        Sniffer {
            pool: self.pool,
            fetcher: self.fetcher,
            period: self.period,
            retry_interval: self.retry_interval,
        }
    }
}

impl Sniffer {
    /// Returns the pool this sniffer updates.
    pub fn pool(&self) -> &Arc<SniffingPool> {
        &self.pool
    }

    /// Runs one sniff pass and returns the size of the installed endpoint set.
    ///
    /// Endpoints are asked in the pool's round-robin order, at most once per
    /// endpoint. An endpoint that fails to answer is reported dead with the
    /// pool's default timeouts before the next one is tried.
    pub async fn sniff(&self, from_startup: bool) -> Result<usize, SnifferError> {
        let attempts = self.pool.len();
        let mut seed = None;
        for _ in 0..attempts {
            let selection = self.pool.next(seed)?;
            seed = Some(selection.next_seed);
            let endpoint = selection.endpoint;
            match self.fetcher.fetch(&endpoint).await {
                Ok(endpoints) if endpoints.is_empty() => {
                    error!("{SNIFFER}: {endpoint} returned an empty list of endpoints");
                    return Err(SnifferError::EmptyTopology);
                }
                Ok(endpoints) => {
                    let count = endpoints.len();
                    self.pool.replace_endpoints(endpoints, from_startup);
                    info!("{SNIFFER}: installed {count} endpoints fetched from {endpoint}");
                    return Ok(count);
                }
                Err(err) => {
                    error!("{SNIFFER}: failed to fetch endpoints from {endpoint}: {err}");
                    self.pool.report_failure(&endpoint, None, None);
                }
            }
        }
        Err(SnifferError::NoEndpointResponded(attempts))
    }

    /// Runs the discovery pass a client needs before its first request.
    pub async fn startup(&self) -> Result<usize, SnifferError> {
        self.sniff(true).await
    }

    /// Refreshes the topology right away, after failures severe enough to
    /// suggest the cluster membership changed.
    pub async fn sniff_on_failure(&self) -> Result<usize, SnifferError> {
        info!("{SNIFFER}: sniffing after a failure");
        self.sniff(false).await
    }

    /// Sniffs every period until `token` is cancelled.
    ///
    /// A pass that fails because endpoints did not answer is retried after the
    /// retry interval until it succeeds. A pool with nothing to ask, or a
    /// cluster reporting an empty topology, waits for the next period instead.
    pub async fn run(self, token: CancellationToken) {
        let mut interval = time::interval_at(Instant::now() + self.period, self.period);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    loop {
                        match self.sniff(false).await {
                            Ok(_) => break,
                            Err(err @ (SnifferError::Pool(_)
                                | SnifferError::NoEndpointResponded(0)
                                | SnifferError::EmptyTopology)) => {
                                error!("{SNIFFER}: cannot sniff ({err}), waiting for the next period");
                                break;
                            }
                            Err(err) => {
                                warn!("{SNIFFER}: sniffing failed ({err}), retrying in {:?}", self.retry_interval);
                            }
                        }
                        tokio::select! {
                            _ = sleep(self.retry_interval) => {}
                            _ = token.cancelled() => {
                                warn!("{SNIFFER}: was gracefully cancelled");
                                return;
                            }
                        }
                    }
                }
                _ = token.cancelled() => {
                    warn!("{SNIFFER}: was gracefully cancelled");
                    break;
                }
            }
        }
    }

    /// Spawns [`run`](Self::run) on the current tokio runtime.
    pub fn spawn(self, token: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(token))
    }
}
