//! Pool configuration and its builder.
use std::{sync::Arc, time::Duration};

use crate::pool::{
    clock::{Clock, SystemClock},
    endpoint::Endpoint,
    pool_error::PoolError,
    sniffing_pool::SniffingPool,
    static_pool::StaticPool,
};

/// Base dead timeout applied when a failure report does not carry one.
pub const DEFAULT_DEAD_TIMEOUT: Duration = Duration::from_secs(60);
/// Upper bound of the dead timeout applied when a failure report does not carry one.
pub const DEFAULT_MAX_DEAD_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// A configuration for a connection pool.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// See [`with_randomize_on_startup`](PoolBuilder::with_randomize_on_startup).
    pub randomize_on_startup: bool,
    /// See [`with_dead_timeout`](PoolBuilder::with_dead_timeout).
    pub dead_timeout: Duration,
    /// See [`with_max_dead_timeout`](PoolBuilder::with_max_dead_timeout).
    pub max_dead_timeout: Duration,
    /// See [`with_clock`](PoolBuilder::with_clock).
    pub clock: Arc<dyn Clock>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            randomize_on_startup: true,
            dead_timeout: DEFAULT_DEAD_TIMEOUT,
            max_dead_timeout: DEFAULT_MAX_DEAD_TIMEOUT,
            clock: Arc::new(SystemClock),
        }
    }
}

/// A builder for [`StaticPool`] and [`SniffingPool`].
#[derive(Debug, Default)]
pub struct PoolBuilder {
    config: PoolConfig,
}

impl PoolBuilder {
    /// Creates a builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder from an existing configuration.
    pub fn from_config(config: PoolConfig) -> Self {
        Self { config }
    }

    /// Start unseeded selection at a random offset instead of the first endpoint.
    /// Enabled by default, so that many clients built from the same list do not
    /// all hit the same node first.
    pub fn with_randomize_on_startup(self, randomize: bool) -> Self {
        PoolBuilder {
            config: PoolConfig {
                randomize_on_startup: randomize,
                ..self.config
            },
        }
    }

    /// Sets the base dead timeout used by failure reports without one.
    pub fn with_dead_timeout(self, dead_timeout: Duration) -> Self {
        PoolBuilder {
            config: PoolConfig {
                dead_timeout,
                ..self.config
            },
        }
    }

    /// Sets the dead timeout cap used by failure reports without one.
    pub fn with_max_dead_timeout(self, max_dead_timeout: Duration) -> Self {
        PoolBuilder {
            config: PoolConfig {
                max_dead_timeout,
                ..self.config
            },
        }
    }

    /// Replaces the time source.
    pub fn with_clock<C>(self, clock: C) -> Self
    where
        C: 'static + Clock,
    {
        self.with_arc_clock(Arc::new(clock))
    }

    /// Same as [`with_clock`](Self::with_clock), but takes a shared clock.
    pub fn with_arc_clock(self, clock: Arc<dyn Clock>) -> Self {
        PoolBuilder {
            config: PoolConfig {
                clock,
                ..self.config
            },
        }
    }

    /// Builds a [`StaticPool`] from a list of endpoint URIs.
    pub fn build_static<I, S>(self, uris: I) -> Result<StaticPool, PoolError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(StaticPool::new(parse_endpoints(uris)?, self.config))
    }

    /// Builds a [`SniffingPool`] from a list of endpoint URIs.
    pub fn build_sniffing<I, S>(self, uris: I) -> Result<SniffingPool, PoolError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(SniffingPool::new(parse_endpoints(uris)?, self.config))
    }
}

/// Parses every URI, failing on the first invalid one.
pub fn parse_endpoints<I, S>(uris: I) -> Result<Vec<Endpoint>, PoolError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    uris.into_iter().map(Endpoint::new).collect()
}
