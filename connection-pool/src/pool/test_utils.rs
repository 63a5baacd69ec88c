use std::{
    sync::Once,
    time::{Duration, Instant},
};

use parking_lot::Mutex;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::pool::{clock::Clock, endpoint::Endpoint, ConnectionPool};

static TRACING_INIT: Once = Once::new();

pub(crate) fn setup_tracing() {
    TRACING_INIT.call_once(|| {
        FmtSubscriber::builder().with_max_level(Level::TRACE).init();
    });
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub(crate) struct MockClock {
    now: Mutex<Instant>,
}

impl MockClock {
    pub(crate) fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    pub(crate) fn advance(&self, duration: Duration) {
        *self.now.lock() += duration;
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }
}

pub(crate) fn endpoints(uris: &[&str]) -> Vec<Endpoint> {
    uris.iter()
        .map(|uri| Endpoint::new(uri).expect("invalid endpoint"))
        .collect()
}

/// Calls unseeded `next` `n` times and returns the selected endpoints.
pub(crate) fn select_n_times(n: usize, pool: &impl ConnectionPool) -> Vec<Endpoint> {
    (0..n)
        .map(|_| pool.next(None).expect("failed to select an endpoint").endpoint)
        .collect()
}
