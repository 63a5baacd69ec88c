//! The `connection-pool` crate is the client-side endpoint pool of an HTTP
//! cluster client. For every outgoing request the owning client asks the pool
//! which backend endpoint to use, and reports the outcome afterwards so that
//! failing endpoints are avoided for a while and recovered endpoints are
//! reinstated.
//!
//! ## Overview
//! Two pool variants implement [`ConnectionPool`]:
//!
//! - [`StaticPool`] has a fixed set of endpoints for its whole lifetime.
//! - [`SniffingPool`] wraps the same selection and health logic and lets the
//!   whole endpoint set be replaced at runtime, typically by a [`Sniffer`]
//!   that asks the cluster for its current members.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use connection_pool::{ConnectionPool, PoolBuilder};
//!
//! # fn main() -> Result<(), connection_pool::PoolError> {
//! let pool = PoolBuilder::new()
//!     .with_randomize_on_startup(false)
//!     .build_static(["http://node1:9200", "http://node2:9200"])?;
//!
//! let selection = pool.next(None)?;
//! // ... issue the request against `selection.endpoint` ...
//! pool.report_failure(
//!     &selection.endpoint,
//!     Some(Duration::from_secs(10)),
//!     Some(Duration::from_secs(300)),
//! );
//!
//! // Continue the round-robin sweep from where the previous call left off.
//! let retry = pool.next(Some(selection.next_seed))?;
//! assert_ne!(retry.endpoint, selection.endpoint);
//! # Ok(())
//! # }
//! ```
//!
//! [`Sniffer`]: sniffer::Sniffer

#![warn(
    missing_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links
)]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

pub mod pool;
pub mod sniffer;

#[doc(inline)]
pub use pool::{
    clock::{Clock, SystemClock},
    endpoint::Endpoint,
    endpoint_state::{EndpointState, EndpointStatus},
    pool_config::{PoolBuilder, PoolConfig},
    pool_error::PoolError,
    sniffing_pool::SniffingPool,
    static_pool::StaticPool,
    ConnectionPool, PoolStats, Selection,
};
#[doc(inline)]
pub use sniffer::{Fetch, Sniffer, SnifferBuilder, SnifferError};
