use std::fmt::Debug;

use async_trait::async_trait;

use crate::{pool::endpoint::Endpoint, sniffer::SnifferError};

/// Fetcher of the endpoints currently in the cluster topology.
///
/// An implementation asks one cluster member for the list of all members,
/// e.g. through a nodes-info API of the backend.
#[async_trait]
pub trait Fetch: Sync + Send + Debug {
    /// Fetches the cluster members, using `endpoint` as the member to ask.
    async fn fetch(&self, endpoint: &Endpoint) -> Result<Vec<Endpoint>, SnifferError>;
}
