use std::{collections::HashSet, sync::Arc};

use arc_swap::ArcSwap;
use async_trait::async_trait;
use parking_lot::Mutex;

use crate::{
    pool::endpoint::Endpoint,
    sniffer::{nodes_fetch::Fetch, SnifferError},
};

#[derive(Debug)]
pub(crate) struct NodesFetcherMock {
    // Endpoints existing in the topology.
    nodes: ArcSwap<Vec<Endpoint>>,
    // Endpoints that fail to answer.
    failing_nodes: ArcSwap<HashSet<Endpoint>>,
    // Endpoints asked so far, in order.
    asked: Mutex<Vec<Endpoint>>,
}

#[async_trait]
impl Fetch for NodesFetcherMock {
    async fn fetch(&self, endpoint: &Endpoint) -> Result<Vec<Endpoint>, SnifferError> {
        self.asked.lock().push(endpoint.clone());
        if self.failing_nodes.load().contains(endpoint) {
            return Err(SnifferError::NodesFetchError(format!(
                "{endpoint} is unreachable"
            )));
        }
        Ok((*self.nodes.load_full()).clone())
    }
}

impl NodesFetcherMock {
    pub(crate) fn new() -> Self {
        Self {
            nodes: ArcSwap::from_pointee(vec![]),
            failing_nodes: ArcSwap::from_pointee(HashSet::new()),
            asked: Mutex::new(vec![]),
        }
    }

    pub(crate) fn overwrite_nodes(&self, nodes: Vec<Endpoint>) {
        self.nodes.store(Arc::new(nodes));
    }

    pub(crate) fn overwrite_failing_nodes(&self, nodes: Vec<Endpoint>) {
        self.failing_nodes.store(Arc::new(HashSet::from_iter(nodes)));
    }

    pub(crate) fn asked(&self) -> Vec<Endpoint> {
        self.asked.lock().clone()
    }
}
