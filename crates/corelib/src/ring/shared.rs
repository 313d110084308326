//! A hash ring shared between threads.
//!
//! [`HashRing`] itself has no interior locking. `SharedRing` puts it behind a
//! `parking_lot::RwLock`: any number of routers may look keys up at once,
//! membership changes take the write lock and are applied whole, so readers
//! never see a node half added or half removed.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use crate::error::Result;
use crate::node::NodeId;
use crate::partitioner::{Partitioner, Xxh3Partitioner};
use crate::ring::HashRing;

/// Cloneable handle to one ring; clones share the same state.
#[derive(Debug)]
pub struct SharedRing<P = Xxh3Partitioner> {
    inner: Arc<RwLock<HashRing<P>>>,
}

impl<P> Clone for SharedRing<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P: Partitioner> SharedRing<P> {
    pub fn new(ring: HashRing<P>) -> Self {
        publish_gauges(&ring);
        Self {
            inner: Arc::new(RwLock::new(ring)),
        }
    }

    pub fn add_node(&self, node_id: impl Into<NodeId>, replicas: usize) -> Result<()> {
        let node_id = node_id.into();
        let mut ring = self.inner.write();
        ring.add_node(node_id.clone(), replicas)?;
        membership_changed(&ring);
        info!(node = %node_id, replicas, nodes = ring.node_count(), "node joined ring");
        Ok(())
    }

    pub fn remove_node(&self, node_id: &NodeId) -> bool {
        let mut ring = self.inner.write();
        let removed = ring.remove_node(node_id);
        if removed {
            membership_changed(&ring);
            info!(node = %node_id, nodes = ring.node_count(), "node left ring");
        }
        removed
    }

    pub fn set_replicas(&self, node_id: &NodeId, replicas: usize) -> Result<()> {
        let mut ring = self.inner.write();
        ring.set_replicas(node_id, replicas)?;
        membership_changed(&ring);
        Ok(())
    }

    /// Owner of `key`. Returns an owned id so no lock outlives the call.
    pub fn get_node(&self, key: impl AsRef<[u8]>) -> Result<NodeId> {
        self.inner.read().get_node(key).cloned()
    }

    pub fn get_nodes(&self, key: impl AsRef<[u8]>, n: usize) -> Vec<NodeId> {
        self.inner.read().get_nodes(key, n)
    }

    pub fn node_count(&self) -> usize {
        self.inner.read().node_count()
    }

    pub fn vnode_count(&self) -> usize {
        self.inner.read().vnode_count()
    }

    pub fn contains(&self, node_id: &NodeId) -> bool {
        self.inner.read().contains(node_id)
    }

    /// Run `f` against the ring under one read lock, e.g. to resolve a batch
    /// of keys against a single membership view.
    pub fn read<R>(&self, f: impl FnOnce(&HashRing<P>) -> R) -> R {
        f(&self.inner.read())
    }

    /// Point-in-time copy of the ring.
    pub fn snapshot(&self) -> HashRing<P>
    where
        P: Clone,
    {
        self.inner.read().clone()
    }
}

impl<P: Partitioner> From<HashRing<P>> for SharedRing<P> {
    fn from(ring: HashRing<P>) -> Self {
        Self::new(ring)
    }
}

fn membership_changed<P: Partitioner>(ring: &HashRing<P>) {
    metrics::counter!("shardring.membership_changes").increment(1);
    publish_gauges(ring);
}

fn publish_gauges<P: Partitioner>(ring: &HashRing<P>) {
    metrics::gauge!("shardring.nodes").set(ring.node_count() as f64);
    metrics::gauge!("shardring.vnodes").set(ring.vnode_count() as f64);
}
