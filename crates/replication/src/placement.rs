//! Replica placement for a single key.

use serde::Serialize;
use shardring_core::{HashRing, NodeId, Partitioner};

use crate::error::Result;
use crate::strategy::ReplicationStrategy;

/// Where one key's copies live: the primary owner plus the secondary
/// replicas, in clockwise ring order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplicaPlacement {
    pub key: String,
    pub primary: NodeId,
    pub replicas: Vec<NodeId>,
    /// Replication factor the strategy asked for.
    pub wanted: usize,
}

impl ReplicaPlacement {
    pub fn compute<S, P>(strategy: &S, ring: &HashRing<P>, key: &[u8]) -> Result<Self>
    where
        S: ReplicationStrategy,
        P: Partitioner,
    {
        let mut nodes = strategy.replicas_for_key(ring, key)?.into_iter();
        let primary = nodes.next().ok_or(shardring_core::Error::EmptyRing)?;
        Ok(Self {
            key: String::from_utf8_lossy(key).into_owned(),
            primary,
            replicas: nodes.collect(),
            wanted: strategy.replication_factor(),
        })
    }

    /// All copies, primary first.
    pub fn all(&self) -> impl Iterator<Item = &NodeId> {
        std::iter::once(&self.primary).chain(self.replicas.iter())
    }

    /// True when the ring had enough members for every requested copy.
    pub fn is_fully_replicated(&self) -> bool {
        1 + self.replicas.len() >= self.wanted
    }
}
