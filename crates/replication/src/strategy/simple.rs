//! Simple replication strategy.
//!
//! Places N replicas sequentially around the ring (clockwise from the primary).
//! This is the simplest replication strategy and works well for:
//!
//! - Small clusters (< 10 nodes)
//! - Single data center deployments
//! - When network topology doesn't matter
//!
//! # Algorithm
//!
//! 1. Find primary node (clockwise search from key's token)
//! 2. Continue clockwise to find N-1 more unique nodes
//! 3. Return list of node IDs (primary first)
//!
//! # Performance
//!
//! - **Time**: O(log n + v) where n = tokens and v = vnodes walked until N
//!   distinct nodes are seen
//! - **Space**: O(r) - returns Vec of node IDs

use shardring_core::{Error as RingError, HashRing, NodeId, Partitioner};
use tracing::trace;

use crate::error::{ReplicationError, Result};
use crate::strategy::ReplicationStrategy;

/// Default number of copies per key.
pub const DEFAULT_REPLICATION_FACTOR: usize = 3;

/// Simple replication strategy: N replicas placed sequentially around the ring.
///
/// # Example
///
/// ```rust
/// use shardring_core::HashRing;
/// use shardring_replication::{ReplicationStrategy, SimpleStrategy};
///
/// let mut ring = HashRing::new();
/// for node in ["a", "b", "c", "d"] {
///     ring.add_node(node, 8).unwrap();
/// }
///
/// let strategy = SimpleStrategy::new(3).unwrap();
/// let replicas = strategy.replicas_for_key(&ring, b"my-key").unwrap();
/// assert_eq!(replicas.len(), 3);
/// assert_eq!(&replicas[0], ring.get_node(b"my-key").unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct SimpleStrategy {
    /// Number of replicas to create (including primary).
    replication_factor: usize,
}

impl SimpleStrategy {
    /// Create a new simple strategy with the given replication factor.
    ///
    /// # Arguments
    /// * `replication_factor` - Number of replicas (typically 1-5)
    ///   - 1: No replication (single copy)
    ///   - 3: Standard (primary + 2 replicas)
    ///   - 5: High availability (primary + 4 replicas)
    pub fn new(replication_factor: usize) -> Result<Self> {
        if replication_factor == 0 {
            return Err(ReplicationError::InvalidFactor);
        }
        Ok(Self { replication_factor })
    }
}

impl Default for SimpleStrategy {
    fn default() -> Self {
        Self {
            replication_factor: DEFAULT_REPLICATION_FACTOR,
        }
    }
}

impl ReplicationStrategy for SimpleStrategy {
    fn replication_factor(&self) -> usize {
        self.replication_factor
    }

    fn replicas_for_key<P: Partitioner>(
        &self,
        ring: &HashRing<P>,
        key: &[u8],
    ) -> Result<Vec<NodeId>> {
        if ring.is_empty() {
            return Err(RingError::EmptyRing.into());
        }
        let replicas = ring.get_nodes(key, self.replication_factor);
        trace!(
            strategy = self.name(),
            wanted = self.replication_factor,
            found = replicas.len(),
            "placed replicas"
        );
        Ok(replicas)
    }

    fn name(&self) -> &'static str {
        "SimpleStrategy"
    }
}
