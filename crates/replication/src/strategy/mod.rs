//! Replication strategy abstractions.
//!
//! Replication strategies determine how many replicas to create and where
//! to place them on the ring.
//!
//! - **SimpleStrategy**: N replicas placed sequentially around the ring

pub mod simple;

pub use simple::SimpleStrategy;

use shardring_core::{HashRing, NodeId, Partitioner};

use crate::error::Result;

/// Trait for replication strategies.
///
/// A replication strategy determines:
/// 1. How many replicas to create for a key
/// 2. Which nodes should hold those replicas
///
/// # Thread Safety
///
/// Implementations must be thread-safe (Send + Sync) as they may be
/// shared across threads.
pub trait ReplicationStrategy: Send + Sync + 'static {
    /// Get the number of replicas this strategy creates.
    fn replication_factor(&self) -> usize;

    /// Find replica nodes for a given key, primary first.
    ///
    /// Returns fewer than `replication_factor` nodes when the ring has fewer
    /// members.
    ///
    /// # Errors
    ///
    /// Fails with the ring's `EmptyRing` error when no node is registered.
    fn replicas_for_key<P: Partitioner>(
        &self,
        ring: &HashRing<P>,
        key: &[u8],
    ) -> Result<Vec<NodeId>>;

    /// Get the strategy name (for logging/debugging).
    fn name(&self) -> &'static str;
}
