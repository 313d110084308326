//! Virtual node abstractions.
//!
//! # Virtual Nodes (VNodes) Concept
//!
//! Virtual nodes are a technique to improve load distribution in consistent hashing.
//! Instead of each physical node having a single token on the ring, each node has
//! multiple tokens (virtual nodes). This provides:
//!
//! 1. **Better Load Distribution**: a node owns many scattered arcs instead of one
//!    arc whose size depends on hash luck
//! 2. **Gradual Rebalancing**: when nodes join/leave, only a fraction of keys move
//! 3. **Fault Tolerance**: the keys of a failed node spread over many survivors
//!
//! # Performance Characteristics
//!
//! - **Memory**: O(v) where v = number of vnodes per node
//! - **Lookup**: O(log n) where n = total vnodes
//! - **Rebalancing**: ~k/N keys move when one of N nodes joins/leaves (k = total keys)
//!
//! More vnodes = better distribution but more memory and slightly slower
//! membership changes.

use crate::node::NodeId;
use crate::partitioner::Partitioner;
use crate::token::Token;

/// A virtual node on the hash ring.
///
/// Represents a single token position owned by a physical node.
///
/// # Invariants
///
/// - Ordering is by token first, then node id. Two vnodes of different
///   nodes that land on the same token are both kept; the one with the
///   smaller node id sorts first and wins lookups at that token.
/// - Every `VirtualNode` belongs to exactly one physical node
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VirtualNode {
    /// Token position on the ring, the hash of `"{node_id}:{vnode_index}"`.
    pub token: Token,

    /// The physical node that owns this virtual node.
    pub node_id: NodeId,
}

impl VirtualNode {
    #[inline]
    pub fn new(token: Token, node_id: NodeId) -> Self {
        Self { token, node_id }
    }

    /// Create the `vnode_index`-th virtual node of `node_id`.
    ///
    /// # Algorithm
    ///
    /// 1. Format string: "node_id:vnode_index"
    /// 2. Hash the string with the ring's partitioner to get a token
    /// 3. Create VirtualNode with token and node_id
    pub fn from_index<P: Partitioner + ?Sized>(
        partitioner: &P,
        node_id: &NodeId,
        vnode_index: usize,
    ) -> Self {
        Self::new(vnode_token(partitioner, node_id, vnode_index), node_id.clone())
    }

    #[inline]
    pub fn token(&self) -> Token {
        self.token
    }

    #[inline]
    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    /// Clockwise distance to another virtual node.
    #[inline]
    pub fn distance_to(&self, other: &Self) -> u64 {
        self.token.distance_to(other.token)
    }
}

/// Token of the `vnode_index`-th replica of `node_id`.
pub fn vnode_token<P: Partitioner + ?Sized>(
    partitioner: &P,
    node_id: &NodeId,
    vnode_index: usize,
) -> Token {
    let vnode_key = format!("{}:{}", node_id, vnode_index);
    partitioner.partition(vnode_key.as_bytes())
}

impl std::fmt::Display for VirtualNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VNode(token={}, node={})", self.token, self.node_id)
    }
}
