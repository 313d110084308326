//! Hash ring data structure and lookup logic.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::node::NodeId;
use crate::partitioner::{Partitioner, Xxh3Partitioner};
use crate::token::Token;
use crate::vnode::{vnode_token, VirtualNode};

/// Virtual replicas per node when the caller does not say otherwise.
pub const DEFAULT_REPLICAS: usize = 3;

/// Consistent hash ring with virtual nodes.
///
/// All ring positions live in one ordered map, `token -> owners`. The owner
/// list is almost always a single node; when replicas of different nodes
/// hash to the same token every owner is kept in sorted order and the first
/// one answers lookups. `members` records how many replicas each node was
/// added with so removal can recompute its tokens.
///
/// The ring does no locking of its own: mutation takes `&mut self`. Wrap it
/// in [`SharedRing`](crate::ring::SharedRing) to share it between threads
/// that also mutate it.
#[derive(Clone, Debug)]
pub struct HashRing<P = Xxh3Partitioner> {
    partitioner: P,
    default_replicas: usize,
    positions: BTreeMap<Token, Vec<NodeId>>,
    members: BTreeMap<NodeId, usize>,
    vnode_count: usize,
}

impl HashRing<Xxh3Partitioner> {
    /// Empty ring using XXH3 and [`DEFAULT_REPLICAS`].
    pub fn new() -> Self {
        Self::empty(Xxh3Partitioner, DEFAULT_REPLICAS)
    }
}

impl Default for HashRing<Xxh3Partitioner> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Partitioner> HashRing<P> {
    /// Empty ring with an explicit partitioner and default replica count.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidReplicas`] if `default_replicas` is zero
    pub fn with_partitioner(partitioner: P, default_replicas: usize) -> Result<Self> {
        if default_replicas == 0 {
            return Err(Error::InvalidReplicas(0));
        }
        Ok(Self::empty(partitioner, default_replicas))
    }

    fn empty(partitioner: P, default_replicas: usize) -> Self {
        Self {
            partitioner,
            default_replicas,
            positions: BTreeMap::new(),
            members: BTreeMap::new(),
            vnode_count: 0,
        }
    }

    /// Add a node with `replicas` virtual nodes.
    ///
    /// Replica `i` is placed at `hash("{node_id}:{i}")` for `i` in
    /// `0..replicas`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidReplicas`] if `replicas` is zero
    /// - [`Error::DuplicateNode`] if the node is already present; the ring
    ///   is left untouched (use [`set_replicas`](Self::set_replicas) to
    ///   re-weight a member)
    pub fn add_node(&mut self, node_id: impl Into<NodeId>, replicas: usize) -> Result<()> {
        let node_id = node_id.into();
        if replicas == 0 {
            return Err(Error::InvalidReplicas(replicas));
        }
        if self.members.contains_key(&node_id) {
            return Err(Error::DuplicateNode(node_id));
        }

        self.insert_positions(&node_id, replicas);
        debug!(node = %node_id, replicas, vnodes = self.vnode_count, "added node to ring");
        self.members.insert(node_id, replicas);
        Ok(())
    }

    /// Add a node with the ring's default replica count.
    pub fn add_node_default(&mut self, node_id: impl Into<NodeId>) -> Result<()> {
        let replicas = self.default_replicas;
        self.add_node(node_id, replicas)
    }

    /// Remove a node and all of its virtual nodes.
    ///
    /// Idempotent: returns `false` if the node was not on the ring.
    pub fn remove_node(&mut self, node_id: &NodeId) -> bool {
        let Some(replicas) = self.members.remove(node_id) else {
            trace!(node = %node_id, "remove of unknown node ignored");
            return false;
        };
        self.remove_positions(node_id, replicas);
        debug!(node = %node_id, replicas, vnodes = self.vnode_count, "removed node from ring");
        true
    }

    /// Change the replica count of an existing node.
    ///
    /// Replica tokens depend only on the node id and index, so replicas
    /// `0..min(old, new)` keep their positions and only the difference moves
    /// keys.
    pub fn set_replicas(&mut self, node_id: &NodeId, replicas: usize) -> Result<()> {
        if replicas == 0 {
            return Err(Error::InvalidReplicas(replicas));
        }
        let Some(current) = self.members.get_mut(node_id) else {
            return Err(Error::UnknownNode(node_id.clone()));
        };
        let old = std::mem::replace(current, replicas);
        if old == replicas {
            return Ok(());
        }

        // Rebuilding from scratch keeps self-collisions (two replicas of one
        // node on the same token) collapsed to a single position.
        self.remove_positions(node_id, old);
        self.insert_positions(node_id, replicas);
        debug!(node = %node_id, old, new = replicas, "changed node replica count");
        Ok(())
    }

    /// Find the node responsible for `key`.
    ///
    /// Hashes the key with the ring's partitioner and walks clockwise to the
    /// first virtual node at or after that token, wrapping to the start of
    /// the ring when the key hashes past the last one.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyRing`] if no node has been added.
    pub fn get_node(&self, key: impl AsRef<[u8]>) -> Result<&NodeId> {
        let token = self.partitioner.partition(key.as_ref());
        self.node_for_token(token)
    }

    /// Owner of an arbitrary ring position.
    pub fn node_for_token(&self, token: Token) -> Result<&NodeId> {
        self.positions
            .range(token..)
            .next()
            .or_else(|| self.positions.iter().next())
            .and_then(|(_, owners)| owners.first())
            .ok_or(Error::EmptyRing)
    }

    /// Preference list: up to `n` distinct nodes walking clockwise from the
    /// key's position. The first entry is always [`get_node`](Self::get_node).
    pub fn get_nodes(&self, key: impl AsRef<[u8]>, n: usize) -> Vec<NodeId> {
        let token = self.partitioner.partition(key.as_ref());
        self.nodes_for_token(token, n)
    }

    /// Preference list starting at an arbitrary ring position.
    pub fn nodes_for_token(&self, token: Token, n: usize) -> Vec<NodeId> {
        let wanted = n.min(self.members.len());
        let mut found: Vec<NodeId> = Vec::with_capacity(wanted);
        if wanted == 0 {
            return found;
        }

        let after = self.positions.range(token..);
        let before = self.positions.range(..token);
        for (_, owners) in after.chain(before) {
            for node_id in owners {
                if !found.contains(node_id) {
                    found.push(node_id.clone());
                    if found.len() == wanted {
                        return found;
                    }
                }
            }
        }
        found
    }

    /// Token the ring's partitioner assigns to `key`.
    pub fn token_for(&self, key: impl AsRef<[u8]>) -> Token {
        self.partitioner.partition(key.as_ref())
    }

    /// Number of physical nodes.
    pub fn node_count(&self) -> usize {
        self.members.len()
    }

    /// Number of virtual nodes on the ring.
    pub fn vnode_count(&self) -> usize {
        self.vnode_count
    }

    /// Number of distinct tokens on the ring (differs from
    /// [`vnode_count`](Self::vnode_count) only on hash collisions).
    pub fn token_count(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, node_id: &NodeId) -> bool {
        self.members.contains_key(node_id)
    }

    /// Replica count the node was added with.
    pub fn replicas_of(&self, node_id: &NodeId) -> Option<usize> {
        self.members.get(node_id).copied()
    }

    /// All member nodes, sorted by id.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeId> + '_ {
        self.members.keys()
    }

    /// All virtual nodes in ring order.
    pub fn vnodes(&self) -> impl Iterator<Item = VirtualNode> + '_ {
        self.positions.iter().flat_map(|(token, owners)| {
            owners
                .iter()
                .map(move |node_id| VirtualNode::new(*token, node_id.clone()))
        })
    }

    /// Distinct tokens in ring order with the node that wins lookups there.
    pub fn tokens(&self) -> impl Iterator<Item = (Token, &NodeId)> + '_ {
        self.positions
            .iter()
            .filter_map(|(token, owners)| owners.first().map(|owner| (*token, owner)))
    }

    pub fn partitioner(&self) -> &P {
        &self.partitioner
    }

    pub fn partitioner_name(&self) -> &'static str {
        self.partitioner.name()
    }

    pub fn default_replicas(&self) -> usize {
        self.default_replicas
    }

    fn insert_positions(&mut self, node_id: &NodeId, replicas: usize) {
        for index in 0..replicas {
            let token = vnode_token(&self.partitioner, node_id, index);
            let owners = self.positions.entry(token).or_default();
            match owners.binary_search(node_id) {
                Ok(_) => {
                    trace!(node = %node_id, index, %token, "replica collapsed onto own token");
                }
                Err(slot) => {
                    if !owners.is_empty() {
                        debug!(node = %node_id, %token, "token collision on ring");
                    }
                    owners.insert(slot, node_id.clone());
                    self.vnode_count += 1;
                }
            }
        }
    }

    fn remove_positions(&mut self, node_id: &NodeId, replicas: usize) {
        for index in 0..replicas {
            let token = vnode_token(&self.partitioner, node_id, index);
            let Some(owners) = self.positions.get_mut(&token) else {
                continue;
            };
            if let Ok(slot) = owners.binary_search(node_id) {
                owners.remove(slot);
                self.vnode_count -= 1;
            }
            if owners.is_empty() {
                self.positions.remove(&token);
            }
        }
    }
}

/// Builder for a [`HashRing`] with an initial membership.
#[derive(Debug, Clone)]
pub struct RingBuilder<P = Xxh3Partitioner> {
    partitioner: P,
    vnodes: usize,
    nodes: Vec<(NodeId, Option<usize>)>,
}

impl RingBuilder<Xxh3Partitioner> {
    pub fn new() -> Self {
        Self {
            partitioner: Xxh3Partitioner,
            vnodes: DEFAULT_REPLICAS,
            nodes: Vec::new(),
        }
    }
}

impl Default for RingBuilder<Xxh3Partitioner> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Partitioner> RingBuilder<P> {
    /// Replace the partitioner, keeping the other settings.
    pub fn with_partitioner<Q: Partitioner>(self, partitioner: Q) -> RingBuilder<Q> {
        RingBuilder {
            partitioner,
            vnodes: self.vnodes,
            nodes: self.nodes,
        }
    }

    /// Default vnode count for nodes added without an explicit one.
    pub fn with_vnodes(mut self, vnodes: usize) -> Self {
        self.vnodes = vnodes;
        self
    }

    pub fn add_node(mut self, node_id: impl Into<NodeId>) -> Self {
        self.nodes.push((node_id.into(), None));
        self
    }

    pub fn add_node_with_vnodes(mut self, node_id: impl Into<NodeId>, vnodes: usize) -> Self {
        self.nodes.push((node_id.into(), Some(vnodes)));
        self
    }

    pub fn add_nodes<I, N>(mut self, node_ids: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<NodeId>,
    {
        self.nodes
            .extend(node_ids.into_iter().map(|id| (id.into(), None)));
        self
    }

    /// Build the ring, failing on the first invalid or duplicate node.
    pub fn build(self) -> Result<HashRing<P>> {
        let mut ring = HashRing::with_partitioner(self.partitioner, self.vnodes)?;
        for (node_id, vnodes) in self.nodes {
            ring.add_node(node_id, vnodes.unwrap_or(self.vnodes))?;
        }
        Ok(ring)
    }
}
