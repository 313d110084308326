//! Core library for consistent hashing implementation.
//!
//! This crate provides the fundamental abstractions for consistent hashing:
//! - Tokens (ring positions) and node identifiers
//! - Partitioners (the hash functions placing keys and vnodes on the ring)
//! - Virtual nodes
//! - The hash ring, its thread-shared wrapper, and ownership topology
//! - Ring configuration
//!
//! ```rust
//! use shardring_core::HashRing;
//!
//! let mut ring = HashRing::new();
//! for shard in ["shard1", "shard2", "shard3"] {
//!     ring.add_node(shard, 3).unwrap();
//! }
//! let owner = ring.get_node("user:12345").unwrap();
//! assert!(["shard1", "shard2", "shard3"].contains(&owner.as_str()));
//! ```

pub mod config;
pub mod error;
pub mod node;
pub mod partitioner;
pub mod ring;
pub mod token;
pub mod vnode;

pub use config::{NodeEntry, NodeSpec, RingConfig};
pub use error::{Error, Result};
pub use node::NodeId;
pub use partitioner::{AnyPartitioner, Partitioner, PartitionerKind};
pub use ring::{HashRing, Movement, RingBuilder, RingTopology, SharedRing, TokenRange};
pub use token::Token;
pub use vnode::VirtualNode;
