//! Replication strategies for consistent hashing.
//!
//! This crate provides pluggable replication strategies that determine:
//! - How many replicas to create
//! - Where to place replicas (which nodes)

pub mod error;
pub mod placement;
pub mod strategy;

pub use error::{ReplicationError, Result};
pub use placement::ReplicaPlacement;
pub use strategy::{ReplicationStrategy, SimpleStrategy};
