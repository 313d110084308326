//! Partitioner abstraction for consistent hashing.
//!
//! Partitioners are responsible for converting keys into tokens
//! that can be placed on the hash ring. Node replicas and lookup keys must go
//! through the same partitioner, so it is fixed for the lifetime of a ring.

pub mod any;
pub mod blake;
pub mod sip;
pub mod traits;
pub mod xxh3;

pub use any::{AnyPartitioner, PartitionerKind};
pub use blake::Blake3Partitioner;
pub use sip::SipPartitioner;
pub use traits::Partitioner;
pub use xxh3::Xxh3Partitioner;
