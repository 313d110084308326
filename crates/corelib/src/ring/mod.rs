//! Consistent hash ring implementation.
//!
//! The ring manages token positions and provides efficient lookup
//! operations for finding nodes responsible for keys.

#[allow(clippy::module_inception)]
pub mod ring;
pub mod shared;
pub mod topology;

pub use ring::{HashRing, RingBuilder, DEFAULT_REPLICAS};
pub use shared::SharedRing;
pub use topology::{Movement, RingTopology, TokenRange};
