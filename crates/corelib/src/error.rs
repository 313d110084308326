//! Error types for the core library.

use crate::node::NodeId;
use thiserror::Error;

/// Result type alias for the core library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the core library.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Lookup on a ring with no registered nodes.
    #[error("no nodes available: the ring is empty")]
    EmptyRing,
    /// Node is already a member of the ring.
    #[error("node {0} is already on the ring")]
    DuplicateNode(NodeId),
    /// Node is not a member of the ring.
    #[error("node {0} is not on the ring")]
    UnknownNode(NodeId),
    /// A node needs at least one virtual replica.
    #[error("invalid replica count {0}: must be at least 1")]
    InvalidReplicas(usize),
    /// Ring configuration could not be parsed or validated.
    #[error("invalid ring configuration: {0}")]
    InvalidConfig(String),
}
