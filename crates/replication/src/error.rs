//! Replication errors.

use shardring_core::Error as RingError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReplicationError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplicationError {
    /// A strategy needs at least one copy of each key.
    #[error("replication factor must be at least 1")]
    InvalidFactor,
    #[error(transparent)]
    Ring(#[from] RingError),
}
