//! Token abstraction module for consistent hashing.
//!
//! Tokens are positions on the hash ring. The ring space is the full `u64`
//! range, treated as a circle: the successor of `Token::MAX` is `Token::MIN`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A position on the 64-bit hash ring.
///
/// Kept distinct from `NodeId` so a hash position can never be compared with
/// or substituted for a node identifier.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(pub u64);

impl Token {
    /// Start of the ring.
    pub const MIN: Token = Token(0);
    /// End of the ring.
    pub const MAX: Token = Token(u64::MAX);

    #[inline]
    pub fn value(self) -> u64 {
        self.0
    }

    /// Clockwise distance from `self` to `other`, wrapping past `MAX`.
    #[inline]
    pub fn distance_to(self, other: Token) -> u64 {
        other.0.wrapping_sub(self.0)
    }

    /// The next position clockwise.
    #[inline]
    pub fn successor(self) -> Token {
        Token(self.0.wrapping_add(1))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({:016x})", self.0)
    }
}

impl From<u64> for Token {
    fn from(value: u64) -> Self {
        Token(value)
    }
}
