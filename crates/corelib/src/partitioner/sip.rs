//! SipHash partitioner implementation.

use crate::partitioner::traits::Partitioner;
use crate::token::Token;
use siphasher::sip::SipHasher13;
use std::hash::Hasher;

/// SipHash-1-3 partitioner.
///
/// Uses fixed keys so tokens are reproducible; this is a distribution hash,
/// not a keyed MAC.
#[derive(Clone, Copy, Debug, Default)]
pub struct SipPartitioner {
    k0: u64,
    k1: u64,
}

impl SipPartitioner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Partitioner with explicit SipHash keys. Every ring that must agree on
    /// placement has to use the same pair.
    pub fn with_keys(k0: u64, k1: u64) -> Self {
        Self { k0, k1 }
    }
}

impl Partitioner for SipPartitioner {
    fn partition(&self, key: &[u8]) -> Token {
        let mut hasher = SipHasher13::new_with_keys(self.k0, self.k1);
        hasher.write(key);
        Token(hasher.finish())
    }

    fn name(&self) -> &'static str {
        "SipPartitioner"
    }
}
