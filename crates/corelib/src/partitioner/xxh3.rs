//! XXH3 partitioner implementation.

use crate::partitioner::traits::Partitioner;
use crate::token::Token;
use xxhash_rust::xxh3::xxh3_64;

/// 64-bit XXH3 partitioner. Fast, well distributed, and the ring default.
#[derive(Clone, Copy, Debug, Default)]
pub struct Xxh3Partitioner;

impl Partitioner for Xxh3Partitioner {
    #[inline]
    fn partition(&self, key: &[u8]) -> Token {
        Token(xxh3_64(key))
    }

    fn name(&self) -> &'static str {
        "Xxh3Partitioner"
    }
}
