//! BLAKE3 partitioner implementation.

use crate::partitioner::traits::Partitioner;
use crate::token::Token;

/// Cryptographic partitioner: the first 8 bytes (little endian) of the
/// BLAKE3 digest. Slower than XXH3, useful when keys may be adversarial.
#[derive(Clone, Copy, Debug, Default)]
pub struct Blake3Partitioner;

impl Partitioner for Blake3Partitioner {
    fn partition(&self, key: &[u8]) -> Token {
        let digest = blake3::hash(key);
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest.as_bytes()[..8]);
        Token(u64::from_le_bytes(prefix))
    }

    fn name(&self) -> &'static str {
        "Blake3Partitioner"
    }
}
