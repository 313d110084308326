//! Runtime-selectable partitioner, for rings built from configuration.

use crate::error::Error;
use crate::partitioner::{Blake3Partitioner, Partitioner, SipPartitioner, Xxh3Partitioner};
use crate::token::Token;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Names the hash function a ring uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartitionerKind {
    #[default]
    Xxh3,
    Sip,
    Blake3,
}

impl PartitionerKind {
    pub const ALL: [PartitionerKind; 3] = [
        PartitionerKind::Xxh3,
        PartitionerKind::Sip,
        PartitionerKind::Blake3,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PartitionerKind::Xxh3 => "xxh3",
            PartitionerKind::Sip => "sip",
            PartitionerKind::Blake3 => "blake3",
        }
    }
}

impl fmt::Display for PartitionerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PartitionerKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "xxh3" => Ok(PartitionerKind::Xxh3),
            "sip" | "siphash" => Ok(PartitionerKind::Sip),
            "blake3" => Ok(PartitionerKind::Blake3),
            other => Err(Error::InvalidConfig(format!(
                "unknown partitioner '{}' (expected xxh3, sip or blake3)",
                other
            ))),
        }
    }
}

/// Enum dispatch over the built-in partitioners.
#[derive(Clone, Copy, Debug, Default)]
pub enum AnyPartitioner {
    #[default]
    Xxh3,
    Sip(SipPartitioner),
    Blake3,
}

impl AnyPartitioner {
    pub fn kind(&self) -> PartitionerKind {
        match self {
            AnyPartitioner::Xxh3 => PartitionerKind::Xxh3,
            AnyPartitioner::Sip(_) => PartitionerKind::Sip,
            AnyPartitioner::Blake3 => PartitionerKind::Blake3,
        }
    }
}

impl From<PartitionerKind> for AnyPartitioner {
    fn from(kind: PartitionerKind) -> Self {
        match kind {
            PartitionerKind::Xxh3 => AnyPartitioner::Xxh3,
            PartitionerKind::Sip => AnyPartitioner::Sip(SipPartitioner::new()),
            PartitionerKind::Blake3 => AnyPartitioner::Blake3,
        }
    }
}

impl Partitioner for AnyPartitioner {
    #[inline]
    fn partition(&self, key: &[u8]) -> Token {
        match self {
            AnyPartitioner::Xxh3 => Xxh3Partitioner.partition(key),
            AnyPartitioner::Sip(p) => p.partition(key),
            AnyPartitioner::Blake3 => Blake3Partitioner.partition(key),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            AnyPartitioner::Xxh3 => Xxh3Partitioner.name(),
            AnyPartitioner::Sip(p) => p.name(),
            AnyPartitioner::Blake3 => Blake3Partitioner.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in PartitionerKind::ALL {
            assert_eq!(kind.as_str().parse::<PartitionerKind>().unwrap(), kind);
            assert_eq!(AnyPartitioner::from(kind).kind(), kind);
        }
        assert!("md5".parse::<PartitionerKind>().is_err());
    }

    #[test]
    fn test_dispatch_matches_concrete_partitioner() {
        let key = b"user:12345";
        assert_eq!(
            AnyPartitioner::Xxh3.partition(key),
            Xxh3Partitioner.partition(key)
        );
        assert_eq!(
            AnyPartitioner::from(PartitionerKind::Sip).partition(key),
            SipPartitioner::new().partition(key)
        );
        assert_eq!(
            AnyPartitioner::Blake3.partition(key),
            Blake3Partitioner.partition(key)
        );
    }

    #[test]
    fn test_partitioners_are_deterministic_and_distinct() {
        for kind in PartitionerKind::ALL {
            let p = AnyPartitioner::from(kind);
            assert_eq!(p.partition(b"a"), p.partition(b"a"));
            assert_ne!(p.partition(b"a"), p.partition(b"b"));
        }
    }

    #[test]
    fn test_kind_deserializes_lowercase() {
        let kind: PartitionerKind = serde_json::from_str("\"blake3\"").unwrap();
        assert_eq!(kind, PartitionerKind::Blake3);
    }
}
