//! Ring configuration.
//!
//! A ring is usually described by a small JSON document:
//!
//! ```json
//! {
//!   "partitioner": "xxh3",
//!   "replicas": 3,
//!   "nodes": ["shard1", { "id": "shard2", "replicas": 6 }]
//! }
//! ```
//!
//! `partitioner` and `replicas` are optional. A node entry is either a bare
//! id or an object with its own replica count.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::node::NodeId;
use crate::partitioner::{AnyPartitioner, PartitionerKind};
use crate::ring::{HashRing, DEFAULT_REPLICAS};

fn default_replicas() -> usize {
    DEFAULT_REPLICAS
}

/// Declarative description of a ring.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RingConfig {
    #[serde(default)]
    pub partitioner: PartitionerKind,
    #[serde(default = "default_replicas")]
    pub replicas: usize,
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
}

/// One node entry in a [`RingConfig`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeSpec {
    Id(NodeId),
    Detailed(NodeEntry),
}

/// Object form of a node entry: `{"id": "shard2", "replicas": 6}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeEntry {
    pub id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<usize>,
}

impl NodeSpec {
    pub fn id(&self) -> &NodeId {
        match self {
            NodeSpec::Id(id) => id,
            NodeSpec::Detailed(entry) => &entry.id,
        }
    }

    pub fn replicas(&self) -> Option<usize> {
        match self {
            NodeSpec::Id(_) => None,
            NodeSpec::Detailed(entry) => entry.replicas,
        }
    }
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            partitioner: PartitionerKind::default(),
            replicas: DEFAULT_REPLICAS,
            nodes: Vec::new(),
        }
    }
}

impl RingConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: RingConfig =
            serde_json::from_str(json).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::InvalidConfig(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "loaded ring config");
        Self::from_json_str(&json)
    }

    /// Config listing `nodes` with the default replica count.
    pub fn with_nodes<I, N>(nodes: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<NodeId>,
    {
        Self {
            nodes: nodes.into_iter().map(|n| NodeSpec::Id(n.into())).collect(),
            ..Self::default()
        }
    }

    /// Reject zero replica counts and repeated node ids.
    pub fn validate(&self) -> Result<()> {
        if self.replicas == 0 {
            return Err(Error::InvalidConfig("replicas must be at least 1".to_string()));
        }
        let mut seen = BTreeSet::new();
        for node in &self.nodes {
            if node.replicas() == Some(0) {
                return Err(Error::InvalidConfig(format!(
                    "node {} has zero replicas",
                    node.id()
                )));
            }
            if !seen.insert(node.id()) {
                return Err(Error::InvalidConfig(format!(
                    "node {} listed more than once",
                    node.id()
                )));
            }
        }
        Ok(())
    }

    pub fn build_ring(&self) -> Result<HashRing<AnyPartitioner>> {
        self.validate()?;
        let partitioner = AnyPartitioner::from(self.partitioner);
        let mut ring = HashRing::with_partitioner(partitioner, self.replicas)?;
        for node in &self.nodes {
            ring.add_node(node.id().clone(), node.replicas().unwrap_or(self.replicas))?;
        }
        debug!(
            partitioner = %self.partitioner,
            nodes = ring.node_count(),
            vnodes = ring.vnode_count(),
            "built ring from config"
        );
        Ok(ring)
    }
}
