//! CLI subcommands and their results.

use std::collections::BTreeMap;
use std::fmt;

use clap::Subcommand;
use serde::Serialize;
use shardring_core::ring::topology::moved_fraction;
use shardring_core::{HashRing, NodeId, Partitioner, RingTopology, Token};
use shardring_replication::{ReplicaPlacement, SimpleStrategy};
use tracing::{info, warn};

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show which node owns each key.
    Lookup {
        /// Keys to route.
        #[arg(required = true)]
        keys: Vec<String>,
        /// Number of distinct nodes to list per key (primary first).
        #[arg(long, default_value_t = 1)]
        copies: usize,
    },
    /// Show ring membership and how much of the ring each node owns.
    Inspect,
    /// Route synthetic keys, apply membership changes, report what moved.
    Simulate {
        /// Number of synthetic keys ("key-0", "key-1", ...).
        #[arg(long, default_value_t = 10_000)]
        keys: usize,
        /// Node to add (repeatable).
        #[arg(long)]
        add: Vec<String>,
        /// Node to remove (repeatable).
        #[arg(long)]
        remove: Vec<String>,
    },
}

impl Command {
    pub fn execute<P>(&self, ring: &HashRing<P>) -> anyhow::Result<CommandResult>
    where
        P: Partitioner + Clone,
    {
        match self {
            Command::Lookup { keys, copies } => lookup(ring, keys, *copies),
            Command::Inspect => Ok(CommandResult::Inspect(inspect(ring))),
            Command::Simulate { keys, add, remove } => simulate(ring, *keys, add, remove),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CommandResult {
    Lookup(Vec<LookupRow>),
    Inspect(InspectReport),
    Simulate(SimulationReport),
}

impl CommandResult {
    pub fn render(&self, json: bool) -> anyhow::Result<String> {
        if json {
            Ok(serde_json::to_string_pretty(self)?)
        } else {
            Ok(self.to_string())
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LookupRow {
    pub token: Token,
    #[serde(flatten)]
    pub placement: ReplicaPlacement,
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeReport {
    pub id: NodeId,
    pub replicas: usize,
    pub ownership: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    pub partitioner: String,
    pub vnodes: usize,
    pub tokens: usize,
    pub nodes: Vec<NodeReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeLoad {
    pub id: NodeId,
    pub keys: usize,
    pub share: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub keys: usize,
    pub added: Vec<NodeId>,
    pub removed: Vec<NodeId>,
    pub before: Vec<NodeLoad>,
    pub after: Vec<NodeLoad>,
    pub remapped: usize,
    pub remapped_fraction: f64,
    /// Share of the token space that changed owner.
    pub predicted_fraction: f64,
}

fn lookup<P: Partitioner>(
    ring: &HashRing<P>,
    keys: &[String],
    copies: usize,
) -> anyhow::Result<CommandResult> {
    let strategy = SimpleStrategy::new(copies)?;
    let rows = keys
        .iter()
        .map(|key| -> anyhow::Result<LookupRow> {
            let placement = ReplicaPlacement::compute(&strategy, ring, key.as_bytes())?;
            if !placement.is_fully_replicated() {
                warn!(key = %key, wanted = copies, "ring has fewer nodes than requested copies");
            }
            Ok(LookupRow {
                token: ring.token_for(key),
                placement,
            })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(CommandResult::Lookup(rows))
}

fn inspect<P: Partitioner>(ring: &HashRing<P>) -> InspectReport {
    let ownership = RingTopology::new(ring).ownership();
    let nodes = ring
        .nodes()
        .map(|id| NodeReport {
            id: id.clone(),
            replicas: ring.replicas_of(id).unwrap_or_default(),
            ownership: ownership.get(id).copied().unwrap_or_default(),
        })
        .collect();
    InspectReport {
        partitioner: ring.partitioner_name().to_string(),
        vnodes: ring.vnode_count(),
        tokens: ring.token_count(),
        nodes,
    }
}

fn simulate<P: Partitioner + Clone>(
    ring: &HashRing<P>,
    keys: usize,
    add: &[String],
    remove: &[String],
) -> anyhow::Result<CommandResult> {
    let mut changed = ring.clone();
    let mut removed = Vec::new();
    for id in remove {
        let id = NodeId::from(id);
        if changed.remove_node(&id) {
            removed.push(id);
        } else {
            warn!(node = %id, "not on the ring, nothing to remove");
        }
    }
    let mut added = Vec::new();
    for id in add {
        let id = NodeId::from(id);
        changed.add_node_default(id.clone())?;
        added.push(id);
    }

    let names: Vec<String> = (0..keys).map(|i| format!("key-{}", i)).collect();
    let before = route(ring, &names)?;
    let after = route(&changed, &names)?;
    let remapped = before.iter().zip(&after).filter(|(a, b)| a != b).count();
    let movements = RingTopology::diff(ring, &changed);
    info!(keys, remapped, ranges = movements.len(), "simulated membership change");

    Ok(CommandResult::Simulate(SimulationReport {
        keys,
        added,
        removed,
        before: load(&before, ring.nodes()),
        after: load(&after, changed.nodes()),
        remapped,
        remapped_fraction: fraction(remapped, keys),
        predicted_fraction: moved_fraction(&movements),
    }))
}

fn route<P: Partitioner>(ring: &HashRing<P>, keys: &[String]) -> anyhow::Result<Vec<NodeId>> {
    keys.iter()
        .map(|key| -> anyhow::Result<NodeId> { Ok(ring.get_node(key)?.clone()) })
        .collect()
}

fn load<'a>(owners: &[NodeId], members: impl Iterator<Item = &'a NodeId>) -> Vec<NodeLoad> {
    let mut counts: BTreeMap<NodeId, usize> = members.map(|id| (id.clone(), 0)).collect();
    for owner in owners {
        *counts.entry(owner.clone()).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(id, keys)| NodeLoad {
            id,
            keys,
            share: fraction(keys, owners.len()),
        })
        .collect()
}

fn fraction(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

fn write_loads(f: &mut fmt::Formatter<'_>, title: &str, loads: &[NodeLoad]) -> fmt::Result {
    writeln!(f, "{}:", title)?;
    for load in loads {
        writeln!(
            f,
            "  {:<20} {:>8} keys  {:>6.2}%",
            load.id.as_str(),
            load.keys,
            load.share * 100.0
        )?;
    }
    Ok(())
}

impl fmt::Display for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandResult::Lookup(rows) => {
                for (i, row) in rows.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(
                        f,
                        "{} [{}] -> {}",
                        row.placement.key, row.token, row.placement.primary
                    )?;
                    if !row.placement.replicas.is_empty() {
                        let replicas: Vec<&str> =
                            row.placement.replicas.iter().map(NodeId::as_str).collect();
                        write!(f, " (replicas: {})", replicas.join(", "))?;
                    }
                }
                Ok(())
            }
            CommandResult::Inspect(report) => {
                writeln!(f, "partitioner: {}", report.partitioner)?;
                writeln!(
                    f,
                    "nodes: {}  vnodes: {}  tokens: {}",
                    report.nodes.len(),
                    report.vnodes,
                    report.tokens
                )?;
                for node in &report.nodes {
                    writeln!(
                        f,
                        "  {:<20} {:>5} replicas  {:>6.2}% of ring",
                        node.id.as_str(),
                        node.replicas,
                        node.ownership * 100.0
                    )?;
                }
                Ok(())
            }
            CommandResult::Simulate(report) => {
                write_loads(f, "before", &report.before)?;
                write_loads(f, "after", &report.after)?;
                write!(
                    f,
                    "remapped {} of {} keys ({:.2}%), ring moved {:.2}%",
                    report.remapped,
                    report.keys,
                    report.remapped_fraction * 100.0,
                    report.predicted_fraction * 100.0
                )
            }
        }
    }
}
