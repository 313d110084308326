//! Command-line configuration.

use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, Parser};
use shardring_core::{NodeId, NodeSpec, PartitionerKind, RingConfig};
use tracing::debug;

use crate::commands::Command;

/// Build a consistent hash ring and query it.
#[derive(Parser, Debug, Clone)]
#[command(name = "shardring", version)]
pub struct CliConfig {
    /// Ring description (JSON). Flags below are applied on top of it.
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Comma-separated node ids to add to the ring.
    #[arg(long, value_delimiter = ',', global = true)]
    pub nodes: Vec<String>,

    /// Virtual replicas per node.
    #[arg(long, short = 'r', global = true)]
    pub replicas: Option<usize>,

    /// Hash function: xxh3, sip or blake3.
    #[arg(long, short = 'p', global = true)]
    pub partitioner: Option<PartitionerKind>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

impl CliConfig {
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    }

    /// The ring description: config file first, then flag overrides.
    pub fn ring_config(&self) -> anyhow::Result<RingConfig> {
        let mut ring_config = match &self.config {
            Some(path) => RingConfig::from_path(path)
                .with_context(|| format!("loading ring config {}", path.display()))?,
            None => RingConfig::default(),
        };
        if let Some(kind) = self.partitioner {
            ring_config.partitioner = kind;
        }
        if let Some(replicas) = self.replicas {
            ring_config.replicas = replicas;
        }
        ring_config.nodes.extend(
            self.nodes
                .iter()
                .map(|n| n.trim())
                .filter(|n| !n.is_empty())
                .map(|n| NodeSpec::Id(NodeId::from(n))),
        );
        ring_config.validate().context("invalid ring configuration")?;
        debug!(
            partitioner = %ring_config.partitioner,
            replicas = ring_config.replicas,
            nodes = ring_config.nodes.len(),
            "resolved ring configuration"
        );
        Ok(ring_config)
    }

    /// Build the ring and run the subcommand, returning rendered output.
    pub fn run(&self) -> anyhow::Result<String> {
        let ring = self.ring_config()?.build_ring().context("building ring")?;
        let result = self.command.execute(&ring)?;
        result.render(self.json)
    }
}
