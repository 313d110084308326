//! CLI entry point for shardring.

use clap::Parser;
use shardring_cli::CliConfig;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // RUST_LOG wins over -v.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let output = config.run()?;
    println!("{}", output);
    Ok(())
}
