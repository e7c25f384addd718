//! votechain daemon — entry point for running a votechain node.

use clap::Parser;
use std::path::PathBuf;
use votechain_node::{init_logging, LogFormat, Node, NodeConfig};

#[derive(Parser)]
#[command(name = "votechain-daemon", about = "Votechain vote subsystem daemon")]
struct Cli {
    /// Address to bind the RPC listener to.
    #[arg(long, env = "VOTECHAIN_LISTEN_ADDR")]
    listen_addr: Option<String>,

    /// RPC server port.
    #[arg(long, env = "VOTECHAIN_RPC_PORT")]
    rpc_port: Option<u16>,

    /// Log format: "human" or "json".
    #[arg(long, env = "VOTECHAIN_LOG_FORMAT")]
    log_format: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "VOTECHAIN_LOG_LEVEL")]
    log_level: Option<String>,

    /// Seed demo data on startup (development only).
    #[arg(long, env = "VOTECHAIN_SEED_DEMO_DATA")]
    seed_demo_data: bool,

    /// Repair loop interval in seconds.
    #[arg(long, env = "VOTECHAIN_REPAIR_INTERVAL")]
    repair_interval: Option<u64>,

    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let base = match cli.config {
        Some(ref path) => NodeConfig::from_toml_file(
            path.to_str()
                .ok_or_else(|| anyhow::anyhow!("config path is not valid UTF-8"))?,
        )?,
        None => NodeConfig::default(),
    };

    let config = NodeConfig {
        listen_addr: cli.listen_addr.unwrap_or(base.listen_addr),
        rpc_port: cli.rpc_port.unwrap_or(base.rpc_port),
        log_format: cli.log_format.unwrap_or(base.log_format),
        log_level: cli.log_level.unwrap_or(base.log_level),
        repair_interval_secs: cli.repair_interval.unwrap_or(base.repair_interval_secs),
        seed_demo_data: cli.seed_demo_data || base.seed_demo_data,
        ledger_timeout_secs: base.ledger_timeout_secs,
        ledger_max_retries: base.ledger_max_retries,
    };

    init_logging(LogFormat::parse(&config.log_format), &config.log_level);
    tracing::info!(
        "starting votechain node (RPC {}:{})",
        config.listen_addr,
        config.rpc_port
    );

    let node = Node::new(config)?;
    node.run(shutdown_signal()).await?;

    tracing::info!("votechain daemon exited cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for ctrl-c: {e}");
    }
}
