//! qmcp server binary.
//!
//! Speaks MCP on stdin/stdout; logs go to stderr.
//!
//! # Configuration (environment variables)
//!
//! - `QMCP_SERVER_NAME`: Name reported on `initialize` (default `qmcp`)
//! - `QMCP_MAX_QUBITS`: Widest circuit the simulator accepts (default 20)
//! - `QMCP_MAX_SHOTS`: Upper bound for `shots` (default 1000000)
//! - `QMCP_DEFAULT_SHOTS`: Shots when none are given (default 1000)
//! - `QMCP_SEED`: Fixed sampling seed
//! - `QMCP_MAX_ANSATZ_QUBITS`: Widest variational ansatz (default 256)
//! - `QMCP_MAX_ANSATZ_LAYERS`: Most ansatz repetitions (default 100)
//! - `QMCP_LOG_LEVEL`: Tracing filter (default `info`)
//! - `QMCP_LOG_FORMAT`: `console` or `json`

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use qmcp_server::{Config, McpServer, TracingConfig, TracingFormat, init_tracing};

/// MCP tool server for building, simulating and analyzing quantum circuits
#[derive(Parser)]
#[command(name = "qmcp-server")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, env = "QMCP_CONFIG")]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log format (console or json)
    #[arg(long)]
    log_format: Option<String>,

    /// Fixed sampling seed
    #[arg(long)]
    seed: Option<u64>,

    /// Widest circuit the simulator accepts
    #[arg(long)]
    max_qubits: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }
    if let Some(seed) = cli.seed {
        config.simulator.seed = Some(seed);
    }
    if let Some(max_qubits) = cli.max_qubits {
        config.simulator.max_qubits = max_qubits;
    }
    config.validate().context("invalid configuration")?;

    init_tracing(TracingConfig::new(
        config.logging.level.clone(),
        TracingFormat::from_name(&config.logging.format),
        cli.verbose,
    ))
    .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    tracing::info!(
        name = %config.server.name,
        max_qubits = config.simulator.max_qubits,
        max_shots = config.simulator.max_shots,
        seed = ?config.simulator.seed,
        "configuration loaded"
    );

    let server = Arc::new(McpServer::from_config(&config));
    server.run_stdio().await.context("stdio transport failed")?;

    Ok(())
}
