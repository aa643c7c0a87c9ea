// hearth-gate-server/src/bin/hearth-gate.rs
// ============================================================================
// Module: Gateway Binary
// Description: Command-line entry point for the configuration gateway.
// Purpose: Load configuration and serve the configured transport.
// Dependencies: hearth-gate-server, hearth-gate-config, clap, tokio
// ============================================================================

//! Command-line entry point for the Hearth Gate server.

use std::path::PathBuf;

use clap::Parser;
use hearth_gate_config::HearthGateConfig;
use hearth_gate_server::GatewayServer;
use hearth_gate_server::GatewayServerError;

/// Capability-gated configuration gateway.
#[derive(Debug, Parser)]
#[command(name = "hearth-gate", version, about)]
struct Cli {
    /// Path to the configuration file.
    ///
    /// Falls back to `HEARTH_GATE_CONFIG`, then `hearth-gate.toml`.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), GatewayServerError> {
    let cli = Cli::parse();
    let config = HearthGateConfig::load(cli.config.as_deref())
        .map_err(|err| GatewayServerError::Config(err.to_string()))?;
    let server = GatewayServer::from_config(config)?;
    server.serve().await
}
