//! Outpost - dial-out MCP endpoint
//!
#![doc = "Outpost - dial-out MCP endpoint"]
#![doc = "Main entry point for the Outpost binary."]

use std::sync::Arc;

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use outpost::cli::{Cli, Commands};
use outpost::config::EndpointConfig;
use outpost::mcp::supervisor::McpEndpoint;
use outpost::tools::{echo::EchoTool, ToolRegistry};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load and validate configuration
    let config = EndpointConfig::load(&cli.config)?;
    config.validate()?;

    match cli.command {
        Commands::Check => {
            println!("configuration ok: {}", cli.config);
            Ok(())
        }
        Commands::Run => {
            tracing::info!("starting endpoint");

            let registry = ToolRegistry::builder()
                .with_tool(Arc::new(EchoTool::new()))
                .build()?;

            let endpoint = McpEndpoint::start(config, registry)?;

            // Serve until interrupted.
            tokio::signal::ctrl_c().await?;
            tracing::info!("shutdown requested");
            endpoint.shutdown().await;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "outpost=debug" } else { "outpost=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
