//! Command-line interface definition for Outpost
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for running the endpoint and checking configuration.

use clap::{Parser, Subcommand};

/// Outpost - dial-out MCP endpoint
///
/// Connects out to a remote control plane over WebSocket and answers
/// JSON-RPC tool calls against locally registered tools.
#[derive(Parser, Debug, Clone)]
#[command(name = "outpost")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "OUTPOST_CONFIG", default_value = "config/outpost.yaml")]
    pub config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Outpost
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Connect to the configured server and serve tool calls until
    /// interrupted
    Run,

    /// Load and validate the configuration, then exit
    Check,
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
