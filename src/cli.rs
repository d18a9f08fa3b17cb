//! CLI argument parsing using clap v4
//!
//! Defines the command-line interface for the coach gateway.

use clap::{Parser, Subcommand};

/// Coach Gateway - HTTP gateway for the AI fitness coach agent orchestrator
///
/// Serves the chat, readiness, and plan-generation endpoints, resolving
/// persona configurations and delegating the reasoning to the orchestrator.
#[derive(Parser, Debug)]
#[command(name = "coach-gateway")]
#[command(author, version, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for the gateway
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the gateway (serves HTTP and delegates to the orchestrator)
    Run {
        /// Path to configuration file
        #[arg(short, long, env = "COACH_CONFIG")]
        config: Option<String>,
    },

    /// Display version and build information
    Version,

    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Persona inspection (bundled coaching personas)
    Persona {
        #[command(subcommand)]
        subcommand: PersonaSubcommand,
    },
}

/// Persona subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum PersonaSubcommand {
    /// List the bundled personas
    List,

    /// Show one persona's full configuration
    Show {
        /// Persona id: calm, motivational, gentle, concise
        persona: String,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigSubcommand {
    /// Display the current configuration
    Show {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Initialize a new configuration file
    Init {
        /// Path where to create the config file
        #[arg(short, long)]
        path: Option<String>,

        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Validate a configuration file
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        config: Option<String>,
    },
}
