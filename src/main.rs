//! Coach Gateway - HTTP gateway for the AI fitness coach agent orchestrator
//!
//! This is the main entry point for the coach-gateway binary. The gateway
//! serves the chat, readiness, and plan-generation endpoints, resolves
//! persona configurations, and forwards enriched requests to the external
//! agent orchestrator.

use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};

use coach_gateway::cli::{Cli, Commands, ConfigSubcommand, PersonaSubcommand};
use coach_gateway::config::{self, GatewayConfig};
use coach_gateway::error::{Error, Result};
use coach_gateway::logging;
use coach_gateway::orchestrator::{
    MockOrchestrator, RemoteOrchestrator, RemoteOrchestratorConfig, SharedOrchestrator,
};
use coach_gateway::persona::{PersonaId, PersonaRegistry};
use coach_gateway::server::{self, AppState};
use coach_gateway::version;

fn main() -> Result<()> {
    // Parse CLI arguments first (before logging, so we know verbosity)
    let cli = Cli::parse();

    // For commands that don't need full logging, use simple setup
    match &cli.command {
        Commands::Version => {
            version::print_version();
            return Ok(());
        }
        Commands::Config { subcommand } => {
            logging::init_simple(tracing::Level::WARN)?;
            return handle_config_command(subcommand.clone());
        }
        Commands::Persona { subcommand } => {
            logging::init_simple(tracing::Level::WARN)?;
            return handle_persona_command(subcommand.clone());
        }
        Commands::Run { .. } => {}
    }

    // Load configuration for the run command
    let config_path = match &cli.command {
        Commands::Run { config } => config.clone(),
        _ => None,
    };

    // Load config (or use defaults)
    let config = match GatewayConfig::load(config_path.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            // Use formatted error for terminal
            eprint!("{}", e.format_for_terminal());
            std::process::exit(e.exit_code());
        }
    };

    // Initialize logging with config settings
    // The guards must be kept alive for the lifetime of the program
    let _log_guards = logging::init_logging(&config.logging, cli.verbose, cli.quiet)?;

    // Log version info at startup
    let build = version::build_info();
    info!(
        version = %build.full_version(),
        target = %build.target,
        profile = %build.profile,
        "Starting coach gateway"
    );

    run_gateway(config)
}

/// Run the gateway in normal operation mode
fn run_gateway(config: GatewayConfig) -> Result<()> {
    info!(
        addr = %config.bind_addr(),
        orchestrator_enabled = config.orchestrator.enabled,
        default_persona = %config.personas.default_persona,
        "Configuration loaded"
    );

    // Build and run the tokio runtime
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(num_cpus::get().min(8))
        .thread_name("coach-gateway")
        .build()
        .map_err(|e| Error::Internal(format!("Failed to create async runtime: {}", e)))?;

    runtime.block_on(async_gateway_main(config))
}

/// Async gateway main: build state, then serve until shutdown
async fn async_gateway_main(config: GatewayConfig) -> Result<()> {
    // One-time persona registry initialization; read-only afterwards
    let registry = PersonaRegistry::bundled_with_default(config.default_persona())?;
    info!(
        personas = registry.count(),
        default = %registry.default_id(),
        "Persona registry initialized"
    );

    // Select the orchestrator implementation
    let orchestrator: SharedOrchestrator = if config.orchestrator.enabled {
        Arc::new(RemoteOrchestrator::new(RemoteOrchestratorConfig {
            base_url: config.orchestrator.base_url.clone(),
            api_key: config.orchestrator.api_key.clone(),
            timeout_secs: config.orchestrator.timeout_secs,
        })?)
    } else {
        warn!("Orchestrator disabled in config, serving with the deterministic mock");
        Arc::new(MockOrchestrator::new())
    };
    info!(orchestrator = orchestrator.name(), "Orchestrator client ready");

    let state = Arc::new(AppState::new(
        config.service.name.clone(),
        registry,
        orchestrator,
    ));

    server::run(&config, state).await
}

/// Handle configuration subcommands
fn handle_config_command(subcommand: ConfigSubcommand) -> Result<()> {
    match subcommand {
        ConfigSubcommand::Show { config } => {
            let cfg = GatewayConfig::load(config.as_deref())?;
            println!("{}", toml::to_string_pretty(&cfg)?);
        }
        ConfigSubcommand::Init { path, force } => {
            config::init_config(path.as_deref(), force)?;
        }
        ConfigSubcommand::Validate { config } => {
            let path = config.as_deref();
            match GatewayConfig::load(path) {
                Ok(_) => {
                    println!("Configuration is valid.");
                }
                Err(e) => {
                    eprint!("{}", e.format_for_terminal());
                    std::process::exit(e.exit_code());
                }
            }
        }
    }

    Ok(())
}

/// Handle persona subcommands
fn handle_persona_command(subcommand: PersonaSubcommand) -> Result<()> {
    let registry = PersonaRegistry::bundled()?;

    match subcommand {
        PersonaSubcommand::List => {
            println!("{:<14} {:<18} {:<9} DEFAULT", "ID", "NAME", "COLOR");
            for config in registry.all() {
                let default_marker = if config.id == registry.default_id() {
                    "*"
                } else {
                    ""
                };
                println!(
                    "{:<14} {:<18} {:<9} {}",
                    config.id.slug(),
                    config.display_name,
                    config.accent_color,
                    default_marker
                );
            }
        }
        PersonaSubcommand::Show { persona } => {
            let id: PersonaId = persona.parse().map_err(|reason: String| {
                Error::InvalidField {
                    field: "persona",
                    reason,
                }
            })?;
            let config = registry.get(id);

            println!("Persona: {} ({})", config.display_name, config.id);
            println!("  Tone:               {}", config.tone);
            println!("  Motivation style:   {}", config.motivation_style);
            println!("  Sentence structure: {}", config.sentence_structure);
            println!("  Response length:    {}", config.response_length);
            println!("  Emoji usage:        {}", config.emoji_usage);
            println!("  Accent color:       {}", config.accent_color);
            println!("  Avatar:             {}", config.avatar_url);
            println!("  Vocabulary:         {}", config.vocabulary.join(", "));
            println!("  Avoid:              {}", config.avoid_phrases.join(", "));
            println!();
            println!("System prompt addon:");
            for line in config.system_prompt_addon.lines() {
                println!("  {}", line);
            }
        }
    }

    Ok(())
}
