//! Saurus - bot bootstrap CLI
//!
//! Command-line entry point. This is the only place that turns a boot
//! failure into a process exit.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use saurus_core::{
    mask_token, BootConfig, BootContext, BootError, BootOrchestrator, TelegramRuntime,
    TerminalConsole, DEFAULT_CONFIG_FILE, EXIT_FAILURE,
};

#[derive(Parser)]
#[command(name = "saurus")]
#[command(version = "0.4.2")]
#[command(about = "Saurus bot bootstrap", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify operator access and bot token, then start the bot
    Boot {
        /// Bootstrap config file
        #[arg(long, short, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,
        /// Exit after a successful boot instead of serving commands
        #[arg(long)]
        no_serve: bool,
    },
    /// Print the masked form of a token
    Mask {
        /// Token to mask (e.g., 123456:ABC-DEF)
        token: String,
    },
    /// Manage the bootstrap config (check, init)
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Load and validate a config file
    Check {
        #[arg(long, short, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,
    },
    /// Write a config file with default settings
    Init {
        /// Destination path
        #[arg(default_value = DEFAULT_CONFIG_FILE)]
        path: PathBuf,
        /// Bot token (also checked against the remote allow-list)
        #[arg(long)]
        token: String,
        /// Bot name
        #[arg(long, default_value = "saurus-bot")]
        name: String,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { LevelFilter::DEBUG } else { LevelFilter::WARN };
    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

async fn handle_boot(config_path: &Path, no_serve: bool) -> anyhow::Result<()> {
    let config = BootConfig::load(config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;

    let runtime = TelegramRuntime::new(
        &config.spec.telegram.api_base,
        &config.spec.token,
        config.request_timeout(),
        config.spec.telegram.poll_timeout_secs,
    )?;
    let ctx = BootContext::from_config(config)?;

    let mut console = TerminalConsole::new();
    let booted = BootOrchestrator::new(ctx, &mut console).run(runtime).await?;

    if no_serve {
        return Ok(());
    }

    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();

    // Set up SIGTERM/SIGINT handler
    ctrlc::set_handler(move || {
        eprintln!("[Saurus] Received SIGTERM/SIGINT, shutting down after the current poll...");
        shutdown_clone.store(true, Ordering::SeqCst);
    })?;

    booted
        .runtime
        .serve(&booted.plugins, &booted.roles, shutdown)
        .await?;

    eprintln!("[Saurus] Shutdown complete");
    Ok(())
}

fn handle_config_check(config_path: &Path) -> anyhow::Result<()> {
    let config = BootConfig::load(config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;
    let locator = config.store_locator();
    let store = &config.spec.store;

    println!("\n✓ Config is valid: {}", config_path.display());
    println!("  Name:           {}", config.metadata.name);
    println!("  Owner:          {}", config.metadata.owner);
    println!("  Token:          {}", mask_token(&config.spec.token));
    println!("  Auth resource:  {}", locator.resource_url(&store.auth_resource));
    println!("  Token resource: {}", locator.resource_url(&store.token_resource));
    println!("  Timeout:        {}s", config.spec.request_timeout_secs);
    println!("  Plugins:        {}", config.spec.plugins.dir.display());
    println!("  Roles:          {}\n", config.spec.roles.file.display());

    Ok(())
}

fn handle_config_init(path: &Path, name: String, token: String, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    let config = BootConfig::new(name, token);
    config.validate()?;
    config.save(path)?;

    println!("\n✓ Config written to {}", path.display());
    println!("  Token: {}", mask_token(&config.spec.token));
    println!("\nStart the bot with: saurus boot --config {}", path.display());
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Boot { config, no_serve } => handle_boot(&config, no_serve).await?,
        Commands::Mask { token } => println!("{}", mask_token(&token)),
        Commands::Config { command } => match command {
            ConfigCommands::Check { config } => handle_config_check(&config)?,
            ConfigCommands::Init { path, token, name, force } => {
                handle_config_init(&path, name, token, force)?
            }
        },
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        let boot_err = err.downcast_ref::<BootError>();
        let label = match boot_err {
            Some(boot_err) if boot_err.is_authorization_failure() => "🚫 ACCESS REFUSED:",
            _ => "❌ FATAL ERROR:",
        };
        eprintln!("{} {:#}", label.red(), err);
        std::process::exit(boot_err.map(BootError::exit_code).unwrap_or(EXIT_FAILURE));
    }
}
