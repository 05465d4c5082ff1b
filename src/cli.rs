use crate::commands::{config, execution, request, whoami};
use crate::config::Config;
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "st2")]
#[command(about = "Client for the StackStorm execution API")]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to ~/.st2/config)
    #[arg(long, global = true, env = "ST2_CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Skip TLS certificate verification
    #[arg(long, global = true)]
    pub insecure: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// GET an API path
    Get(request::RequestArgs),
    /// POST a JSON body to an API path
    Post(request::BodyRequestArgs),
    /// PUT a JSON body to an API path
    Put(request::BodyRequestArgs),
    /// DELETE an API path
    Delete(request::RequestArgs),
    /// Inspect and wait for executions
    Execution {
        #[command(subcommand)]
        action: ExecutionCommands,
    },
    /// Check that the configured credentials authenticate
    Whoami,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ExecutionCommands {
    /// Show the status of an execution
    Status {
        /// Execution ID
        id: String,
    },
    /// Show the result of an execution
    Result {
        /// Execution ID
        id: String,
    },
    /// Wait until an execution finishes
    Wait(execution::WaitArgs),
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Get configuration value
    Get {
        /// Section name
        section: String,
        /// Key name
        key: String,
    },
    /// Set configuration value
    Set {
        /// Section name
        section: String,
        /// Key name
        key: String,
        /// Value to set
        value: String,
    },
    /// Remove configuration value
    Unset {
        /// Section name
        section: String,
        /// Key name
        key: String,
    },
    /// Show configuration file path
    Path,
}

/// Run a parsed command line. `Ok(false)` means the command ran but did not
/// succeed (e.g. a waited-on execution failed).
pub async fn run_cli(cli: Cli) -> anyhow::Result<bool> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::new(),
    }
    .context("failed to load configuration")?;

    // --insecure applies to this run only and is never saved
    let mut effective = config.clone();
    if cli.insecure {
        effective.set_verify(false)?;
    }

    let success = match cli.command {
        Commands::Get(args) => request::handle_get(args, &effective).await?,
        Commands::Post(args) => request::handle_post(args, &effective).await?,
        Commands::Put(args) => request::handle_put(args, &effective).await?,
        Commands::Delete(args) => request::handle_delete(args, &effective).await?,
        Commands::Execution { action } => execution::handle(action, &effective).await?,
        Commands::Whoami => whoami::handle(&effective).await?,
        Commands::Config { action } => config::handle(action, &mut config)
            .with_context(|| format!("config file {}", config.path().display()))?,
    };

    Ok(success)
}
