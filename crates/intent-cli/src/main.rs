//! # intentctl
//!
//! Inspect the governance sidecar of a workspace: the intent registry,
//! rendered intent context, ledger history, and the intent map. `check`
//! dry-runs the ignore list and scope stages for one path.

#![deny(unsafe_code)]

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use intent_settings::GovernanceSettings;

use crate::commands::Workspace;

/// Intent governance inspector.
#[derive(Parser, Debug)]
#[command(name = "intentctl", about = "Inspect intent governance state of a workspace")]
struct Cli {
    /// Workspace root (defaults to the current directory).
    #[arg(long, global = true)]
    workspace: Option<PathBuf>,

    /// Settings file (defaults to ~/.intent/settings.json).
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Log level when `RUST_LOG` is unset.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List intents in the registry.
    Intents,
    /// Print the context document for an intent.
    Context {
        /// Intent ID.
        id: String,
    },
    /// Print recent ledger entries for an intent as JSON lines.
    History {
        /// Intent ID.
        id: String,
        /// Maximum entries (defaults to `recentHistoryLimit`).
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print the intent map.
    Map,
    /// Report whether a path is writable under an intent.
    Check {
        /// Intent ID.
        id: String,
        /// Path relative to the workspace root.
        path: String,
    },
}

fn load_settings(path: Option<&PathBuf>) -> Result<GovernanceSettings> {
    let settings = match path {
        Some(path) => intent_settings::load_settings_from_path(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => intent_settings::load_settings().context("Failed to load settings")?,
    };
    settings.validate().context("Invalid settings")?;
    Ok(settings)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Cli::parse();
    intent_core::logging::init_subscriber(&args.log_level);

    let settings = load_settings(args.settings.as_ref())?;
    let root = match args.workspace {
        Some(root) => root,
        None => std::env::current_dir().context("Failed to resolve current directory")?,
    };
    tracing::debug!(root = %root.display(), sidecar = %settings.sidecar_dir, "intentctl starting");
    let workspace = Workspace::new(root, settings);

    let report = match args.command {
        Command::Intents => workspace.intents().await,
        Command::Context { id } => workspace.context(&id).await?,
        Command::History { id, limit } => workspace.history(&id, limit).await?,
        Command::Map => workspace.map().await,
        Command::Check { id, path } => workspace.check(&id, &path).await?,
    };

    print!("{}", report.output);
    Ok(if report.blocked {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
