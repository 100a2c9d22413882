#![forbid(unsafe_code)]

//! `repl-coordinator` — workspace REPL session driver binary.
//!
//! Bootstraps configuration and tracing, then runs one coordinator command:
//! environment check, run-in-session, restart, or clear.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, EnvFilter};

use repl_coordinator::{AppError, Coordinator, CoordinatorConfig, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "repl-coordinator", about = "Per-workspace GHCi session coordinator", version, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: CommandKind,
}

#[derive(Debug, Subcommand)]
enum CommandKind {
    /// Validate the workspace environment and report missing tools.
    Check {
        /// Workspace root directory.
        #[arg(long)]
        workspace: PathBuf,
        /// Emit the report as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Load a module and evaluate an expression in the workspace session.
    Run {
        /// Workspace root directory.
        #[arg(long)]
        workspace: PathBuf,
        /// Module path to load.
        #[arg(long)]
        module: String,
        /// Expression to evaluate after the load settles.
        #[arg(long)]
        expr: String,
    },
    /// Dispose and recreate the workspace session.
    Restart {
        /// Workspace root directory.
        #[arg(long)]
        workspace: PathBuf,
    },
    /// Clear the workspace session screen and reload its modules.
    Clear {
        /// Workspace root directory.
        #[arg(long)]
        workspace: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    let config = match &args.config {
        Some(path) => CoordinatorConfig::load_from_path(path)?,
        None => CoordinatorConfig::default(),
    };
    let coordinator = Coordinator::with_process_launcher(config);

    let outcome = dispatch(&coordinator, args.command).await;
    coordinator.shutdown().await;
    outcome
}

async fn dispatch(coordinator: &Coordinator, command: CommandKind) -> Result<()> {
    match command {
        CommandKind::Check { workspace, json } => {
            let workspace = resolve_workspace(&workspace)?;
            let valid = coordinator.ensure_environment(&workspace).await?;
            let missing = coordinator.missing_tools().await;

            if json {
                let report = serde_json::json!({
                    "valid": valid,
                    "missing": missing.iter().map(ToString::to_string).collect::<Vec<_>>(),
                });
                println!("{report}");
            } else if valid {
                println!("environment ok");
            } else {
                let names: Vec<String> = missing.iter().map(ToString::to_string).collect();
                println!("environment invalid; missing tools: {}", names.join(", "));
            }
            Ok(())
        }
        CommandKind::Run {
            workspace,
            module,
            expr,
        } => {
            let workspace = resolve_workspace(&workspace)?;
            coordinator.run_in_session(&workspace, &module, &expr).await
        }
        CommandKind::Restart { workspace } => {
            let workspace = resolve_workspace(&workspace)?;
            coordinator.restart_session(&workspace).await
        }
        CommandKind::Clear { workspace } => {
            let workspace = resolve_workspace(&workspace)?;
            coordinator.clear_session(&workspace).await
        }
    }
}

/// Resolve a CLI workspace argument to a real absolute path.
fn resolve_workspace(path: &Path) -> Result<PathBuf> {
    path.canonicalize()
        .map_err(|err| AppError::Workspace(format!("invalid workspace {}: {err}", path.display())))
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(env_filter);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
