//! kubenap CLI.
//!
//! Lifecycle manager for local Kubernetes clusters (minikube, kind, k3d):
//! create clusters, pause them to reclaim resources, resume them with
//! workload restoration, and apply manifest trees in dependency order.

// Allow product names without backticks in doc comments
#![allow(clippy::doc_markdown)]
// Allow async functions that don't use await (may need await in future)
#![allow(clippy::unused_async)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod backup;
mod commands;
mod config;
mod drain;
mod kubeconfig;
mod kubectl;
mod manifests;
mod outcome;
mod state;
mod ui;
mod validation;
mod validator;

use commands::apply::ApplyCommand;
use commands::create::CreateCommand;
use commands::pause::PauseCommand;
use commands::restart::RestartCommand;
use commands::resume::ResumeCommand;
use commands::status::StatusCommand;

/// kubenap - local Kubernetes cluster lifecycle manager.
#[derive(Parser)]
#[command(
    name = "kubenap",
    version,
    about = "Pause, resume, and manage local Kubernetes clusters",
    long_about = "Manage the lifecycle of local Kubernetes clusters backed by\n\
                  minikube, kind, or k3d.\n\n\
                  Pausing a cluster drains its nodes, backs up its workloads,\n\
                  records a state file, and stops the underlying compute so it\n\
                  can be brought back later exactly as it was left."
)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new local cluster.
    Create(CreateCommand),

    /// Pause a cluster: drain, back up workloads, and stop its compute.
    Pause(PauseCommand),

    /// Resume a paused cluster from its state file.
    Resume(ResumeCommand),

    /// Stop and start a cluster without persisting state.
    Restart(RestartCommand),

    /// Apply a manifest tree to a cluster in dependency order.
    Apply(ApplyCommand),

    /// Show persisted cluster states.
    Status(StatusCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        EnvFilter::new("info,backends=debug,kubenap_cli=debug,kubenap=debug")
    } else {
        EnvFilter::new("warn,backends=info,kubenap_cli=info,kubenap=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Create(cmd) => cmd.run().await,
        Commands::Pause(cmd) => cmd.run().await,
        Commands::Resume(cmd) => cmd.run().await,
        Commands::Restart(cmd) => cmd.run().await,
        Commands::Apply(cmd) => cmd.run().await,
        Commands::Status(cmd) => cmd.run().await,
    }
}
