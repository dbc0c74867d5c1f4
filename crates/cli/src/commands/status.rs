//! `kubenap status`: show persisted cluster states.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use backends::{CommandRunner, Provider, ProviderKind};

use crate::config::{resolve_state_dir, StatePaths};
use crate::state::ClusterState;
use crate::ui;

/// Show paused clusters and their state records.
#[derive(Args)]
pub struct StatusCommand {
    /// Cluster name; omit to list every record.
    name: Option<String>,

    /// Provider (narrows the record lookup for a named cluster).
    #[arg(short, long)]
    provider: Option<ProviderKind>,

    /// Directory for state files (defaults to ~/.kube/cluster-states).
    #[arg(long, value_name = "DIR")]
    state_dir: Option<PathBuf>,
}

impl StatusCommand {
    pub async fn run(&self) -> Result<()> {
        let paths = StatePaths::new(resolve_state_dir(self.state_dir.as_deref())?);

        match &self.name {
            Some(name) => self.show_one(&paths, name).await,
            None => Self::list_all(&paths),
        }
    }

    fn list_all(paths: &StatePaths) -> Result<()> {
        let states = ClusterState::list(paths)?;
        if states.is_empty() {
            ui::print_info(&format!(
                "No paused clusters recorded in {}",
                paths.dir().display()
            ));
            return Ok(());
        }

        ui::print_section("Paused clusters");
        for (_, state) in states {
            ui::print_list_item(&format!(
                "{} ({}) - paused {}",
                state.cluster_name,
                state.provider,
                state.paused_age()
            ));
        }
        Ok(())
    }

    async fn show_one(&self, paths: &StatePaths, name: &str) -> Result<()> {
        let path = ClusterState::find(paths, name, self.provider, None)?;
        let state = ClusterState::load(&path)?;

        ui::print_section(&format!("Cluster '{}'", state.cluster_name));
        ui::print_kv("Provider", &state.provider.to_string());
        ui::print_kv(
            "Paused",
            &format!("{} ({})", state.paused_at, state.paused_age()),
        );
        ui::print_kv("State file", &path.display().to_string());

        match &state.workloads_backup_dir {
            Some(dir) if dir.is_dir() => ui::print_kv("Backup", &dir.display().to_string()),
            Some(dir) => ui::print_kv("Backup", &format!("{} (missing)", dir.display())),
            None => ui::print_kv("Backup", "none"),
        }
        match &state.snapshot {
            Some(snap) => ui::print_kv(
                "Snapshot",
                &format!("{} at {}", snap.kind, snap.location.display()),
            ),
            None => ui::print_kv("Snapshot", "none"),
        }
        if let Some(kc) = &state.kubeconfig_path {
            ui::print_kv("Kubeconfig", &kc.display().to_string());
        }
        if !state.drained_nodes.is_empty() {
            ui::print_kv("Drained nodes", &state.drained_nodes.join(", "));
        }

        // Live provider view, when the vendor CLI is around to ask.
        let provider = backends::provider_for(state.provider, CommandRunner::default());
        if provider.is_available() {
            match provider.is_running(&state.cluster_name).await {
                Ok(true) => ui::print_warning(
                    "Cluster is currently RUNNING despite the pause record",
                ),
                Ok(false) => ui::print_kv("Compute", "stopped"),
                Err(e) => ui::print_kv("Compute", &format!("unknown ({e})")),
            }
        }

        Ok(())
    }
}
