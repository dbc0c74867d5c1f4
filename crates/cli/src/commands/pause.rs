//! `kubenap pause`: drain, back up, record state, stop compute.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use backends::{CommandRunner, Provider, ProviderKind};

use crate::backup;
use crate::config::{resolve_state_dir, StatePaths};
use crate::drain;
use crate::kubeconfig;
use crate::kubectl::Kubectl;
use crate::outcome::{report_warnings, Advisory};
use crate::state::{write_resume_script, ClusterState};
use crate::ui;

/// Pause a local cluster.
#[derive(Args)]
pub struct PauseCommand {
    /// Cluster name.
    name: String,

    /// Provider backing the cluster (detected when omitted).
    #[arg(short, long)]
    provider: Option<ProviderKind>,

    /// Skip draining nodes before stopping.
    #[arg(long)]
    no_drain: bool,

    /// Skip the workload YAML backup.
    #[arg(long)]
    no_backup: bool,

    /// Take a provider-level snapshot as well.
    #[arg(long)]
    snapshot: bool,

    /// Directory for state files (defaults to ~/.kube/cluster-states).
    #[arg(long, value_name = "DIR")]
    state_dir: Option<PathBuf>,

    /// Describe the vendor commands without executing anything.
    #[arg(long)]
    dry_run: bool,
}

impl PauseCommand {
    pub async fn run(&self) -> Result<()> {
        ui::print_section(&format!("Pausing cluster '{}'", self.name));

        let runner = CommandRunner::new(self.dry_run);
        let provider_kind = super::resolve_provider(runner, &self.name, self.provider).await?;
        let provider = backends::provider_for(provider_kind, runner);

        // Existence and running-state are hard requirements; everything the
        // pause does afterwards assumes a live API to talk to.
        if !provider.exists(&self.name).await? {
            anyhow::bail!(
                "Cluster '{}' not found for provider {provider_kind}",
                self.name
            );
        }
        if !provider.is_running(&self.name).await? {
            anyhow::bail!(
                "Cluster '{}' ({provider_kind}) is not running; nothing to pause",
                self.name
            );
        }

        let paths = StatePaths::new(resolve_state_dir(self.state_dir.as_deref())?);
        let kubectl = Kubectl::new(runner, provider.context_name(&self.name));
        let mut warnings: Vec<Advisory> = Vec::new();

        // 1. Drain (advisory)
        let drained_nodes = if self.no_drain {
            ui::print_info("Skipping node drain (--no-drain)");
            Vec::new()
        } else {
            ui::print_step("Draining nodes");
            let outcome = drain::drain_all(&kubectl);
            warnings.extend(outcome.warnings);
            outcome.drained
        };

        // 2. Workload backup (advisory)
        let backup_dir = if self.no_backup {
            ui::print_info("Skipping workload backup (--no-backup)");
            None
        } else if self.dry_run {
            ui::print_info(&format!(
                "[dry-run] would back up workloads to {}",
                paths.backup_dir(&self.name).display()
            ));
            None
        } else {
            ui::print_step("Backing up workloads");
            let dir = paths.backup_dir(&self.name);
            match backup::dump(&kubectl, &dir) {
                Ok(outcome) => {
                    warnings.extend(outcome.warnings);
                    if outcome.dumped.is_empty() {
                        warnings.push(Advisory::new("backup", "no resources were dumped"));
                        None
                    } else {
                        ui::print_success(&format!(
                            "Backed up {} resource kinds to {}",
                            outcome.dumped.len(),
                            dir.display()
                        ));
                        Some(dir)
                    }
                }
                Err(e) => {
                    warnings.push(Advisory::new("backup", e.to_string()));
                    None
                }
            }
        };

        // 3. Provider snapshot (advisory)
        let snapshot = if self.snapshot {
            ui::print_step("Taking provider snapshot");
            match provider
                .snapshot(&self.name, &paths.snapshot_dir(&self.name))
                .await
            {
                Ok(Some(info)) => {
                    ui::print_success(&format!("Snapshot taken ({})", info.kind));
                    Some(info)
                }
                Ok(None) => {
                    ui::print_info("Provider has no snapshot mechanism for this cluster");
                    None
                }
                Err(e) => {
                    warnings.push(Advisory::new("snapshot", e.to_string()));
                    None
                }
            }
        } else {
            None
        };

        // 4. Kubeconfig snapshot (advisory)
        let kubeconfig_path = if self.dry_run {
            None
        } else {
            match kubeconfig::snapshot(
                provider.as_ref(),
                &self.name,
                &paths.kubeconfig_snapshot(&self.name),
            )
            .await
            {
                Ok(path) => Some(path),
                Err(e) => {
                    warnings.push(Advisory::new("kubeconfig", e.to_string()));
                    None
                }
            }
        };

        // 5. State record (fatal: without it the cluster can't be resumed,
        // so stopping the compute would strand it)
        let record = match provider.cluster_record(&self.name).await {
            Ok(record) => record,
            Err(e) => {
                warnings.push(Advisory::new("record", e.to_string()));
                serde_json::Value::Null
            }
        };

        let mut state = ClusterState::new(self.name.clone(), provider_kind, record);
        state.kubeconfig_saved = kubeconfig_path.is_some();
        state.kubeconfig_path = kubeconfig_path;
        state.workloads_backup_dir = backup_dir;
        state.snapshot = snapshot;
        state.drained_nodes = drained_nodes;

        let state_file = paths.state_file(&self.name, provider_kind);
        if self.dry_run {
            ui::print_info(&format!(
                "[dry-run] would write state file {}",
                state_file.display()
            ));
        } else {
            state
                .save(&state_file)
                .context("Failed to persist cluster state; aborting before stopping compute")?;
            ui::print_success(&format!("State saved to {}", state_file.display()));
        }

        // 6. Stop compute (fatal)
        ui::print_step("Stopping cluster compute");
        provider
            .stop(&self.name)
            .await
            .with_context(|| format!("Failed to stop cluster '{}'", self.name))?;

        // 7. Resume script (advisory)
        if !self.dry_run {
            match write_resume_script(&paths, &self.name, provider_kind) {
                Ok(path) => ui::print_info(&format!("Resume script: {}", path.display())),
                Err(e) => warnings.push(Advisory::new("resume-script", e.to_string())),
            }
        }

        report_warnings(&warnings);
        ui::print_success(&format!(
            "Cluster '{}' paused. Resume with: kubenap resume {}",
            self.name, self.name
        ));
        Ok(())
    }
}
