//! `kubenap resume`: restart compute, restore workloads, validate.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use backends::{CommandRunner, Provider, ProviderKind};

use crate::backup;
use crate::config::{resolve_state_dir, StatePaths};
use crate::kubeconfig;
use crate::kubectl::Kubectl;
use crate::outcome::{report_warnings, Advisory};
use crate::state::ClusterState;
use crate::ui;
use crate::validation::ClusterValidator;

/// Resume a paused cluster.
#[derive(Args)]
pub struct ResumeCommand {
    /// Cluster name.
    name: String,

    /// Provider backing the cluster (used to locate the state file).
    #[arg(short, long)]
    provider: Option<ProviderKind>,

    /// Explicit state file path, bypassing the search.
    #[arg(long, value_name = "FILE")]
    state_file: Option<PathBuf>,

    /// Re-apply the workload backup after the cluster is up.
    #[arg(long)]
    restore_workloads: bool,

    /// Skip the post-resume health validation.
    #[arg(long)]
    no_validate: bool,

    /// Remove the state file and resume script after a successful resume.
    #[arg(long)]
    cleanup: bool,

    /// Directory for state files (defaults to ~/.kube/cluster-states).
    #[arg(long, value_name = "DIR")]
    state_dir: Option<PathBuf>,

    /// Describe the vendor commands without executing anything.
    #[arg(long)]
    dry_run: bool,
}

impl ResumeCommand {
    #[allow(clippy::too_many_lines)]
    pub async fn run(&self) -> Result<()> {
        ui::print_section(&format!("Resuming cluster '{}'", self.name));

        let paths = StatePaths::new(resolve_state_dir(self.state_dir.as_deref())?);
        let state_path = ClusterState::find(
            &paths,
            &self.name,
            self.provider,
            self.state_file.as_deref(),
        )?;
        let state = ClusterState::load(&state_path)?;

        ui::print_kv("Cluster", &state.cluster_name);
        ui::print_kv("Provider", &state.provider.to_string());
        ui::print_kv(
            "Paused",
            &format!("{} ({})", state.paused_at, state.paused_age()),
        );

        let runner = CommandRunner::new(self.dry_run);
        let provider = backends::provider_for(state.provider, runner);
        let mut warnings: Vec<Advisory> = Vec::new();

        // 1. Start compute (fatal). Everything after this point is
        // best-effort: once the compute layer is back the resume has done
        // its job, and the rest must not change the exit code.
        ui::print_step("Starting cluster compute");
        provider
            .start(&state.cluster_name)
            .await
            .with_context(|| format!("Failed to start cluster '{}'", state.cluster_name))?;

        let context = provider.context_name(&state.cluster_name);
        let kubectl = Kubectl::new(runner, context.clone());

        // 2. Kubeconfig restore (advisory)
        if let Some(snapshot) = &state.kubeconfig_path {
            if self.dry_run {
                ui::print_info(&format!(
                    "[dry-run] would merge kubeconfig snapshot {}",
                    snapshot.display()
                ));
            } else if snapshot.exists() {
                match kubeconfig::merge_into_default(snapshot, &context) {
                    Ok(_) => ui::print_info(&format!("Restored kubeconfig context '{context}'")),
                    Err(e) => warnings.push(Advisory::new("kubeconfig", e.to_string())),
                }
            } else {
                warnings.push(Advisory::new(
                    "kubeconfig",
                    format!("snapshot missing: {}", snapshot.display()),
                ));
            }
        }

        // 3. Uncordon previously drained nodes (advisory)
        for node in &state.drained_nodes {
            if let Err(e) = kubectl.uncordon(node) {
                warnings.push(Advisory::new("uncordon", format!("{node}: {e}")));
            }
        }

        // 4. Workload restore (advisory)
        let mut restored = false;
        if self.restore_workloads {
            match &state.workloads_backup_dir {
                Some(dir) if dir.is_dir() => {
                    ui::print_step("Restoring workloads");
                    let outcome = backup::restore(&kubectl, dir);
                    warnings.extend(outcome.warnings);
                    restored = !outcome.applied.is_empty();
                }
                Some(dir) => warnings.push(Advisory::new(
                    "restore",
                    format!("backup directory missing: {}", dir.display()),
                )),
                None => warnings.push(Advisory::new(
                    "restore",
                    "state has no workload backup to restore",
                )),
            }
        }

        // 5. Validation (advisory, skipped in dry-run: there is no live
        // cluster state worth checking)
        if !self.no_validate && !self.dry_run {
            ui::print_step("Validating cluster health");
            let expectations = if restored {
                state
                    .workloads_backup_dir
                    .as_deref()
                    .and_then(|dir| backup::expected_deployments(dir).ok())
            } else {
                None
            };

            match ClusterValidator::connect(&state.cluster_name, &context).await {
                Ok(validator) => {
                    let report = validator.validate(expectations.as_deref()).await;
                    report.print_summary();
                    if !report.all_passed() {
                        warnings.push(Advisory::new(
                            "validate",
                            format!("{} check(s) failed", report.failed_count()),
                        ));
                    }
                }
                Err(e) => warnings.push(Advisory::new("validate", e.to_string())),
            }
        }

        // 6. Opt-in cleanup of pause artifacts
        if self.cleanup && !self.dry_run {
            for path in [&state_path, &paths.resume_script(&state.cluster_name)] {
                if path.exists() {
                    if let Err(e) = std::fs::remove_file(path) {
                        warnings.push(Advisory::new("cleanup", format!("{}: {e}", path.display())));
                    }
                }
            }
            ui::print_info("Removed state file and resume script (backup kept)");
        }

        report_warnings(&warnings);
        ui::print_success(&format!("Cluster '{}' resumed", state.cluster_name));
        Ok(())
    }
}
