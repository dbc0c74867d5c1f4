//! `kubenap apply`: apply a manifest tree in dependency order.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use backends::{ClusterSpec, CommandRunner, Provider, ProviderKind};

use crate::kubectl::Kubectl;
use crate::manifests;
use crate::outcome::report_warnings;
use crate::ui;
use crate::validator::PrerequisitesValidator;

/// Apply a manifest tree to a cluster.
#[derive(Args)]
pub struct ApplyCommand {
    /// Cluster name.
    name: String,

    /// Root directory containing per-kind manifest subdirectories.
    #[arg(short, long, value_name = "DIR")]
    manifest_dir: PathBuf,

    /// Provider backing the cluster (detected when omitted).
    #[arg(short, long)]
    provider: Option<ProviderKind>,

    /// Create the cluster first if it does not exist.
    #[arg(long)]
    create: bool,

    /// Node count when creating (with --create).
    #[arg(long, default_value_t = 1)]
    nodes: u8,

    /// Seconds to wait for deployments and statefulsets to roll out.
    #[arg(long, default_value_t = 300)]
    wait_timeout: u64,

    /// Describe the vendor commands without executing anything.
    #[arg(long)]
    dry_run: bool,
}

impl ApplyCommand {
    pub async fn run(&self) -> Result<()> {
        ui::print_section(&format!(
            "Applying manifests to cluster '{}'",
            self.name
        ));

        if !self.manifest_dir.is_dir() {
            anyhow::bail!(
                "Manifest directory not found: {}",
                self.manifest_dir.display()
            );
        }

        let runner = CommandRunner::new(self.dry_run);

        // With --create the provider must be named or default; detection
        // can't find a cluster that doesn't exist yet.
        let provider_kind = if self.create {
            self.provider.unwrap_or(ProviderKind::Minikube)
        } else {
            super::resolve_provider(runner, &self.name, self.provider).await?
        };
        let provider = backends::provider_for(provider_kind, runner);

        if !provider.exists(&self.name).await? {
            if !self.create {
                anyhow::bail!(
                    "Cluster '{}' not found for provider {provider_kind}. Use --create to create it.",
                    self.name
                );
            }

            ui::print_step("Checking prerequisites");
            PrerequisitesValidator::for_provider(provider_kind).validate()?;

            ui::print_step("Creating cluster");
            let spec = ClusterSpec {
                nodes: self.nodes.max(1),
                ..ClusterSpec::with_defaults(self.name.clone())
            };
            provider
                .create(&spec)
                .await
                .with_context(|| format!("Failed to create cluster '{}'", self.name))?;
        }

        let kubectl = Kubectl::new(runner, provider.context_name(&self.name));

        let outcome = manifests::apply_tree(&kubectl, &self.manifest_dir)?;
        if !outcome.skipped.is_empty() {
            ui::print_info(&format!(
                "Skipped absent directories: {}",
                outcome.skipped.join(", ")
            ));
        }
        ui::print_success(&format!(
            "Applied {} manifest director{}",
            outcome.applied.len(),
            if outcome.applied.len() == 1 { "y" } else { "ies" }
        ));

        // Rollout waits are best-effort; report but never fail on them.
        let warnings = if self.dry_run {
            Vec::new()
        } else {
            ui::print_step("Waiting for workloads to roll out");
            manifests::wait_for_workloads(&kubectl, Duration::from_secs(self.wait_timeout))
        };

        report_warnings(&warnings);
        ui::print_success(&format!("Manifests applied to '{}'", self.name));
        Ok(())
    }
}
