//! `kubenap restart`: stop and start without persisting state.

use anyhow::{Context, Result};
use clap::Args;

use backends::{CommandRunner, Provider, ProviderKind};

use crate::outcome::{report_warnings, Advisory};
use crate::ui;
use crate::validation::ClusterValidator;

/// Restart a cluster's compute layer.
#[derive(Args)]
pub struct RestartCommand {
    /// Cluster name.
    name: String,

    /// Provider backing the cluster (detected when omitted).
    #[arg(short, long)]
    provider: Option<ProviderKind>,

    /// Skip the post-restart health validation.
    #[arg(long)]
    no_validate: bool,

    /// Describe the vendor commands without executing anything.
    #[arg(long)]
    dry_run: bool,
}

impl RestartCommand {
    pub async fn run(&self) -> Result<()> {
        ui::print_section(&format!("Restarting cluster '{}'", self.name));

        let runner = CommandRunner::new(self.dry_run);
        let provider_kind = super::resolve_provider(runner, &self.name, self.provider).await?;
        let provider = backends::provider_for(provider_kind, runner);

        if !provider.exists(&self.name).await? {
            anyhow::bail!(
                "Cluster '{}' not found for provider {provider_kind}",
                self.name
            );
        }

        let mut warnings: Vec<Advisory> = Vec::new();

        if provider.is_running(&self.name).await? {
            ui::print_step("Stopping cluster compute");
            provider
                .stop(&self.name)
                .await
                .with_context(|| format!("Failed to stop cluster '{}'", self.name))?;
        } else {
            ui::print_warning("Cluster is already stopped, starting it");
        }

        ui::print_step("Starting cluster compute");
        provider
            .start(&self.name)
            .await
            .with_context(|| format!("Failed to start cluster '{}'", self.name))?;

        if !self.no_validate && !self.dry_run {
            ui::print_step("Validating cluster health");
            let context = provider.context_name(&self.name);
            match ClusterValidator::connect(&self.name, &context).await {
                Ok(validator) => {
                    let report = validator.validate(None).await;
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

        report_warnings(&warnings);
        ui::print_success(&format!("Cluster '{}' restarted", self.name));
        Ok(())
    }
}
