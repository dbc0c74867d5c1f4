//! `kubenap create`: create a new local cluster.

use anyhow::{Context, Result};
use clap::Args;
use dialoguer::{theme::ColorfulTheme, Confirm};

use backends::{ClusterSpec, CommandRunner, Provider, ProviderKind};

use crate::ui;
use crate::validator::PrerequisitesValidator;

/// Create a local cluster.
#[derive(Args)]
pub struct CreateCommand {
    /// Cluster name.
    name: String,

    /// Provider to create the cluster with.
    #[arg(short, long, default_value = "minikube")]
    provider: ProviderKind,

    /// Total node count (control plane included).
    #[arg(long, default_value_t = 1)]
    nodes: u8,

    /// Kubernetes version (e.g. 1.31.0).
    #[arg(long, value_name = "VERSION")]
    kubernetes_version: Option<String>,

    /// VM/container driver (minikube only).
    #[arg(long)]
    driver: Option<String>,

    /// Don't block until the cluster reports ready.
    #[arg(long)]
    no_wait: bool,

    /// Delete and recreate the cluster if it already exists.
    #[arg(long)]
    force: bool,

    /// Skip the recreate confirmation prompt.
    #[arg(short, long)]
    yes: bool,

    /// Describe the vendor commands without executing anything.
    #[arg(long)]
    dry_run: bool,
}

impl CreateCommand {
    pub async fn run(&self) -> Result<()> {
        ui::print_banner();
        ui::print_section(&format!(
            "Creating cluster '{}' ({})",
            self.name, self.provider
        ));

        if self.driver.is_some() && self.provider != ProviderKind::Minikube {
            anyhow::bail!("--driver is only supported with the minikube provider");
        }

        ui::print_step("Checking prerequisites");
        PrerequisitesValidator::for_provider(self.provider).validate()?;

        let runner = CommandRunner::new(self.dry_run);
        let provider = backends::provider_for(self.provider, runner);

        if provider.exists(&self.name).await? {
            if !self.force {
                anyhow::bail!(
                    "Cluster '{}' already exists for provider {}. Use --force to recreate it.",
                    self.name,
                    self.provider
                );
            }

            if !self.yes && !self.dry_run {
                let proceed = Confirm::with_theme(&ColorfulTheme::default())
                    .with_prompt(format!(
                        "Cluster '{}' already exists. Delete and recreate it?",
                        self.name
                    ))
                    .default(false)
                    .interact()?;

                if !proceed {
                    ui::print_warning("Create cancelled.");
                    return Ok(());
                }
            }

            ui::print_step("Deleting existing cluster");
            provider
                .delete(&self.name)
                .await
                .with_context(|| format!("Failed to delete cluster '{}'", self.name))?;
        }

        let spec = ClusterSpec {
            name: self.name.clone(),
            nodes: self.nodes.max(1),
            kubernetes_version: self.kubernetes_version.clone(),
            driver: self.driver.clone(),
            wait: !self.no_wait,
        };

        ui::print_step("Creating cluster");
        provider
            .create(&spec)
            .await
            .with_context(|| format!("Failed to create cluster '{}'", self.name))?;

        ui::print_success(&format!("Cluster '{}' created", self.name));
        ui::print_info(&format!(
            "Try: kubectl --context {} get nodes",
            provider.context_name(&self.name)
        ));
        Ok(())
    }
}
