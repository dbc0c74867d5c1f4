//! CLI subcommands.

pub mod apply;
pub mod create;
pub mod pause;
pub mod restart;
pub mod resume;
pub mod status;

use anyhow::{Context, Result};
use backends::{detect, CommandRunner, ProviderKind};

use crate::ui;

/// Resolve which provider owns a cluster: an explicit flag wins, otherwise
/// the backends are probed.
pub(crate) async fn resolve_provider(
    runner: CommandRunner,
    name: &str,
    explicit: Option<ProviderKind>,
) -> Result<ProviderKind> {
    if let Some(provider) = explicit {
        return Ok(provider);
    }

    let provider = detect(runner, name)
        .await
        .with_context(|| format!("Could not detect provider for cluster '{name}'"))?;
    ui::print_info(&format!("Detected provider: {provider}"));
    Ok(provider)
}
