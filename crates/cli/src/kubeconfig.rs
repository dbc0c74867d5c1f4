//! Kubeconfig snapshot and restore.
//!
//! At pause time the cluster's kubeconfig is captured next to the state
//! file. At resume time it is merged back into `~/.kube/config` and the
//! cluster's context is made current, so `kubectl` works immediately after
//! a resume even if the default kubeconfig was rebuilt in between.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use backends::Provider;
use tracing::info;

/// Get the default kubeconfig path (`~/.kube/config`).
#[must_use]
pub fn default_kubeconfig_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".kube").join("config"))
}

/// Capture the cluster's kubeconfig to `dest`.
///
/// # Errors
///
/// Returns an error if the provider cannot produce a kubeconfig or the
/// file cannot be written.
pub async fn snapshot(provider: &dyn Provider, name: &str, dest: &Path) -> Result<PathBuf> {
    let content = provider
        .kubeconfig(name)
        .await
        .context("Failed to fetch cluster kubeconfig")?;

    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent).context("Failed to create state directory")?;
    }
    std::fs::write(dest, content)
        .with_context(|| format!("Failed to write kubeconfig snapshot {}", dest.display()))?;

    info!(path = %dest.display(), "Saved kubeconfig snapshot");
    Ok(dest.to_path_buf())
}

/// Merge a kubeconfig snapshot into the user's default kubeconfig and make
/// `context` current.
///
/// Uses the KUBECONFIG env var trick:
/// `KUBECONFIG=~/.kube/config:<snapshot> kubectl config view --flatten`.
///
/// # Errors
///
/// Returns an error if the merge fails.
pub fn merge_into_default(source: &Path, context: &str) -> Result<PathBuf> {
    let default_path = default_kubeconfig_path().context("Could not determine home directory")?;

    if let Some(parent) = default_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create ~/.kube directory")?;
    }

    info!(
        source = %source.display(),
        target = %default_path.display(),
        "Merging kubeconfig snapshot"
    );

    // If default config doesn't exist, just copy the snapshot
    if !default_path.exists() {
        let content =
            std::fs::read_to_string(source).context("Failed to read kubeconfig snapshot")?;
        std::fs::write(&default_path, content)
            .context("Failed to write kubeconfig to ~/.kube/config")?;
    } else {
        let kubeconfig_env = format!("{}:{}", default_path.display(), source.display());

        let output = Command::new("kubectl")
            .env("KUBECONFIG", &kubeconfig_env)
            .args(["config", "view", "--flatten"])
            .output()
            .context("Failed to run kubectl config view --flatten")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("Failed to merge kubeconfig: {}", stderr.trim());
        }

        std::fs::write(&default_path, &output.stdout)
            .context("Failed to write merged kubeconfig to ~/.kube/config")?;
    }

    let set_context = Command::new("kubectl")
        .args(["config", "use-context", context])
        .output()
        .context("Failed to set kubectl context")?;

    if !set_context.status.success() {
        let stderr = String::from_utf8_lossy(&set_context.stderr);
        anyhow::bail!("Failed to switch context to {context}: {}", stderr.trim());
    }

    info!(context, "Merged kubeconfig and set current context");
    Ok(default_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_kubeconfig_path() {
        let path = default_kubeconfig_path();
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains(".kube"));
        assert!(path.to_string_lossy().ends_with("config"));
    }
}
