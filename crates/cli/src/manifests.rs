//! Manifest tree application in dependency order.
//!
//! A manifest root is a directory of per-kind subdirectories. They are
//! applied in a fixed sequence so that namespaces exist before anything
//! lands in them and config exists before the workloads that mount it.
//! Missing subdirectories are skipped; the traversal order never depends
//! on the filesystem.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::warn;

use crate::kubectl::Kubectl;
use crate::outcome::Advisory;
use crate::ui;

/// Subdirectory apply order.
pub const APPLY_ORDER: &[&str] = &[
    "namespace",
    "configmaps",
    "secrets",
    "persistent-volume-claims",
    "services",
    "deployments",
    "statefulsets",
    "ingress",
    "daemonsets",
    "jobs",
    "cronjobs",
    "networkpolicies",
    "rbac",
    "quotas",
    "autoscalers",
    "crds",
];

/// What an apply pass did.
#[derive(Debug, Default)]
pub struct ApplyOutcome {
    pub applied: Vec<&'static str>,
    pub skipped: Vec<&'static str>,
}

/// Apply every populated subdirectory of `root` in `APPLY_ORDER`.
///
/// # Errors
///
/// Returns an error if the root is missing or any `kubectl apply` fails;
/// applying half a tree and continuing would hide broken manifests.
pub fn apply_tree(kubectl: &Kubectl, root: &Path) -> Result<ApplyOutcome> {
    if !root.is_dir() {
        anyhow::bail!("Manifest directory not found: {}", root.display());
    }

    let mut outcome = ApplyOutcome::default();
    for subdir in APPLY_ORDER {
        let dir = root.join(subdir);
        if !dir.is_dir() {
            outcome.skipped.push(subdir);
            continue;
        }

        ui::print_step(&format!("Applying {subdir}/"));
        kubectl
            .apply_path(&dir)
            .with_context(|| format!("Failed to apply {}", dir.display()))?;
        outcome.applied.push(subdir);
    }

    Ok(outcome)
}

/// Wait for every Deployment and StatefulSet in the cluster to finish
/// rolling out. Each wait is independently best-effort; a timeout logs a
/// warning and the pass moves on.
pub fn wait_for_workloads(kubectl: &Kubectl, timeout: Duration) -> Vec<Advisory> {
    let mut warnings = Vec::new();

    let workloads = match kubectl.workloads() {
        Ok(w) => w,
        Err(e) => {
            warn!(error = %e, "Could not list workloads to wait on");
            warnings.push(Advisory::new("wait", format!("could not list workloads: {e}")));
            return warnings;
        }
    };

    if workloads.is_empty() {
        ui::print_info("No deployments or statefulsets to wait for");
        return warnings;
    }

    let total = workloads.len();
    let deadline = Instant::now() + timeout;
    let mut ready = 0usize;

    for (kind, namespace, name) in workloads {
        let remaining = deadline.saturating_duration_since(Instant::now());
        // Give each remaining workload at least a short window even when
        // earlier waits used up most of the timeout.
        let per_wait = remaining.as_secs().max(10);

        match kubectl.rollout_status(&namespace, &kind, &name, per_wait) {
            Ok(()) => {
                ready += 1;
                ui::print_wait_progress(ready, total);
            }
            Err(e) => {
                warn!(%kind, %namespace, %name, error = %e, "Rollout wait failed");
                warnings.push(Advisory::new(
                    "wait",
                    format!("{kind} {namespace}/{name}: {e}"),
                ));
            }
        }
    }

    if ready < total {
        println!();
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use backends::CommandRunner;

    #[test]
    fn test_apply_order_starts_with_namespace() {
        assert_eq!(APPLY_ORDER[0], "namespace");
    }

    #[test]
    fn test_apply_order_dependencies() {
        let idx = |d: &str| APPLY_ORDER.iter().position(|s| *s == d).unwrap();
        assert!(idx("configmaps") < idx("deployments"));
        assert!(idx("secrets") < idx("deployments"));
        assert!(idx("persistent-volume-claims") < idx("deployments"));
        assert!(idx("services") < idx("deployments"));
        assert!(idx("deployments") < idx("statefulsets"));
        assert!(idx("statefulsets") < idx("ingress"));
    }

    #[test]
    fn test_apply_tree_missing_root_errors() {
        let kubectl = Kubectl::new(CommandRunner::new(true), "kind-dev".into());
        let err = apply_tree(&kubectl, Path::new("/nonexistent/manifests")).unwrap_err();
        assert!(err.to_string().contains("Manifest directory not found"));
    }

    #[test]
    fn test_apply_tree_skips_missing_subdirs_in_order() {
        let root = tempfile::tempdir().unwrap();
        // Deliberately created out of apply order
        std::fs::create_dir(root.path().join("deployments")).unwrap();
        std::fs::create_dir(root.path().join("namespace")).unwrap();
        std::fs::create_dir(root.path().join("services")).unwrap();

        // Dry-run runner: apply is described, not executed
        let kubectl = Kubectl::new(CommandRunner::new(true), "kind-dev".into());
        let outcome = apply_tree(&kubectl, root.path()).unwrap();

        assert_eq!(outcome.applied, vec!["namespace", "services", "deployments"]);
        assert!(outcome.skipped.contains(&"configmaps"));
        assert!(outcome.skipped.contains(&"crds"));
    }
}
