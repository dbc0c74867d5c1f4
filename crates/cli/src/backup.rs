//! Workload backup and restore.
//!
//! At pause time a fixed set of resource kinds is dumped to YAML, one file
//! per kind. At resume time the files are re-applied in dependency order:
//! config before consumers, volumes before claimants, services before the
//! deployments that sit behind them. The dump is a best-effort point-in-time
//! capture; nothing ties it to the live cluster beyond "most recent pause".

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::warn;

use crate::kubectl::Kubectl;
use crate::outcome::Advisory;
use crate::ui;

/// One resource kind in the backup set.
#[derive(Debug, Clone, Copy)]
pub struct BackupKind {
    /// kubectl resource name.
    pub kind: &'static str,
    /// File the dump lands in.
    pub file: &'static str,
    /// Whether the kind is namespaced (dumped with `--all-namespaces`).
    pub namespaced: bool,
}

/// Everything that gets dumped at pause time.
pub const BACKUP_KINDS: &[BackupKind] = &[
    BackupKind { kind: "namespaces", file: "namespaces.yaml", namespaced: false },
    BackupKind { kind: "configmaps", file: "configmaps.yaml", namespaced: true },
    BackupKind { kind: "secrets", file: "secrets.yaml", namespaced: true },
    BackupKind { kind: "persistentvolumes", file: "persistent-volumes.yaml", namespaced: false },
    BackupKind { kind: "persistentvolumeclaims", file: "persistent-volume-claims.yaml", namespaced: true },
    BackupKind { kind: "services", file: "services.yaml", namespaced: true },
    BackupKind { kind: "deployments", file: "deployments.yaml", namespaced: true },
];

/// Restore order. BACKUP_KINDS is already declared in dependency order, so
/// restore walks the same list; the constant exists so the order is a
/// tested contract rather than a side effect of the dump set.
pub const RESTORE_ORDER: &[&str] = &[
    "namespaces.yaml",
    "configmaps.yaml",
    "secrets.yaml",
    "persistent-volumes.yaml",
    "persistent-volume-claims.yaml",
    "services.yaml",
    "deployments.yaml",
];

/// What a dump pass produced.
#[derive(Debug, Default)]
pub struct DumpOutcome {
    pub dumped: Vec<PathBuf>,
    pub warnings: Vec<Advisory>,
}

/// Dump the backup set into `dir`. Per-kind failures warn and continue.
///
/// # Errors
///
/// Returns an error only if the backup directory cannot be created.
pub fn dump(kubectl: &Kubectl, dir: &Path) -> Result<DumpOutcome> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create backup dir {}", dir.display()))?;

    let mut outcome = DumpOutcome::default();
    for entry in BACKUP_KINDS {
        match kubectl.dump_yaml(entry.kind, entry.namespaced) {
            Ok(yaml) => {
                let path = dir.join(entry.file);
                if let Err(e) = std::fs::write(&path, yaml) {
                    warn!(kind = entry.kind, error = %e, "Failed to write dump");
                    outcome
                        .warnings
                        .push(Advisory::new("backup", format!("{}: {e}", entry.kind)));
                } else {
                    outcome.dumped.push(path);
                }
            }
            Err(e) => {
                warn!(kind = entry.kind, error = %e, "Failed to dump resources");
                outcome
                    .warnings
                    .push(Advisory::new("backup", format!("{}: {e}", entry.kind)));
            }
        }
    }

    Ok(outcome)
}

/// What a restore pass accomplished.
#[derive(Debug, Default)]
pub struct RestoreOutcome {
    pub applied: Vec<&'static str>,
    pub warnings: Vec<Advisory>,
}

/// Re-apply dumped workloads in `RESTORE_ORDER`. Absent files are skipped;
/// per-file apply failures warn and continue.
pub fn restore(kubectl: &Kubectl, dir: &Path) -> RestoreOutcome {
    let mut outcome = RestoreOutcome::default();

    for file in RESTORE_ORDER {
        let path = dir.join(file);
        if !path.exists() {
            continue;
        }
        match kubectl.apply_path(&path) {
            Ok(()) => {
                ui::print_info(&format!("Restored {file}"));
                outcome.applied.push(file);
            }
            Err(e) => {
                warn!(file, error = %e, "Restore apply failed");
                outcome
                    .warnings
                    .push(Advisory::new("restore", format!("{file}: {e}")));
            }
        }
    }

    outcome
}

/// A deployment the validation pass expects to come back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentExpectation {
    pub namespace: String,
    pub name: String,
    pub replicas: i32,
}

#[derive(Debug, Deserialize)]
struct DumpedList {
    #[serde(default)]
    items: Vec<DumpedDeployment>,
}

#[derive(Debug, Deserialize)]
struct DumpedDeployment {
    metadata: DumpedMeta,
    #[serde(default)]
    spec: Option<DumpedSpec>,
}

#[derive(Debug, Deserialize)]
struct DumpedMeta {
    name: String,
    #[serde(default)]
    namespace: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DumpedSpec {
    #[serde(default)]
    replicas: Option<i32>,
}

/// Parse the dumped `deployments.yaml` into validation expectations.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn expected_deployments(dir: &Path) -> Result<Vec<DeploymentExpectation>> {
    let path = dir.join("deployments.yaml");
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let list: DumpedList =
        serde_yaml::from_str(&content).context("Failed to parse deployments.yaml")?;

    Ok(list
        .items
        .into_iter()
        .map(|d| DeploymentExpectation {
            namespace: d
                .metadata
                .namespace
                .unwrap_or_else(|| "default".to_string()),
            name: d.metadata.name,
            replicas: d.spec.and_then(|s| s.replicas).unwrap_or(1),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restore_order_is_the_documented_sequence() {
        assert_eq!(
            RESTORE_ORDER,
            &[
                "namespaces.yaml",
                "configmaps.yaml",
                "secrets.yaml",
                "persistent-volumes.yaml",
                "persistent-volume-claims.yaml",
                "services.yaml",
                "deployments.yaml",
            ]
        );
    }

    #[test]
    fn test_every_restore_file_has_a_dump_source() {
        for file in RESTORE_ORDER {
            assert!(
                BACKUP_KINDS.iter().any(|k| k.file == *file),
                "{file} is restored but never dumped"
            );
        }
    }

    #[test]
    fn test_config_restores_before_consumers() {
        let idx = |file: &str| RESTORE_ORDER.iter().position(|f| *f == file).unwrap();
        assert!(idx("namespaces.yaml") < idx("configmaps.yaml"));
        assert!(idx("configmaps.yaml") < idx("deployments.yaml"));
        assert!(idx("secrets.yaml") < idx("deployments.yaml"));
        assert!(idx("persistent-volumes.yaml") < idx("persistent-volume-claims.yaml"));
        assert!(idx("persistent-volume-claims.yaml") < idx("deployments.yaml"));
        assert!(idx("services.yaml") < idx("deployments.yaml"));
    }

    #[test]
    fn test_cluster_scoped_kinds_not_namespaced() {
        for entry in BACKUP_KINDS {
            let cluster_scoped = entry.kind == "namespaces" || entry.kind == "persistentvolumes";
            assert_eq!(entry.namespaced, !cluster_scoped, "{}", entry.kind);
        }
    }

    #[test]
    fn test_expected_deployments_parsing() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = r"
apiVersion: v1
kind: List
items:
- apiVersion: apps/v1
  kind: Deployment
  metadata:
    name: web
    namespace: shop
  spec:
    replicas: 3
- apiVersion: apps/v1
  kind: Deployment
  metadata:
    name: worker
  spec: {}
";
        std::fs::write(dir.path().join("deployments.yaml"), yaml).unwrap();

        let expected = expected_deployments(dir.path()).unwrap();
        assert_eq!(
            expected,
            vec![
                DeploymentExpectation {
                    namespace: "shop".into(),
                    name: "web".into(),
                    replicas: 3,
                },
                DeploymentExpectation {
                    namespace: "default".into(),
                    name: "worker".into(),
                    replicas: 1,
                },
            ]
        );
    }
}
