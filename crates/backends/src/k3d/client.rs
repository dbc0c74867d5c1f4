//! k3d CLI driver.

use std::path::Path;
use std::process::Command;

use async_trait::async_trait;

use super::models::K3dCluster;
use crate::docker;
use crate::runner::CommandRunner;
use crate::traits::{BackendError, ClusterSpec, Provider, ProviderKind, SnapshotInfo};

/// Docker label k3d applies to every node container of a cluster.
const CLUSTER_LABEL: &str = "k3d.cluster";

/// k3d backend. k3d has first-class stop/start verbs, so pausing does not
/// need to reach into docker; the inspect-dump snapshot still does.
#[derive(Debug, Clone)]
pub struct K3d {
    runner: CommandRunner,
}

impl K3d {
    #[must_use]
    pub fn new(runner: CommandRunner) -> Self {
        Self { runner }
    }

    fn cluster_list(&self) -> Result<Vec<K3dCluster>, BackendError> {
        let mut cmd = Command::new("k3d");
        cmd.args(["cluster", "list", "-o", "json"]);
        let out = self.runner.query(&mut cmd)?;
        serde_json::from_str(&out).map_err(|source| BackendError::Parse {
            what: "k3d cluster list",
            source,
        })
    }

    fn raw_cluster(&self, name: &str) -> Result<serde_json::Value, BackendError> {
        let mut cmd = Command::new("k3d");
        cmd.args(["cluster", "list", "-o", "json"]);
        let out = self.runner.query(&mut cmd)?;
        let value: serde_json::Value =
            serde_json::from_str(&out).map_err(|source| BackendError::Parse {
                what: "k3d cluster list",
                source,
            })?;

        value
            .as_array()
            .and_then(|clusters| {
                clusters
                    .iter()
                    .find(|c| c.pointer("/name").and_then(|n| n.as_str()) == Some(name))
            })
            .cloned()
            .ok_or_else(|| BackendError::ClusterNotFound(name.to_string()))
    }
}

#[async_trait]
impl Provider for K3d {
    fn kind(&self) -> ProviderKind {
        ProviderKind::K3d
    }

    fn binary(&self) -> &'static str {
        "k3d"
    }

    fn context_name(&self, name: &str) -> String {
        format!("k3d-{name}")
    }

    async fn list_clusters(&self) -> Result<Vec<String>, BackendError> {
        Ok(self.cluster_list()?.into_iter().map(|c| c.name).collect())
    }

    async fn is_running(&self, name: &str) -> Result<bool, BackendError> {
        Ok(self
            .cluster_list()?
            .iter()
            .any(|c| c.name == name && c.is_running()))
    }

    async fn cluster_record(&self, name: &str) -> Result<serde_json::Value, BackendError> {
        self.raw_cluster(name)
    }

    async fn stop(&self, name: &str) -> Result<(), BackendError> {
        self.runner
            .run(Command::new("k3d").args(["cluster", "stop", name]))
    }

    async fn start(&self, name: &str) -> Result<(), BackendError> {
        self.runner
            .run_visible(Command::new("k3d").args(["cluster", "start", name]))
    }

    async fn create(&self, spec: &ClusterSpec) -> Result<(), BackendError> {
        let mut cmd = Command::new("k3d");
        cmd.args(["cluster", "create", &spec.name]);
        if spec.nodes > 1 {
            // One server plus the rest as agents.
            cmd.arg("--agents").arg((spec.nodes - 1).to_string());
        }
        if let Some(version) = &spec.kubernetes_version {
            let tag = version.strip_prefix('v').unwrap_or(version);
            cmd.arg("--image").arg(format!("rancher/k3s:v{tag}-k3s1"));
        }
        if spec.wait {
            cmd.arg("--wait");
        }
        self.runner.run_visible(&mut cmd)
    }

    async fn delete(&self, name: &str) -> Result<(), BackendError> {
        self.runner
            .run(Command::new("k3d").args(["cluster", "delete", name]))
    }

    async fn snapshot(
        &self,
        name: &str,
        dest_dir: &Path,
    ) -> Result<Option<SnapshotInfo>, BackendError> {
        // Same inspect-dump mechanism as kind: metadata only.
        let label = format!("{CLUSTER_LABEL}={name}");
        let containers = docker::containers_by_label(&self.runner, &label)?;
        if containers.is_empty() {
            return Err(BackendError::ClusterNotFound(name.to_string()));
        }
        if self.runner.is_dry_run() {
            println!("  [dry-run] docker inspect {}", containers.join(" "));
            return Ok(None);
        }
        docker::dump_inspect(&self.runner, &containers, dest_dir)?;
        Ok(Some(SnapshotInfo {
            kind: "container-inspect".to_string(),
            location: dest_dir.to_path_buf(),
            taken_at: chrono::Utc::now().to_rfc3339(),
        }))
    }

    async fn kubeconfig(&self, name: &str) -> Result<String, BackendError> {
        let mut cmd = Command::new("k3d");
        cmd.args(["kubeconfig", "get", name]);
        self.runner.query(&mut cmd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_name() {
        let k3d = K3d::new(CommandRunner::default());
        assert_eq!(k3d.context_name("dev"), "k3d-dev");
    }
}
