//! kind CLI driver.

use std::io::Write;
use std::path::Path;
use std::process::Command;

use async_trait::async_trait;
use tracing::debug;

use crate::docker;
use crate::runner::CommandRunner;
use crate::traits::{BackendError, ClusterSpec, Provider, ProviderKind, SnapshotInfo};

/// Docker label kind applies to every node container of a cluster.
const CLUSTER_LABEL: &str = "io.x-k8s.kind.cluster";

/// kind backend. Cluster lifecycle goes through `kind`; pausing means
/// stopping the node containers directly, since kind has no stop verb.
#[derive(Debug, Clone)]
pub struct Kind {
    runner: CommandRunner,
}

impl Kind {
    #[must_use]
    pub fn new(runner: CommandRunner) -> Self {
        Self { runner }
    }

    fn cluster_label(name: &str) -> String {
        format!("{CLUSTER_LABEL}={name}")
    }

    fn node_containers(&self, name: &str) -> Result<Vec<String>, BackendError> {
        docker::containers_by_label(&self.runner, &Self::cluster_label(name))
    }

    /// Multi-node clusters need a config file listing the extra workers.
    fn write_config(nodes: u8) -> Result<tempfile::NamedTempFile, BackendError> {
        let mut config = String::from(
            "kind: Cluster\napiVersion: kind.x-k8s.io/v1alpha4\nnodes:\n- role: control-plane\n",
        );
        for _ in 1..nodes {
            config.push_str("- role: worker\n");
        }

        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(config.as_bytes())?;
        Ok(file)
    }
}

#[async_trait]
impl Provider for Kind {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Kind
    }

    fn binary(&self) -> &'static str {
        "kind"
    }

    fn context_name(&self, name: &str) -> String {
        format!("kind-{name}")
    }

    async fn list_clusters(&self) -> Result<Vec<String>, BackendError> {
        let mut cmd = Command::new("kind");
        cmd.args(["get", "clusters"]);
        let out = self.runner.query(&mut cmd)?;
        Ok(out
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(ToOwned::to_owned)
            .collect())
    }

    async fn is_running(&self, name: &str) -> Result<bool, BackendError> {
        let running =
            docker::running_containers_by_label(&self.runner, &Self::cluster_label(name))?;
        Ok(!running.is_empty())
    }

    async fn cluster_record(&self, name: &str) -> Result<serde_json::Value, BackendError> {
        let containers = self.node_containers(name)?;
        if containers.is_empty() {
            return Err(BackendError::ClusterNotFound(name.to_string()));
        }
        let nodes = containers
            .iter()
            .map(|c| docker::container_summary(&self.runner, c))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(serde_json::json!({
            "name": name,
            "provider": "kind",
            "nodes": nodes,
        }))
    }

    async fn stop(&self, name: &str) -> Result<(), BackendError> {
        let containers = self.node_containers(name)?;
        if containers.is_empty() {
            return Err(BackendError::ClusterNotFound(name.to_string()));
        }
        debug!(cluster = %name, count = containers.len(), "stopping node containers");
        docker::stop_containers(&self.runner, &containers)
    }

    async fn start(&self, name: &str) -> Result<(), BackendError> {
        let containers = self.node_containers(name)?;
        if containers.is_empty() {
            return Err(BackendError::ClusterNotFound(name.to_string()));
        }
        debug!(cluster = %name, count = containers.len(), "starting node containers");
        docker::start_containers(&self.runner, &containers)
    }

    async fn create(&self, spec: &ClusterSpec) -> Result<(), BackendError> {
        let mut cmd = Command::new("kind");
        cmd.args(["create", "cluster", "--name", &spec.name]);
        if let Some(version) = &spec.kubernetes_version {
            let tag = version.strip_prefix('v').unwrap_or(version);
            cmd.arg("--image").arg(format!("kindest/node:v{tag}"));
        }
        if spec.wait {
            cmd.args(["--wait", "120s"]);
        }

        if spec.nodes > 1 {
            // The config file must outlive the vendor process.
            let config = Self::write_config(spec.nodes)?;
            cmd.arg("--config").arg(config.path());
            return self.runner.run_visible(&mut cmd);
        }
        self.runner.run_visible(&mut cmd)
    }

    async fn delete(&self, name: &str) -> Result<(), BackendError> {
        self.runner
            .run(Command::new("kind").args(["delete", "cluster", "--name", name]))
    }

    async fn snapshot(
        &self,
        name: &str,
        dest_dir: &Path,
    ) -> Result<Option<SnapshotInfo>, BackendError> {
        // Not a true snapshot: inspect dumps preserve container metadata only.
        let containers = self.node_containers(name)?;
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
        let mut cmd = Command::new("kind");
        cmd.args(["get", "kubeconfig", "--name", name]);
        self.runner.query(&mut cmd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_cluster_label() {
        assert_eq!(
            Kind::cluster_label("dev"),
            "io.x-k8s.kind.cluster=dev"
        );
    }

    #[test]
    fn test_multi_node_config() {
        let file = Kind::write_config(3).unwrap();
        let mut content = String::new();
        std::fs::File::open(file.path())
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content.matches("- role: worker").count(), 2);
        assert_eq!(content.matches("- role: control-plane").count(), 1);
    }

    #[test]
    fn test_context_name() {
        let kind = Kind::new(CommandRunner::default());
        assert_eq!(kind.context_name("dev"), "kind-dev");
    }
}
