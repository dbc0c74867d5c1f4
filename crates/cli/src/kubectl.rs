//! kubectl invocation layer.
//!
//! kubectl stays a black-box collaborator: kubenap never reimplements its
//! YAML handling, it just assembles invocations against a fixed context.
//! Everything routes through the shared [`CommandRunner`] so dry-run covers
//! every mutating call.

use std::path::Path;
use std::process::Command;

use backends::{BackendError, CommandRunner};

/// kubectl bound to one kubeconfig context.
#[derive(Debug, Clone)]
pub struct Kubectl {
    runner: CommandRunner,
    context: String,
}

impl Kubectl {
    #[must_use]
    pub fn new(runner: CommandRunner, context: String) -> Self {
        Self { runner, context }
    }

    #[must_use]
    pub fn context(&self) -> &str {
        &self.context
    }

    fn base(&self) -> Command {
        let mut cmd = Command::new("kubectl");
        cmd.args(["--context", &self.context]);
        cmd
    }

    /// Node names, without the `node/` resource prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if kubectl fails.
    pub fn node_names(&self) -> Result<Vec<String>, BackendError> {
        let out = self
            .runner
            .query(self.base().args(["get", "nodes", "-o", "name"]))?;
        Ok(out
            .lines()
            .filter_map(|l| l.trim().strip_prefix("node/"))
            .map(ToOwned::to_owned)
            .collect())
    }

    /// Mark a node unschedulable.
    ///
    /// # Errors
    ///
    /// Returns an error if kubectl fails.
    pub fn cordon(&self, node: &str) -> Result<(), BackendError> {
        self.runner.run(self.base().args(["cordon", node]))
    }

    /// Evict pods from a node. Flags match what local dev clusters need:
    /// daemonsets can't be evicted and emptyDir data is disposable.
    ///
    /// # Errors
    ///
    /// Returns an error if kubectl fails or the drain times out.
    pub fn drain(&self, node: &str) -> Result<(), BackendError> {
        self.runner.run(self.base().args([
            "drain",
            node,
            "--ignore-daemonsets",
            "--delete-emptydir-data",
            "--force",
            "--timeout=60s",
        ]))
    }

    /// Make a node schedulable again.
    ///
    /// # Errors
    ///
    /// Returns an error if kubectl fails.
    pub fn uncordon(&self, node: &str) -> Result<(), BackendError> {
        self.runner.run(self.base().args(["uncordon", node]))
    }

    /// Dump one resource kind as YAML. Namespaced kinds are dumped across
    /// all namespaces.
    ///
    /// # Errors
    ///
    /// Returns an error if kubectl fails.
    pub fn dump_yaml(&self, kind: &str, namespaced: bool) -> Result<String, BackendError> {
        let mut cmd = self.base();
        cmd.args(["get", kind]);
        if namespaced {
            cmd.arg("--all-namespaces");
        }
        cmd.args(["-o", "yaml"]);
        self.runner.query(&mut cmd)
    }

    /// `kubectl apply -f <path>` (file or directory).
    ///
    /// # Errors
    ///
    /// Returns an error if kubectl fails.
    pub fn apply_path(&self, path: &Path) -> Result<(), BackendError> {
        let mut cmd = self.base();
        cmd.args(["apply", "-f"]).arg(path);
        self.runner.run(&mut cmd)
    }

    /// Block on one workload's rollout.
    ///
    /// # Errors
    ///
    /// Returns an error if the rollout does not complete in time.
    pub fn rollout_status(
        &self,
        namespace: &str,
        kind: &str,
        name: &str,
        timeout_secs: u64,
    ) -> Result<(), BackendError> {
        let mut cmd = self.base();
        cmd.args(["rollout", "status"])
            .arg(format!("{kind}/{name}"))
            .args(["-n", namespace])
            .arg(format!("--timeout={timeout_secs}s"));
        self.runner.run(&mut cmd)
    }

    /// Every Deployment and StatefulSet in the cluster as
    /// `(kind, namespace, name)` triples.
    ///
    /// # Errors
    ///
    /// Returns an error if kubectl fails or its JSON is unparseable.
    pub fn workloads(&self) -> Result<Vec<(String, String, String)>, BackendError> {
        let out = self.runner.query(self.base().args([
            "get",
            "deployments,statefulsets",
            "--all-namespaces",
            "-o",
            "json",
        ]))?;
        let value: serde_json::Value =
            serde_json::from_str(&out).map_err(|source| BackendError::Parse {
                what: "kubectl get workloads",
                source,
            })?;

        let mut workloads = Vec::new();
        if let Some(items) = value.get("items").and_then(|i| i.as_array()) {
            for item in items {
                let kind = item
                    .get("kind")
                    .and_then(|k| k.as_str())
                    .unwrap_or_default()
                    .to_lowercase();
                let namespace = item
                    .pointer("/metadata/namespace")
                    .and_then(|n| n.as_str())
                    .unwrap_or("default")
                    .to_string();
                let name = item
                    .pointer("/metadata/name")
                    .and_then(|n| n.as_str())
                    .unwrap_or_default()
                    .to_string();
                if !name.is_empty() && !kind.is_empty() {
                    workloads.push((kind, namespace, name));
                }
            }
        }
        Ok(workloads)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_is_kept() {
        let kubectl = Kubectl::new(CommandRunner::default(), "kind-dev".into());
        assert_eq!(kubectl.context(), "kind-dev");
    }

    #[test]
    fn test_node_name_prefix_stripping() {
        let lines = "node/dev-control-plane\nnode/dev-worker\n";
        let names: Vec<_> = lines
            .lines()
            .filter_map(|l| l.trim().strip_prefix("node/"))
            .collect();
        assert_eq!(names, vec!["dev-control-plane", "dev-worker"]);
    }
}
