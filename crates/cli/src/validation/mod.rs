//! Post-resume cluster health validation.
//!
//! Talks to the Kubernetes API directly (no kubectl) to verify that a
//! resumed cluster actually came back: API reachable, nodes Ready, system
//! pods running, restored deployments at their expected replica counts.
//! Every check is advisory: a resume is considered successful once the
//! compute layer restarts, and validation findings are reported as
//! warnings.

pub mod report;

use std::time::Duration;

use anyhow::{Context, Result};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Node, Pod};
use kube::api::ListParams;
use kube::config::KubeConfigOptions;
use kube::{Api, Client, Config};
use tracing::{debug, info};

use crate::backup::DeploymentExpectation;

pub use report::{CheckResult, CheckStatus, ValidationReport};

/// How long the replica-readiness check keeps polling before failing.
const WORKLOAD_TIMEOUT: Duration = Duration::from_secs(120);
/// Polling interval for the replica-readiness check.
const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Health validator bound to one cluster context.
pub struct ClusterValidator {
    client: Client,
    cluster: String,
}

impl ClusterValidator {
    /// Connect using the named context from the default kubeconfig.
    ///
    /// # Errors
    ///
    /// Returns an error if the kubeconfig has no such context or the
    /// client cannot be built.
    pub async fn connect(cluster: &str, context: &str) -> Result<Self> {
        let options = KubeConfigOptions {
            context: Some(context.to_string()),
            ..KubeConfigOptions::default()
        };
        let config = Config::from_kubeconfig(&options)
            .await
            .with_context(|| format!("Failed to load kubeconfig context {context}"))?;
        let client = Client::try_from(config).context("Failed to build Kubernetes client")?;

        Ok(Self {
            client,
            cluster: cluster.to_string(),
        })
    }

    /// Run the full validation pass.
    pub async fn validate(
        &self,
        expectations: Option<&[DeploymentExpectation]>,
    ) -> ValidationReport {
        let mut report = ValidationReport::new(self.cluster.clone());

        // The cheap checks are independent; the workload check polls and
        // runs on its own afterwards.
        let (api, nodes, pods) = futures::join!(
            self.check_api(),
            self.check_nodes(),
            self.check_system_pods()
        );
        report.push(api);
        report.push(nodes);
        report.push(pods);
        report.push(self.check_deployments(expectations).await);

        report
    }

    /// API reachability.
    async fn check_api(&self) -> CheckResult {
        match self.client.apiserver_version().await {
            Ok(version) => {
                info!(version = %version.git_version, "API server reachable");
                CheckResult::pass("api", format!("reachable ({})", version.git_version))
            }
            Err(e) => CheckResult::fail("api", format!("unreachable: {e}")),
        }
    }

    /// Every node reports the Ready condition.
    async fn check_nodes(&self) -> CheckResult {
        let nodes: Api<Node> = Api::all(self.client.clone());
        let list = match nodes.list(&ListParams::default()).await {
            Ok(list) => list,
            Err(e) => return CheckResult::fail("nodes", format!("list failed: {e}")),
        };

        let total = list.items.len();
        let ready = list.items.iter().filter(|n| node_is_ready(n)).count();

        if total == 0 {
            CheckResult::fail("nodes", "no nodes registered")
        } else if ready == total {
            CheckResult::pass("nodes", format!("{ready}/{total} Ready"))
        } else {
            CheckResult::fail("nodes", format!("{ready}/{total} Ready"))
        }
    }

    /// kube-system pods all running or completed.
    async fn check_system_pods(&self) -> CheckResult {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), "kube-system");
        let list = match pods.list(&ListParams::default()).await {
            Ok(list) => list,
            Err(e) => return CheckResult::fail("system-pods", format!("list failed: {e}")),
        };

        let total = list.items.len();
        let healthy = list
            .items
            .iter()
            .filter(|p| {
                matches!(
                    p.status.as_ref().and_then(|s| s.phase.as_deref()),
                    Some("Running" | "Succeeded")
                )
            })
            .count();

        if healthy == total {
            CheckResult::pass("system-pods", format!("{healthy}/{total} healthy"))
        } else {
            CheckResult::fail("system-pods", format!("{healthy}/{total} healthy"))
        }
    }

    /// Restored deployments reach their expected replica counts.
    async fn check_deployments(
        &self,
        expectations: Option<&[DeploymentExpectation]>,
    ) -> CheckResult {
        let Some(expected) = expectations else {
            return CheckResult::skip("workloads", "workloads not restored");
        };
        if expected.is_empty() {
            return CheckResult::skip("workloads", "backup had no deployments");
        }

        let deadline = std::time::Instant::now() + WORKLOAD_TIMEOUT;
        loop {
            match self.count_ready(expected).await {
                Ok(ready) if ready == expected.len() => {
                    return CheckResult::pass(
                        "workloads",
                        format!("{ready}/{} deployments ready", expected.len()),
                    );
                }
                Ok(ready) => {
                    debug!(ready, total = expected.len(), "Waiting for deployments");
                    if std::time::Instant::now() >= deadline {
                        return CheckResult::fail(
                            "workloads",
                            format!("{ready}/{} deployments ready", expected.len()),
                        );
                    }
                }
                Err(e) => {
                    return CheckResult::fail("workloads", format!("list failed: {e}"));
                }
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn count_ready(&self, expected: &[DeploymentExpectation]) -> Result<usize> {
        let mut ready = 0;
        for exp in expected {
            let api: Api<Deployment> = Api::namespaced(self.client.clone(), &exp.namespace);
            match api.get_opt(&exp.name).await? {
                Some(deployment) => {
                    let ready_replicas = deployment
                        .status
                        .as_ref()
                        .and_then(|s| s.ready_replicas)
                        .unwrap_or(0);
                    if ready_replicas >= exp.replicas {
                        ready += 1;
                    }
                }
                None => debug!(name = %exp.name, namespace = %exp.namespace, "Deployment not found yet"),
            }
        }
        Ok(ready)
    }
}

/// A node is Ready when its Ready condition is True.
fn node_is_ready(node: &Node) -> bool {
    node.status
        .as_ref()
        .and_then(|s| s.conditions.as_ref())
        .is_some_and(|conditions| {
            conditions
                .iter()
                .any(|c| c.type_ == "Ready" && c.status == "True")
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::{NodeCondition, NodeStatus};

    fn node_with_condition(type_: &str, status: &str) -> Node {
        Node {
            status: Some(NodeStatus {
                conditions: Some(vec![NodeCondition {
                    type_: type_.to_string(),
                    status: status.to_string(),
                    ..NodeCondition::default()
                }]),
                ..NodeStatus::default()
            }),
            ..Node::default()
        }
    }

    #[test]
    fn test_node_ready_detection() {
        assert!(node_is_ready(&node_with_condition("Ready", "True")));
        assert!(!node_is_ready(&node_with_condition("Ready", "False")));
        assert!(!node_is_ready(&node_with_condition("DiskPressure", "True")));
        assert!(!node_is_ready(&Node::default()));
    }
}
