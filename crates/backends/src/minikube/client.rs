//! minikube CLI driver.

use std::path::Path;
use std::process::Command;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::models::ProfileList;
use crate::runner::CommandRunner;
use crate::traits::{BackendError, ClusterSpec, Provider, ProviderKind, SnapshotInfo};

/// minikube backend. Profiles are minikube's name for clusters; every
/// operation passes `-p <name>` so the default profile is never touched by
/// accident.
#[derive(Debug, Clone)]
pub struct Minikube {
    runner: CommandRunner,
}

impl Minikube {
    #[must_use]
    pub fn new(runner: CommandRunner) -> Self {
        Self { runner }
    }

    fn profile_list(&self) -> Result<ProfileList, BackendError> {
        let mut cmd = Command::new("minikube");
        cmd.args(["profile", "list", "-o", "json"]);
        let out = self.runner.query(&mut cmd)?;
        serde_json::from_str(&out).map_err(|source| BackendError::Parse {
            what: "minikube profile list",
            source,
        })
    }

    /// Raw JSON record for one profile, taken from the profile listing.
    fn raw_profile(&self, name: &str) -> Result<serde_json::Value, BackendError> {
        let mut cmd = Command::new("minikube");
        cmd.args(["profile", "list", "-o", "json"]);
        let out = self.runner.query(&mut cmd)?;
        let value: serde_json::Value =
            serde_json::from_str(&out).map_err(|source| BackendError::Parse {
                what: "minikube profile list",
                source,
            })?;

        value
            .get("valid")
            .and_then(|v| v.as_array())
            .and_then(|profiles| {
                profiles
                    .iter()
                    .find(|p| p.pointer("/Name").and_then(|n| n.as_str()) == Some(name))
            })
            .cloned()
            .ok_or_else(|| BackendError::ClusterNotFound(name.to_string()))
    }

    fn driver_of(&self, name: &str) -> Result<String, BackendError> {
        let list = self.profile_list()?;
        list.valid
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.driver().to_string())
            .ok_or_else(|| BackendError::ClusterNotFound(name.to_string()))
    }
}

#[async_trait]
impl Provider for Minikube {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Minikube
    }

    fn binary(&self) -> &'static str {
        "minikube"
    }

    fn context_name(&self, name: &str) -> String {
        // minikube registers the context under the profile name
        name.to_string()
    }

    async fn list_clusters(&self) -> Result<Vec<String>, BackendError> {
        let list = self.profile_list()?;
        Ok(list.valid.into_iter().map(|p| p.name).collect())
    }

    async fn is_running(&self, name: &str) -> Result<bool, BackendError> {
        let list = self.profile_list()?;
        Ok(list
            .valid
            .iter()
            .any(|p| p.name == name && p.status == "Running"))
    }

    async fn cluster_record(&self, name: &str) -> Result<serde_json::Value, BackendError> {
        self.raw_profile(name)
    }

    async fn stop(&self, name: &str) -> Result<(), BackendError> {
        self.runner
            .run(Command::new("minikube").args(["stop", "-p", name]))
    }

    async fn start(&self, name: &str) -> Result<(), BackendError> {
        self.runner
            .run_visible(Command::new("minikube").args(["start", "-p", name]))
    }

    async fn create(&self, spec: &ClusterSpec) -> Result<(), BackendError> {
        let mut cmd = Command::new("minikube");
        cmd.args(["start", "-p", &spec.name]);
        if spec.nodes > 1 {
            cmd.arg("--nodes").arg(spec.nodes.to_string());
        }
        if let Some(version) = &spec.kubernetes_version {
            cmd.arg("--kubernetes-version").arg(version);
        }
        if let Some(driver) = &spec.driver {
            cmd.arg("--driver").arg(driver);
        }
        if spec.wait {
            cmd.args(["--wait", "all"]);
        }
        self.runner.run_visible(&mut cmd)
    }

    async fn delete(&self, name: &str) -> Result<(), BackendError> {
        self.runner
            .run(Command::new("minikube").args(["delete", "-p", name]))
    }

    async fn snapshot(
        &self,
        name: &str,
        _dest_dir: &Path,
    ) -> Result<Option<SnapshotInfo>, BackendError> {
        // Only the virtualbox driver has a real snapshot mechanism.
        let driver = self.driver_of(name)?;
        if driver != "virtualbox" {
            debug!(driver = %driver, "no snapshot mechanism for this minikube driver");
            return Ok(None);
        }

        let snap_name = format!("kubenap-{}", chrono::Utc::now().format("%Y%m%d%H%M%S"));
        let result = self.runner.run(
            Command::new("VBoxManage")
                .args(["snapshot", name, "take"])
                .arg(&snap_name),
        );
        if let Err(e) = result {
            warn!(error = %e, "VirtualBox snapshot failed");
            return Err(e);
        }

        Ok(Some(SnapshotInfo {
            kind: "virtualbox".to_string(),
            location: snap_name.into(),
            taken_at: chrono::Utc::now().to_rfc3339(),
        }))
    }

    async fn kubeconfig(&self, name: &str) -> Result<String, BackendError> {
        // minikube maintains its context in the default kubeconfig; extract
        // a self-contained copy for the snapshot.
        let mut cmd = Command::new("kubectl");
        cmd.args(["config", "view", "--minify", "--flatten"])
            .args(["--context", name]);
        self.runner.query(&mut cmd)
    }
}
