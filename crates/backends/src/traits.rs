//! Provider trait and common types for local cluster backends.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during backend operations.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Required binary is not installed or not on PATH.
    #[error("required binary not found on PATH: {0}")]
    MissingBinary(String),

    /// The vendor process could not be spawned at all.
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The vendor process ran but exited non-zero.
    #[error("`{command}` failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    /// No provider knows a cluster by this name.
    #[error("cluster not found: {0}")]
    ClusterNotFound(String),

    /// A cluster name matched listings from more than one provider.
    #[error("cluster `{name}` matches multiple providers ({providers}); specify one explicitly")]
    Ambiguous { name: String, providers: String },

    /// Unknown provider name given on the command line.
    #[error("unknown provider: {0}. Supported: minikube, kind, k3d")]
    UnknownProvider(String),

    /// The provider cannot perform the requested operation.
    #[error("{provider} does not support {operation}")]
    Unsupported {
        provider: ProviderKind,
        operation: &'static str,
    },

    /// Vendor CLI output could not be parsed.
    #[error("failed to parse {what} output: {source}")]
    Parse {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Filesystem error (snapshot dumps, cluster config files).
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A local Kubernetes cluster backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// minikube profiles (VM or container driver).
    Minikube,
    /// kind clusters (Docker node containers).
    Kind,
    /// k3d clusters (k3s in Docker).
    K3d,
}

impl ProviderKind {
    /// All providers, in detection probe order.
    pub const ALL: [Self; 3] = [Self::Minikube, Self::Kind, Self::K3d];
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Minikube => write!(f, "minikube"),
            Self::Kind => write!(f, "kind"),
            Self::K3d => write!(f, "k3d"),
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = BackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "minikube" => Ok(Self::Minikube),
            "kind" => Ok(Self::Kind),
            "k3d" => Ok(Self::K3d),
            _ => Err(BackendError::UnknownProvider(s.to_string())),
        }
    }
}

/// Options for creating a new cluster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterSpec {
    /// Cluster name.
    pub name: String,
    /// Total node count (control plane included).
    pub nodes: u8,
    /// Kubernetes version (provider-specific image tag when containerized).
    pub kubernetes_version: Option<String>,
    /// VM/container driver. Only honored by minikube.
    pub driver: Option<String>,
    /// Block until the cluster reports ready.
    pub wait: bool,
}

impl ClusterSpec {
    /// Single-node spec with provider defaults.
    #[must_use]
    pub fn with_defaults(name: String) -> Self {
        Self {
            name,
            nodes: 1,
            kubernetes_version: None,
            driver: None,
            wait: true,
        }
    }
}

/// Description of a provider-level snapshot taken at pause time.
///
/// For minikube on the virtualbox driver this is a real VM snapshot. For
/// kind/k3d it is a set of `docker inspect` dumps, which preserve container
/// metadata but not disk state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotInfo {
    /// Snapshot mechanism (`virtualbox` or `container-inspect`).
    pub kind: String,
    /// Where the snapshot lives (VM snapshot name or dump directory).
    pub location: PathBuf,
    /// When the snapshot was taken (RFC3339).
    pub taken_at: String,
}

/// Capability interface implemented by each local cluster backend.
///
/// Mutating operations go through the backend's [`CommandRunner`], so a
/// dry-run runner describes the vendor commands instead of executing them.
/// Read-only queries (listings, status probes) always execute.
///
/// [`CommandRunner`]: crate::runner::CommandRunner
#[async_trait]
pub trait Provider: Send + Sync {
    /// Which backend this is.
    fn kind(&self) -> ProviderKind;

    /// The vendor CLI binary this backend drives.
    fn binary(&self) -> &'static str;

    /// Whether the vendor CLI is installed.
    fn is_available(&self) -> bool {
        which::which(self.binary()).is_ok()
    }

    /// The kubeconfig context name for a cluster.
    fn context_name(&self, name: &str) -> String;

    /// List cluster names known to this backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the vendor CLI fails or its output is unparseable.
    async fn list_clusters(&self) -> Result<Vec<String>, BackendError>;

    /// Whether a cluster with exactly this name exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing fails.
    async fn exists(&self, name: &str) -> Result<bool, BackendError> {
        Ok(self.list_clusters().await?.iter().any(|c| c == name))
    }

    /// Whether the cluster's compute layer is currently running.
    ///
    /// # Errors
    ///
    /// Returns an error if the status probe fails.
    async fn is_running(&self, name: &str) -> Result<bool, BackendError>;

    /// The provider's JSON record describing the cluster, embedded in the
    /// state file at pause time.
    ///
    /// # Errors
    ///
    /// Returns an error if the cluster is unknown or the record cannot be
    /// fetched.
    async fn cluster_record(&self, name: &str) -> Result<serde_json::Value, BackendError>;

    /// Stop the cluster's compute layer without destroying it.
    ///
    /// # Errors
    ///
    /// Returns an error if the vendor command fails.
    async fn stop(&self, name: &str) -> Result<(), BackendError>;

    /// Start a previously stopped cluster.
    ///
    /// # Errors
    ///
    /// Returns an error if the vendor command fails.
    async fn start(&self, name: &str) -> Result<(), BackendError>;

    /// Create a new cluster.
    ///
    /// # Errors
    ///
    /// Returns an error if the vendor command fails.
    async fn create(&self, spec: &ClusterSpec) -> Result<(), BackendError>;

    /// Delete a cluster entirely.
    ///
    /// # Errors
    ///
    /// Returns an error if the vendor command fails.
    async fn delete(&self, name: &str) -> Result<(), BackendError>;

    /// Take a provider-level snapshot, when the backend supports one.
    ///
    /// Returns `Ok(None)` when no snapshot mechanism applies.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot attempt itself fails.
    async fn snapshot(
        &self,
        name: &str,
        dest_dir: &Path,
    ) -> Result<Option<SnapshotInfo>, BackendError>;

    /// Fetch the cluster's kubeconfig as text.
    ///
    /// # Errors
    ///
    /// Returns an error if the vendor command fails.
    async fn kubeconfig(&self, name: &str) -> Result<String, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Stub backend exposing a fixed listing, for testing trait defaults.
    struct FixedListing(Vec<String>);

    #[async_trait]
    impl Provider for FixedListing {
        fn kind(&self) -> ProviderKind {
            ProviderKind::Kind
        }
        fn binary(&self) -> &'static str {
            "true"
        }
        fn context_name(&self, name: &str) -> String {
            name.to_string()
        }
        async fn list_clusters(&self) -> Result<Vec<String>, BackendError> {
            Ok(self.0.clone())
        }
        async fn is_running(&self, _name: &str) -> Result<bool, BackendError> {
            Ok(false)
        }
        async fn cluster_record(&self, name: &str) -> Result<serde_json::Value, BackendError> {
            Err(BackendError::ClusterNotFound(name.to_string()))
        }
        async fn stop(&self, _name: &str) -> Result<(), BackendError> {
            Ok(())
        }
        async fn start(&self, _name: &str) -> Result<(), BackendError> {
            Ok(())
        }
        async fn create(&self, _spec: &ClusterSpec) -> Result<(), BackendError> {
            Ok(())
        }
        async fn delete(&self, _name: &str) -> Result<(), BackendError> {
            Ok(())
        }
        async fn snapshot(
            &self,
            _name: &str,
            _dest_dir: &Path,
        ) -> Result<Option<SnapshotInfo>, BackendError> {
            Ok(None)
        }
        async fn kubeconfig(&self, _name: &str) -> Result<String, BackendError> {
            Ok(String::new())
        }
    }

    #[tokio::test]
    async fn test_exists_requires_exact_match() {
        let provider = FixedListing(vec!["dev-cluster".into(), "prod".into()]);
        assert!(provider.exists("prod").await.unwrap());
        assert!(provider.exists("dev-cluster").await.unwrap());
        // Substrings and prefixes are not matches
        assert!(!provider.exists("dev").await.unwrap());
        assert!(!provider.exists("pro").await.unwrap());
    }

    #[test]
    fn test_provider_kind_parsing() {
        assert_eq!(
            "minikube".parse::<ProviderKind>().unwrap(),
            ProviderKind::Minikube
        );
        assert_eq!("KIND".parse::<ProviderKind>().unwrap(), ProviderKind::Kind);
        assert_eq!("k3d".parse::<ProviderKind>().unwrap(), ProviderKind::K3d);
        assert!("docker-desktop".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_provider_kind_display_roundtrip() {
        for kind in ProviderKind::ALL {
            assert_eq!(kind.to_string().parse::<ProviderKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_provider_kind_serde_lowercase() {
        let json = serde_json::to_string(&ProviderKind::K3d).unwrap();
        assert_eq!(json, "\"k3d\"");
        let back: ProviderKind = serde_json::from_str("\"minikube\"").unwrap();
        assert_eq!(back, ProviderKind::Minikube);
    }

    #[test]
    fn test_cluster_spec_defaults() {
        let spec = ClusterSpec::with_defaults("dev".into());
        assert_eq!(spec.name, "dev");
        assert_eq!(spec.nodes, 1);
        assert!(spec.wait);
        assert!(spec.driver.is_none());
    }
}
