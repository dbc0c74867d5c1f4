//! State directory resolution and on-disk layout.
//!
//! Everything kubenap persists for a paused cluster lives under one state
//! directory:
//!
//! ```text
//! <state-dir>/
//!   <name>-<provider>.state.json   versioned state record
//!   <name>-kubeconfig.yaml         kubeconfig snapshot
//!   <name>-backup/                 workload YAML dump
//!   <name>-snapshot/               provider snapshot artifacts
//!   resume-<name>.sh               standalone resume script
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use backends::ProviderKind;

/// Environment variable overriding the default state directory.
pub const STATE_DIR_ENV: &str = "KUBENAP_STATE_DIR";

/// Default state directory (`~/.kube/cluster-states`).
#[must_use]
pub fn default_state_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".kube").join("cluster-states"))
}

/// Resolve the state directory: explicit flag, then environment, then the
/// default under `$HOME`.
///
/// # Errors
///
/// Returns an error if no flag or env override is given and the home
/// directory cannot be determined.
pub fn resolve_state_dir(flag: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = flag {
        return Ok(dir.to_path_buf());
    }
    if let Ok(dir) = std::env::var(STATE_DIR_ENV) {
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    default_state_dir().context("Could not determine home directory for state dir")
}

/// Path helpers for one state directory.
#[derive(Debug, Clone)]
pub struct StatePaths {
    dir: PathBuf,
}

impl StatePaths {
    #[must_use]
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// State record for a cluster/provider pair.
    #[must_use]
    pub fn state_file(&self, name: &str, provider: ProviderKind) -> PathBuf {
        self.dir.join(format!("{name}-{provider}.state.json"))
    }

    /// Kubeconfig snapshot taken at pause time.
    #[must_use]
    pub fn kubeconfig_snapshot(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}-kubeconfig.yaml"))
    }

    /// Workload backup directory.
    #[must_use]
    pub fn backup_dir(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}-backup"))
    }

    /// Provider snapshot artifacts directory.
    #[must_use]
    pub fn snapshot_dir(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}-snapshot"))
    }

    /// Standalone resume script written at pause time.
    #[must_use]
    pub fn resume_script(&self, name: &str) -> PathBuf {
        self.dir.join(format!("resume-{name}.sh"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_paths_layout() {
        let paths = StatePaths::new(PathBuf::from("/tmp/states"));
        assert_eq!(
            paths.state_file("dev", ProviderKind::Kind),
            PathBuf::from("/tmp/states/dev-kind.state.json")
        );
        assert_eq!(
            paths.kubeconfig_snapshot("dev"),
            PathBuf::from("/tmp/states/dev-kubeconfig.yaml")
        );
        assert_eq!(
            paths.backup_dir("dev"),
            PathBuf::from("/tmp/states/dev-backup")
        );
        assert_eq!(
            paths.resume_script("dev"),
            PathBuf::from("/tmp/states/resume-dev.sh")
        );
    }

    #[test]
    fn test_resolve_state_dir_prefers_flag() {
        let dir = resolve_state_dir(Some(Path::new("/explicit"))).unwrap();
        assert_eq!(dir, PathBuf::from("/explicit"));
    }

    #[test]
    fn test_default_state_dir_under_kube() {
        if let Some(dir) = default_state_dir() {
            assert!(dir.to_string_lossy().contains(".kube"));
            assert!(dir.to_string_lossy().ends_with("cluster-states"));
        }
    }
}
