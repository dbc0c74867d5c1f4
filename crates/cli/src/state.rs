//! Cluster state persistence.
//!
//! A state record is written once per pause and read back once per resume.
//! The record is versioned JSON written atomically (temp file + rename), so
//! a crash mid-pause can never leave a half-written record behind.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use backends::{ProviderKind, SnapshotInfo};

use crate::config::StatePaths;

/// Current state record format version. Readers reject anything newer.
pub const STATE_VERSION: u32 = 1;

/// Everything needed to resume a paused cluster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterState {
    /// Record format version.
    pub version: u32,
    /// Cluster name.
    pub cluster_name: String,
    /// Backend that owns the cluster.
    pub provider: ProviderKind,
    /// When the cluster was paused (RFC3339).
    pub paused_at: String,
    /// Whether a kubeconfig snapshot was captured.
    pub kubeconfig_saved: bool,
    /// Path to the kubeconfig snapshot, when captured.
    pub kubeconfig_path: Option<PathBuf>,
    /// Workload backup directory, when a backup was taken.
    pub workloads_backup_dir: Option<PathBuf>,
    /// Provider snapshot, when one was taken.
    #[serde(default)]
    pub snapshot: Option<SnapshotInfo>,
    /// Nodes that were cordoned+drained before stopping, to uncordon on
    /// resume.
    #[serde(default)]
    pub drained_nodes: Vec<String>,
    /// The provider's raw JSON record of the cluster at pause time.
    #[serde(default)]
    pub cluster_record: serde_json::Value,
}

impl ClusterState {
    /// Create a fresh record for a cluster being paused now.
    #[must_use]
    pub fn new(cluster_name: String, provider: ProviderKind, cluster_record: serde_json::Value) -> Self {
        Self {
            version: STATE_VERSION,
            cluster_name,
            provider,
            paused_at: chrono::Utc::now().to_rfc3339(),
            kubeconfig_saved: false,
            kubeconfig_path: None,
            workloads_backup_dir: None,
            snapshot: None,
            drained_nodes: Vec::new(),
            cluster_record,
        }
    }

    /// Save the record atomically: write a temp file in the target
    /// directory, then rename over the destination.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the write
    /// or rename fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        let dir = path
            .parent()
            .context("State file path has no parent directory")?;
        std::fs::create_dir_all(dir).context("Failed to create state directory")?;

        let content =
            serde_json::to_string_pretty(self).context("Failed to serialize cluster state")?;

        let mut tmp =
            tempfile::NamedTempFile::new_in(dir).context("Failed to create temp state file")?;
        tmp.write_all(content.as_bytes())
            .context("Failed to write state record")?;
        tmp.persist(path)
            .map_err(|e| e.error)
            .context("Failed to move state record into place")?;

        info!(path = %path.display(), "Saved cluster state");
        Ok(())
    }

    /// Load and version-check a record.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unparseable, or written by
    /// a newer kubenap.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read state file {}", path.display()))?;
        let state: Self =
            serde_json::from_str(&content).context("Failed to parse state file")?;

        if state.version > STATE_VERSION {
            bail!(
                "State file {} has version {} but this kubenap understands up to {}",
                path.display(),
                state.version,
                STATE_VERSION
            );
        }

        info!(
            cluster = %state.cluster_name,
            provider = %state.provider,
            paused_at = %state.paused_at,
            "Loaded cluster state"
        );
        Ok(state)
    }

    /// Locate the state file for a cluster.
    ///
    /// An explicit path wins. With a provider, the exact
    /// `<name>-<provider>.state.json` candidate is used. Otherwise every
    /// provider's candidate is probed; exactly one must exist.
    ///
    /// # Errors
    ///
    /// Returns an error if no candidate exists, or if the providerless
    /// search finds records under more than one provider.
    pub fn find(
        paths: &StatePaths,
        name: &str,
        provider: Option<ProviderKind>,
        explicit: Option<&Path>,
    ) -> Result<PathBuf> {
        if let Some(path) = explicit {
            if !path.exists() {
                bail!("State file not found: {}", path.display());
            }
            return Ok(path.to_path_buf());
        }

        if let Some(provider) = provider {
            let candidate = paths.state_file(name, provider);
            if !candidate.exists() {
                bail!(
                    "No state file for cluster '{name}' ({provider}) in {}",
                    paths.dir().display()
                );
            }
            return Ok(candidate);
        }

        let found: Vec<(ProviderKind, PathBuf)> = ProviderKind::ALL
            .into_iter()
            .map(|p| (p, paths.state_file(name, p)))
            .filter(|(_, path)| path.exists())
            .collect();

        match found.as_slice() {
            [] => bail!(
                "No state file for cluster '{name}' in {}",
                paths.dir().display()
            ),
            [(_, path)] => Ok(path.clone()),
            many => bail!(
                "Cluster '{name}' has state files for multiple providers ({}); pass --provider",
                many.iter()
                    .map(|(p, _)| p.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
    }

    /// All state records in the directory, for `kubenap status`.
    ///
    /// # Errors
    ///
    /// Returns an error only on directory read failure; unparseable
    /// records are skipped with a warning.
    pub fn list(paths: &StatePaths) -> Result<Vec<(PathBuf, Self)>> {
        let dir = paths.dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut states = Vec::new();
        for entry in std::fs::read_dir(dir).context("Failed to read state directory")? {
            let entry = entry?;
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.ends_with(".state.json") {
                continue;
            }
            match Self::load(&path) {
                Ok(state) => states.push((path, state)),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable state file");
                }
            }
        }

        states.sort_by(|a, b| a.1.cluster_name.cmp(&b.1.cluster_name));
        Ok(states)
    }

    /// How long ago the cluster was paused, rendered for humans.
    #[must_use]
    pub fn paused_age(&self) -> String {
        let Ok(paused) = chrono::DateTime::parse_from_rfc3339(&self.paused_at) else {
            return "unknown".to_string();
        };
        let delta = chrono::Utc::now().signed_duration_since(paused);
        if delta.num_days() > 0 {
            format!("{}d ago", delta.num_days())
        } else if delta.num_hours() > 0 {
            format!("{}h ago", delta.num_hours())
        } else {
            format!("{}m ago", delta.num_minutes().max(0))
        }
    }
}

/// Write the standalone resume script next to the state file. Kept for
/// parity with older tooling; it simply invokes `kubenap resume`.
///
/// # Errors
///
/// Returns an error if the script cannot be written.
pub fn write_resume_script(
    paths: &StatePaths,
    name: &str,
    provider: ProviderKind,
) -> Result<PathBuf> {
    let path = paths.resume_script(name);
    let script = format!(
        "#!/usr/bin/env bash\nexec kubenap resume {name} --provider {provider} --state-dir \"{}\"\n",
        paths.dir().display()
    );
    std::fs::write(&path, script).context("Failed to write resume script")?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(&path)?.permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms)?;
    }

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state(name: &str, provider: ProviderKind) -> ClusterState {
        ClusterState::new(
            name.to_string(),
            provider,
            serde_json::json!({"name": name}),
        )
    }

    #[test]
    fn test_state_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let paths = StatePaths::new(dir.path().to_path_buf());
        let path = paths.state_file("dev", ProviderKind::Kind);

        let mut state = sample_state("dev", ProviderKind::Kind);
        state.drained_nodes = vec!["dev-control-plane".to_string()];
        state.save(&path).unwrap();

        let loaded = ClusterState::load(&path).unwrap();
        assert_eq!(loaded.cluster_name, "dev");
        assert_eq!(loaded.provider, ProviderKind::Kind);
        assert_eq!(loaded.version, STATE_VERSION);
        assert_eq!(loaded.drained_nodes, vec!["dev-control-plane"]);
    }

    #[test]
    fn test_save_overwrites_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let paths = StatePaths::new(dir.path().to_path_buf());
        let path = paths.state_file("dev", ProviderKind::K3d);

        sample_state("dev", ProviderKind::K3d).save(&path).unwrap();
        let mut second = sample_state("dev", ProviderKind::K3d);
        second.kubeconfig_saved = true;
        second.save(&path).unwrap();

        let loaded = ClusterState::load(&path).unwrap();
        assert!(loaded.kubeconfig_saved);
        // No stray temp files left behind
        let extras: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter(|e| {
                !e.as_ref()
                    .unwrap()
                    .file_name()
                    .to_string_lossy()
                    .ends_with(".state.json")
            })
            .collect();
        assert!(extras.is_empty());
    }

    #[test]
    fn test_load_rejects_newer_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("future-kind.state.json");
        let mut state = sample_state("future", ProviderKind::Kind);
        state.version = STATE_VERSION + 1;
        std::fs::write(&path, serde_json::to_string(&state).unwrap()).unwrap();

        let err = ClusterState::load(&path).unwrap_err();
        assert!(err.to_string().contains("version"));
    }

    #[test]
    fn test_find_explicit_path_wins() {
        let dir = tempfile::tempdir().unwrap();
        let paths = StatePaths::new(dir.path().to_path_buf());
        let explicit = dir.path().join("elsewhere.state.json");
        sample_state("dev", ProviderKind::Kind)
            .save(&explicit)
            .unwrap();

        let found =
            ClusterState::find(&paths, "dev", None, Some(&explicit)).unwrap();
        assert_eq!(found, explicit);
    }

    #[test]
    fn test_find_by_provider_and_search() {
        let dir = tempfile::tempdir().unwrap();
        let paths = StatePaths::new(dir.path().to_path_buf());
        let path = paths.state_file("dev", ProviderKind::Minikube);
        sample_state("dev", ProviderKind::Minikube)
            .save(&path)
            .unwrap();

        // With provider
        assert_eq!(
            ClusterState::find(&paths, "dev", Some(ProviderKind::Minikube), None).unwrap(),
            path
        );
        // Providerless search finds the single record
        assert_eq!(ClusterState::find(&paths, "dev", None, None).unwrap(), path);
        // Unknown cluster
        assert!(ClusterState::find(&paths, "ghost", None, None).is_err());
    }

    #[test]
    fn test_find_ambiguous_without_provider() {
        let dir = tempfile::tempdir().unwrap();
        let paths = StatePaths::new(dir.path().to_path_buf());
        sample_state("dev", ProviderKind::Kind)
            .save(&paths.state_file("dev", ProviderKind::Kind))
            .unwrap();
        sample_state("dev", ProviderKind::K3d)
            .save(&paths.state_file("dev", ProviderKind::K3d))
            .unwrap();

        let err = ClusterState::find(&paths, "dev", None, None).unwrap_err();
        assert!(err.to_string().contains("--provider"));
    }

    #[test]
    fn test_find_ignores_similar_names() {
        let dir = tempfile::tempdir().unwrap();
        let paths = StatePaths::new(dir.path().to_path_buf());
        sample_state("dev-cluster", ProviderKind::Kind)
            .save(&paths.state_file("dev-cluster", ProviderKind::Kind))
            .unwrap();

        // "dev" must not pick up "dev-cluster"'s record
        assert!(ClusterState::find(&paths, "dev", None, None).is_err());
    }

    #[test]
    fn test_list_skips_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        let paths = StatePaths::new(dir.path().to_path_buf());
        sample_state("a", ProviderKind::Kind)
            .save(&paths.state_file("a", ProviderKind::Kind))
            .unwrap();
        std::fs::write(dir.path().join("a-kubeconfig.yaml"), "apiVersion: v1").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();

        let states = ClusterState::list(&paths).unwrap();
        assert_eq!(states.len(), 1);
        assert_eq!(states[0].1.cluster_name, "a");
    }

    #[test]
    fn test_resume_script_contents() {
        let dir = tempfile::tempdir().unwrap();
        let paths = StatePaths::new(dir.path().to_path_buf());
        let path = write_resume_script(&paths, "dev", ProviderKind::K3d).unwrap();

        let script = std::fs::read_to_string(path).unwrap();
        assert!(script.starts_with("#!/usr/bin/env bash"));
        assert!(script.contains("kubenap resume dev --provider k3d"));
    }
}
