//! Docker helpers shared by the kind and k3d backends.
//!
//! Both backends run their nodes as Docker containers tagged with a
//! cluster label; pausing a cluster means stopping those containers.

use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::runner::CommandRunner;
use crate::traits::BackendError;

/// List container names carrying `label`, including stopped containers.
pub fn containers_by_label(
    runner: &CommandRunner,
    label: &str,
) -> Result<Vec<String>, BackendError> {
    let mut cmd = Command::new("docker");
    cmd.args(["ps", "-a", "--filter"])
        .arg(format!("label={label}"))
        .args(["--format", "{{.Names}}"]);

    let out = runner.query(&mut cmd)?;
    Ok(out
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(ToOwned::to_owned)
        .collect())
}

/// List container names carrying `label` that are currently running.
pub fn running_containers_by_label(
    runner: &CommandRunner,
    label: &str,
) -> Result<Vec<String>, BackendError> {
    let mut cmd = Command::new("docker");
    cmd.args(["ps", "--filter"])
        .arg(format!("label={label}"))
        .args(["--filter", "status=running"])
        .args(["--format", "{{.Names}}"]);

    let out = runner.query(&mut cmd)?;
    Ok(out
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(ToOwned::to_owned)
        .collect())
}

/// Stop each container in turn.
pub fn stop_containers(runner: &CommandRunner, names: &[String]) -> Result<(), BackendError> {
    for name in names {
        debug!(container = %name, "stopping container");
        runner.run(Command::new("docker").args(["stop", name]))?;
    }
    Ok(())
}

/// Start each container in turn.
pub fn start_containers(runner: &CommandRunner, names: &[String]) -> Result<(), BackendError> {
    for name in names {
        debug!(container = %name, "starting container");
        runner.run(Command::new("docker").args(["start", name]))?;
    }
    Ok(())
}

/// Full `docker inspect` JSON for one container.
pub fn inspect(runner: &CommandRunner, name: &str) -> Result<serde_json::Value, BackendError> {
    let mut cmd = Command::new("docker");
    cmd.args(["inspect", name]);
    let out = runner.query(&mut cmd)?;
    serde_json::from_str(&out).map_err(|source| BackendError::Parse {
        what: "docker inspect",
        source,
    })
}

/// A compact per-container record for embedding in the cluster state file.
pub fn container_summary(
    runner: &CommandRunner,
    name: &str,
) -> Result<serde_json::Value, BackendError> {
    let full = inspect(runner, name)?;
    // docker inspect returns a one-element array
    let entry = full.get(0).cloned().unwrap_or(serde_json::Value::Null);
    Ok(serde_json::json!({
        "name": name,
        "image": entry.pointer("/Config/Image").cloned().unwrap_or(serde_json::Value::Null),
        "state": entry.pointer("/State/Status").cloned().unwrap_or(serde_json::Value::Null),
    }))
}

/// Write full inspect dumps for every container into `dest_dir`, one JSON
/// file per container. This is the kind/k3d "snapshot": container metadata
/// only, not disk state.
pub fn dump_inspect(
    runner: &CommandRunner,
    names: &[String],
    dest_dir: &Path,
) -> Result<(), BackendError> {
    std::fs::create_dir_all(dest_dir)?;
    for name in names {
        let value = inspect(runner, name)?;
        let path = dest_dir.join(format!("{name}.json"));
        let pretty = serde_json::to_string_pretty(&value).map_err(|source| BackendError::Parse {
            what: "docker inspect",
            source,
        })?;
        std::fs::write(&path, pretty)?;
        debug!(container = %name, path = %path.display(), "wrote inspect dump");
    }
    Ok(())
}
