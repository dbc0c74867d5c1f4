//! Vendor CLI process execution.
//!
//! All backend operations funnel process execution through [`CommandRunner`]
//! so that `--dry-run` has a single enforcement point: mutating commands are
//! described instead of executed, read-only queries always run.

use std::process::Command;

use tracing::{debug, info};

use crate::traits::BackendError;

/// Executes vendor CLI commands, honoring dry-run mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandRunner {
    dry_run: bool,
}

impl CommandRunner {
    /// Create a runner. With `dry_run` set, mutating commands are only
    /// described, never executed.
    #[must_use]
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    #[must_use]
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Render a command line for logs and dry-run output.
    #[must_use]
    pub fn render(cmd: &Command) -> String {
        let mut parts = vec![cmd.get_program().to_string_lossy().into_owned()];
        parts.extend(cmd.get_args().map(|a| a.to_string_lossy().into_owned()));
        parts.join(" ")
    }

    /// Run a mutating command, requiring success and discarding output.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exits non-zero,
    /// with trimmed stderr in the error message.
    pub fn run(&self, cmd: &mut Command) -> Result<(), BackendError> {
        let rendered = Self::render(cmd);
        if self.dry_run {
            info!(command = %rendered, "dry-run: would execute");
            println!("  [dry-run] {rendered}");
            return Ok(());
        }

        debug!(command = %rendered, "executing");
        let output = cmd.output().map_err(|source| BackendError::Spawn {
            command: rendered.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(BackendError::CommandFailed {
                command: rendered,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }

    /// Run a mutating command with stdio inherited, so long-running vendor
    /// operations (cluster create/start) stream their own progress.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exits non-zero.
    pub fn run_visible(&self, cmd: &mut Command) -> Result<(), BackendError> {
        let rendered = Self::render(cmd);
        if self.dry_run {
            info!(command = %rendered, "dry-run: would execute");
            println!("  [dry-run] {rendered}");
            return Ok(());
        }

        debug!(command = %rendered, "executing (inherited stdio)");
        let status = cmd.status().map_err(|source| BackendError::Spawn {
            command: rendered.clone(),
            source,
        })?;

        if !status.success() {
            return Err(BackendError::CommandFailed {
                command: rendered,
                stderr: format!("exit status {status}"),
            });
        }

        Ok(())
    }

    /// Run a read-only query and capture stdout. Executes even in dry-run
    /// mode: detection and status probes are what make dry-run output
    /// meaningful.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exits non-zero.
    pub fn query(&self, cmd: &mut Command) -> Result<String, BackendError> {
        let rendered = Self::render(cmd);
        debug!(command = %rendered, "querying");

        let output = cmd.output().map_err(|source| BackendError::Spawn {
            command: rendered.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(BackendError::CommandFailed {
                command: rendered,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_includes_program_and_args() {
        let mut cmd = Command::new("kubectl");
        cmd.args(["get", "nodes", "-o", "name"]);
        assert_eq!(CommandRunner::render(&cmd), "kubectl get nodes -o name");
    }

    #[test]
    fn test_dry_run_skips_execution() {
        let runner = CommandRunner::new(true);
        // A program that cannot exist; dry-run must not try to spawn it.
        let mut cmd = Command::new("/nonexistent/kubenap-test-binary");
        cmd.arg("boom");
        assert!(runner.run(&mut cmd).is_ok());
        assert!(runner.run_visible(&mut cmd).is_ok());
    }

    #[test]
    fn test_query_runs_even_in_dry_run() {
        let runner = CommandRunner::new(true);
        let mut cmd = Command::new("/nonexistent/kubenap-test-binary");
        assert!(matches!(
            runner.query(&mut cmd),
            Err(BackendError::Spawn { .. })
        ));
    }

    #[test]
    fn test_failed_command_carries_stderr() {
        let runner = CommandRunner::new(false);
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo nope >&2; exit 3"]);
        match runner.run(&mut cmd) {
            Err(BackendError::CommandFailed { stderr, .. }) => assert_eq!(stderr, "nope"),
            other => panic!("expected CommandFailed, got {other:?}"),
        }
    }
}
