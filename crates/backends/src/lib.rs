//! Local Kubernetes cluster backends for kubenap.
//!
//! This crate provides a uniform [`Provider`] capability interface over the
//! local cluster tools kubenap drives (`minikube`, `kind`, `k3d`), plus
//! provider auto-detection and dry-run-aware vendor CLI execution.
//!
//! # Example
//!
//! ```rust,ignore
//! use backends::{provider_for, CommandRunner, ProviderKind};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runner = CommandRunner::new(false);
//!     let provider = provider_for(ProviderKind::Kind, runner);
//!
//!     if provider.is_running("dev").await? {
//!         provider.stop("dev").await?;
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod detect;
mod docker;
pub mod k3d;
pub mod kind;
pub mod minikube;
pub mod runner;
pub mod traits;

pub use detect::detect;
pub use runner::CommandRunner;
pub use traits::{BackendError, ClusterSpec, Provider, ProviderKind, SnapshotInfo};

use k3d::K3d;
use kind::Kind;
use minikube::Minikube;

/// Construct the backend implementation for a provider kind.
#[must_use]
pub fn provider_for(kind: ProviderKind, runner: CommandRunner) -> Box<dyn Provider> {
    match kind {
        ProviderKind::Minikube => Box::new(Minikube::new(runner)),
        ProviderKind::Kind => Box::new(Kind::new(runner)),
        ProviderKind::K3d => Box::new(K3d::new(runner)),
    }
}
