//! Provider auto-detection.
//!
//! Given a cluster name and no explicit provider, probe each backend's
//! listing in a fixed order. A name must match a listing entry exactly;
//! substring matches are not detection hits.

use tracing::debug;

use crate::provider_for;
use crate::runner::CommandRunner;
use crate::traits::{BackendError, ProviderKind};

/// Find the provider that owns `name`.
///
/// Probes minikube, kind, and k3d in that order. Backends whose binary is
/// not installed, or whose listing probe fails, are skipped.
///
/// # Errors
///
/// Returns [`BackendError::ClusterNotFound`] when no backend lists the
/// name, and [`BackendError::Ambiguous`] when more than one does; the
/// caller must then name the provider explicitly.
pub async fn detect(runner: CommandRunner, name: &str) -> Result<ProviderKind, BackendError> {
    let mut matches = Vec::new();

    for kind in ProviderKind::ALL {
        let provider = provider_for(kind, runner);
        if !provider.is_available() {
            debug!(provider = %kind, "binary not installed, skipping probe");
            continue;
        }

        match provider.list_clusters().await {
            Ok(clusters) => {
                if clusters.iter().any(|c| c == name) {
                    matches.push(kind);
                }
            }
            Err(e) => {
                debug!(provider = %kind, error = %e, "listing probe failed, skipping");
            }
        }
    }

    match matches.as_slice() {
        [] => Err(BackendError::ClusterNotFound(name.to_string())),
        [kind] => Ok(*kind),
        many => Err(BackendError::Ambiguous {
            name: name.to_string(),
            providers: many
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // detect() itself needs live vendor CLIs; the exact-match contract is
    // what matters and is testable in isolation.
    #[test]
    fn test_exact_match_rejects_substrings() {
        let clusters = ["dev-cluster".to_string(), "production".to_string()];
        assert!(!clusters.iter().any(|c| c == "dev"));
        assert!(!clusters.iter().any(|c| c == "prod"));
        assert!(clusters.iter().any(|c| c == "dev-cluster"));
    }

    #[test]
    fn test_probe_order_is_fixed() {
        assert_eq!(
            ProviderKind::ALL,
            [ProviderKind::Minikube, ProviderKind::Kind, ProviderKind::K3d]
        );
    }
}
