//! Node drain prior to pausing.
//!
//! Draining is best-effort end to end: a node that refuses to drain gets a
//! warning, never an abort. Stopping a cluster with pods still scheduled is
//! acceptable; losing the pause over a stuck eviction is not.

use tracing::warn;

use crate::kubectl::Kubectl;
use crate::outcome::Advisory;
use crate::ui;

/// What the drain pass accomplished.
#[derive(Debug, Default)]
pub struct DrainOutcome {
    /// Nodes that were cordoned (recorded in state for uncordon on resume).
    pub drained: Vec<String>,
    /// Per-node problems, all advisory.
    pub warnings: Vec<Advisory>,
}

/// Cordon and drain every node in the cluster.
pub fn drain_all(kubectl: &Kubectl) -> DrainOutcome {
    let mut outcome = DrainOutcome::default();

    let nodes = match kubectl.node_names() {
        Ok(nodes) => nodes,
        Err(e) => {
            warn!(error = %e, "Could not list nodes, skipping drain");
            outcome
                .warnings
                .push(Advisory::new("drain", format!("could not list nodes: {e}")));
            return outcome;
        }
    };

    for node in nodes {
        if let Err(e) = kubectl.cordon(&node) {
            warn!(node = %node, error = %e, "Cordon failed");
            outcome
                .warnings
                .push(Advisory::new("drain", format!("cordon {node}: {e}")));
            continue;
        }

        match kubectl.drain(&node) {
            Ok(()) => {
                ui::print_info(&format!("Drained node {node}"));
                outcome.drained.push(node);
            }
            Err(e) => {
                warn!(node = %node, error = %e, "Drain failed");
                // Cordon succeeded, so still uncordon this node on resume.
                outcome
                    .warnings
                    .push(Advisory::new("drain", format!("drain {node}: {e}")));
                outcome.drained.push(node);
            }
        }
    }

    outcome
}
