//! kubenap library.
//!
//! Programmatic access to kubenap's cluster lifecycle operations, so other
//! tools can pause/resume local clusters without going through the binary.
//!
//! # Example
//!
//! ```ignore
//! use kubenap_cli::state::ClusterState;
//! use kubenap_cli::config::StatePaths;
//!
//! let paths = StatePaths::new(kubenap_cli::config::resolve_state_dir(None)?);
//! for (path, state) in ClusterState::list(&paths)? {
//!     println!("{} ({}) paused at {}", state.cluster_name, state.provider, state.paused_at);
//! }
//! ```

// Allow product names without backticks in doc comments
#![allow(clippy::doc_markdown)]
// Allow async functions that don't use await (may need await in future)
#![allow(clippy::unused_async)]

pub mod backup;
pub mod commands;
pub mod config;
pub mod drain;
pub mod kubeconfig;
pub mod kubectl;
pub mod manifests;
pub mod outcome;
pub mod state;
pub mod ui;
pub mod validation;
pub mod validator;

// Re-export commonly used types at the crate root
pub use config::StatePaths;
pub use outcome::Advisory;
pub use state::{ClusterState, STATE_VERSION};
