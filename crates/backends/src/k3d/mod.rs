//! k3d backend.
//!
//! Implements the [`Provider`] trait over the `k3d` CLI.
//!
//! [`Provider`]: crate::traits::Provider

mod client;
mod models;

pub use client::K3d;
pub use models::K3dCluster;
