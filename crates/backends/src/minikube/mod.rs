//! minikube backend.
//!
//! Implements the [`Provider`] trait over the `minikube` CLI.
//!
//! [`Provider`]: crate::traits::Provider

mod client;
mod models;

pub use client::Minikube;
pub use models::{Profile, ProfileList};
