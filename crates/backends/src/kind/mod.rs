//! kind backend.
//!
//! Implements the [`Provider`] trait over the `kind` CLI plus `docker` for
//! per-node-container stop/start, which kind itself does not expose.
//!
//! [`Provider`]: crate::traits::Provider

mod client;

pub use client::Kind;
