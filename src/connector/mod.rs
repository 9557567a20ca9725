//! # Connector Layer
//!
//! Client-side integrations behind the [`CadClient`](crate::CadClient)
//! trait:
//! - lazy construction wrapper for the concrete per-backend RPC adapters
//! - scriptable in-memory backend for tests and development

pub mod client;

pub use client::*;
