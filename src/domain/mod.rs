//! # Domain Layer
//!
//! Core models (backends, sketch documents, transform requests) and the pure
//! geometry transform service. This layer is independent of any RPC adapter
//! or runtime concern.

pub mod models;
pub mod services;

pub use models::*;
pub use services::*;
