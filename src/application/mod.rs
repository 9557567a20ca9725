//! # Application Layer
//!
//! Adapter interfaces, the connection manager, and the transfer use cases
//! coordinating domain and connector layers.

pub mod connection;
pub mod interfaces;
pub mod use_cases;

pub use connection::*;
pub use interfaces::*;
pub use use_cases::*;
