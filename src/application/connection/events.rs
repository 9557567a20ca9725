use crate::domain::{Backend, StatusMap};

/// Notifications broadcast by the connection manager.
#[derive(Debug, Clone)]
pub enum ConnectionEvent {
    /// Connectivity flipped for a backend. Edge-triggered on the periodic
    /// probe path; manual connect/disconnect emit it unconditionally.
    ConnectivityChanged { backend: Backend, connected: bool },

    /// A probe or manual connect yielded a non-empty status while connected.
    /// Level-triggered: fires on every such observation.
    StatusUpdated { backend: Backend, status: StatusMap },
}
