use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{BridgeError, PlaneInfo, SketchDocument, SketchInfo, StatusMap};

/// RPC client for one CAD backend.
///
/// Every method may fail; the connection manager treats any error as
/// "backend down" or "operation failed" and never propagates it further.
/// Implementations wrap the per-backend wire protocol and are expected to be
/// cheap to construct — expensive setup belongs behind
/// [`LazyCadClient`](crate::connector::LazyCadClient).
#[async_trait]
pub trait CadClient: Send + Sync {
    /// Display name of the backend this client talks to.
    fn name(&self) -> &str;

    /// Default RPC port for this backend.
    fn default_port(&self) -> u16;

    /// Connects to the backend's RPC server. `Ok(false)` means the server
    /// answered but refused the session.
    async fn connect(&self, timeout: Duration) -> Result<bool, BridgeError>;

    async fn disconnect(&self) -> Result<(), BridgeError>;

    async fn is_connected(&self) -> bool;

    /// Status of the backend (active document name, sketch count, ...).
    async fn get_status(&self) -> Result<StatusMap, BridgeError>;

    /// Lists the sketches in the backend's active document.
    async fn list_sketches(&self) -> Result<Vec<SketchInfo>, BridgeError>;

    /// Lists the planes a new sketch can be created on.
    async fn list_planes(&self) -> Result<Vec<PlaneInfo>, BridgeError>;

    async fn export_sketch(&self, name: &str) -> Result<SketchDocument, BridgeError>;

    /// Imports a sketch, optionally overriding its name and target plane.
    /// Returns the name the backend actually created.
    async fn import_sketch(
        &self,
        doc: &SketchDocument,
        name: Option<&str>,
        plane: Option<&str>,
    ) -> Result<String, BridgeError>;

    /// Opens a sketch for editing in the backend's UI.
    async fn open_sketch(&self, name: &str) -> Result<bool, BridgeError>;
}
