use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::application::CadClient;
use crate::domain::{
    Backend, BridgeError, PlaneInfo, SketchDocument, SketchInfo, StatusMap,
};

type ClientFactory = Box<dyn Fn() -> Arc<dyn CadClient> + Send + Sync>;

/// Defers construction of a concrete RPC adapter until the first real call.
///
/// Backends the user never touches incur no adapter startup cost: `name`,
/// `default_port`, and `is_connected` answer without constructing, and
/// `disconnect` on an unconstructed client is a no-op.
pub struct LazyCadClient {
    backend: Backend,
    factory: ClientFactory,
    client: OnceLock<Arc<dyn CadClient>>,
}

impl LazyCadClient {
    pub fn new(
        backend: Backend,
        factory: impl Fn() -> Arc<dyn CadClient> + Send + Sync + 'static,
    ) -> Self {
        Self {
            backend,
            factory: Box::new(factory),
            client: OnceLock::new(),
        }
    }

    /// Whether the underlying adapter has been constructed yet.
    pub fn is_initialized(&self) -> bool {
        self.client.get().is_some()
    }

    fn client(&self) -> &Arc<dyn CadClient> {
        self.client.get_or_init(|| {
            debug!(backend = %self.backend, "constructing CAD client");
            (self.factory)()
        })
    }
}

#[async_trait]
impl CadClient for LazyCadClient {
    fn name(&self) -> &str {
        self.backend.display_name()
    }

    fn default_port(&self) -> u16 {
        self.backend.default_endpoint().port
    }

    async fn connect(&self, timeout: Duration) -> Result<bool, BridgeError> {
        self.client().connect(timeout).await
    }

    async fn disconnect(&self) -> Result<(), BridgeError> {
        match self.client.get() {
            Some(client) => client.disconnect().await,
            None => Ok(()),
        }
    }

    async fn is_connected(&self) -> bool {
        match self.client.get() {
            Some(client) => client.is_connected().await,
            None => false,
        }
    }

    async fn get_status(&self) -> Result<StatusMap, BridgeError> {
        self.client().get_status().await
    }

    async fn list_sketches(&self) -> Result<Vec<SketchInfo>, BridgeError> {
        self.client().list_sketches().await
    }

    async fn list_planes(&self) -> Result<Vec<PlaneInfo>, BridgeError> {
        self.client().list_planes().await
    }

    async fn export_sketch(&self, name: &str) -> Result<SketchDocument, BridgeError> {
        self.client().export_sketch(name).await
    }

    async fn import_sketch(
        &self,
        doc: &SketchDocument,
        name: Option<&str>,
        plane: Option<&str>,
    ) -> Result<String, BridgeError> {
        self.client().import_sketch(doc, name, plane).await
    }

    async fn open_sketch(&self, name: &str) -> Result<bool, BridgeError> {
        self.client().open_sketch(name).await
    }
}
