//! Scriptable in-memory CAD backend for tests and development.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::application::CadClient;
use crate::domain::{
    BridgeError, PlaneInfo, SketchDocument, SketchInfo, StatusMap,
};

/// A sketch the mock received through `import_sketch`.
#[derive(Debug, Clone)]
pub struct ImportedSketch {
    pub name: String,
    pub plane: Option<String>,
    pub doc: SketchDocument,
}

/// Per-method call counters, snapshotted by [`MockCadClient::counts`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub connect: usize,
    pub get_status: usize,
    pub list_sketches: usize,
    pub list_planes: usize,
    pub export: usize,
    pub import: usize,
    pub open: usize,
}

#[derive(Default)]
struct CallLog {
    connect: AtomicUsize,
    get_status: AtomicUsize,
    list_sketches: AtomicUsize,
    list_planes: AtomicUsize,
    export: AtomicUsize,
    import: AtomicUsize,
    open: AtomicUsize,
}

struct MockState {
    connected: bool,
    accept_connect: bool,
    fail_connect: bool,
    connect_delay: Option<Duration>,
    status: StatusMap,
    sketches: Vec<SketchInfo>,
    documents: HashMap<String, SketchDocument>,
    planes: Vec<PlaneInfo>,
    fail_status: bool,
    fail_list: bool,
    fail_import: bool,
    fail_open: bool,
    open_result: bool,
    imported: Vec<ImportedSketch>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            connected: false,
            accept_connect: true,
            fail_connect: false,
            connect_delay: None,
            status: StatusMap::new(),
            sketches: Vec::new(),
            documents: HashMap::new(),
            planes: Vec::new(),
            fail_status: false,
            fail_list: false,
            fail_import: false,
            fail_open: false,
            open_result: true,
            imported: Vec::new(),
        }
    }
}

/// Scriptable [`CadClient`]: configurable connect acceptance and delay,
/// status map, sketch listings, per-operation failure injection, captured
/// imports, and call counters.
pub struct MockCadClient {
    name: String,
    port: u16,
    state: Mutex<MockState>,
    calls: CallLog,
}

impl MockCadClient {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            port: 9876,
            state: Mutex::new(MockState::default()),
            calls: CallLog::default(),
        }
    }

    /// A backend whose RPC server refuses every session.
    pub fn refusing(name: impl Into<String>) -> Self {
        let mut client = Self::new(name);
        client.state.get_mut().accept_connect = false;
        client
    }

    pub async fn set_accept_connect(&self, accept: bool) {
        self.state.lock().await.accept_connect = accept;
    }

    /// Make `connect` return an error instead of a refusal.
    pub async fn set_fail_connect(&self, fail: bool) {
        self.state.lock().await.fail_connect = fail;
    }

    pub async fn set_connect_delay(&self, delay: Duration) {
        self.state.lock().await.connect_delay = Some(delay);
    }

    pub async fn set_status_entry(&self, key: impl Into<String>, value: serde_json::Value) {
        self.state.lock().await.status.insert(key.into(), value);
    }

    pub async fn set_fail_status(&self, fail: bool) {
        self.state.lock().await.fail_status = fail;
    }

    pub async fn set_fail_list(&self, fail: bool) {
        self.state.lock().await.fail_list = fail;
    }

    pub async fn set_fail_import(&self, fail: bool) {
        self.state.lock().await.fail_import = fail;
    }

    pub async fn set_fail_open(&self, fail: bool) {
        self.state.lock().await.fail_open = fail;
    }

    /// Registers a sketch as both listed and exportable.
    pub async fn add_sketch(&self, doc: SketchDocument) {
        let mut state = self.state.lock().await;
        state.sketches.push(
            SketchInfo::new(doc.name.clone())
                .with_counts(doc.geometry_count(), doc.constraint_count()),
        );
        state.documents.insert(doc.name.clone(), doc);
    }

    /// Registers a sketch that shows up in listings but fails to export.
    pub async fn add_unexportable_sketch(&self, info: SketchInfo) {
        self.state.lock().await.sketches.push(info);
    }

    pub async fn add_plane(&self, plane: PlaneInfo) {
        self.state.lock().await.planes.push(plane);
    }

    /// Everything delivered through `import_sketch` so far.
    pub async fn imported(&self) -> Vec<ImportedSketch> {
        self.state.lock().await.imported.clone()
    }

    pub fn counts(&self) -> CallCounts {
        CallCounts {
            connect: self.calls.connect.load(Ordering::SeqCst),
            get_status: self.calls.get_status.load(Ordering::SeqCst),
            list_sketches: self.calls.list_sketches.load(Ordering::SeqCst),
            list_planes: self.calls.list_planes.load(Ordering::SeqCst),
            export: self.calls.export.load(Ordering::SeqCst),
            import: self.calls.import.load(Ordering::SeqCst),
            open: self.calls.open.load(Ordering::SeqCst),
        }
    }
}

#[async_trait]
impl CadClient for MockCadClient {
    fn name(&self) -> &str {
        &self.name
    }

    fn default_port(&self) -> u16 {
        self.port
    }

    async fn connect(&self, _timeout: Duration) -> Result<bool, BridgeError> {
        self.calls.connect.fetch_add(1, Ordering::SeqCst);

        let (delay, accept, fail) = {
            let state = self.state.lock().await;
            (state.connect_delay, state.accept_connect, state.fail_connect)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if fail {
            return Err(BridgeError::connection("simulated connect error"));
        }
        if !accept {
            return Ok(false);
        }

        self.state.lock().await.connected = true;
        Ok(true)
    }

    async fn disconnect(&self) -> Result<(), BridgeError> {
        self.state.lock().await.connected = false;
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        self.state.lock().await.connected
    }

    async fn get_status(&self) -> Result<StatusMap, BridgeError> {
        self.calls.get_status.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().await;
        if state.fail_status {
            return Err(BridgeError::operation("simulated status failure"));
        }
        Ok(state.status.clone())
    }

    async fn list_sketches(&self) -> Result<Vec<SketchInfo>, BridgeError> {
        self.calls.list_sketches.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().await;
        if state.fail_list {
            return Err(BridgeError::operation("simulated list failure"));
        }
        Ok(state.sketches.clone())
    }

    async fn list_planes(&self) -> Result<Vec<PlaneInfo>, BridgeError> {
        self.calls.list_planes.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().await;
        if state.fail_list {
            return Err(BridgeError::operation("simulated list failure"));
        }
        Ok(state.planes.clone())
    }

    async fn export_sketch(&self, name: &str) -> Result<SketchDocument, BridgeError> {
        self.calls.export.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().await;
        state
            .documents
            .get(name)
            .cloned()
            .ok_or_else(|| BridgeError::operation(format!("no such sketch: {name}")))
    }

    async fn import_sketch(
        &self,
        doc: &SketchDocument,
        name: Option<&str>,
        plane: Option<&str>,
    ) -> Result<String, BridgeError> {
        self.calls.import.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().await;
        if state.fail_import {
            return Err(BridgeError::operation("simulated import failure"));
        }
        let created_name = name.unwrap_or(&doc.name).to_string();
        state.imported.push(ImportedSketch {
            name: created_name.clone(),
            plane: plane.map(str::to_string),
            doc: doc.clone(),
        });
        Ok(created_name)
    }

    async fn open_sketch(&self, _name: &str) -> Result<bool, BridgeError> {
        self.calls.open.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().await;
        if state.fail_open {
            return Err(BridgeError::operation("simulated open failure"));
        }
        Ok(state.open_result)
    }
}
