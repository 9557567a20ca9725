//! Connection manager: one client per backend, a periodic liveness/status
//! probe, and edge-triggered change notifications.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::application::connection::{
    ConnectionEvent, PooledProbe, ProbeStrategy, ProbeTarget,
};
use crate::application::interfaces::CadClient;
use crate::domain::{Backend, BridgeError, PlaneInfo, SketchDocument, SketchInfo, StatusMap};

/// Default monitoring interval between probe cycles.
pub const DEFAULT_PROBE_INTERVAL: Duration = Duration::from_secs(5);

/// Tuning knobs for the connection manager.
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Per-call deadline for probe connect and status fetches.
    pub probe_timeout: Duration,
    /// When false, a backend already marked connected is trusted alive by the
    /// probe cycle and only its status is refreshed. A backend that silently
    /// died therefore stays reported connected until a status fetch or a real
    /// operation against it fails. Set to true to re-run the short-timeout
    /// connect on every cycle and close that staleness window.
    pub revalidate_connected: bool,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            probe_timeout: Duration::from_secs(1),
            revalidate_connected: false,
        }
    }
}

/// Cached connectivity for one backend. Status is non-empty only while
/// connected; every transition to disconnected clears it.
#[derive(Debug, Default)]
struct ConnectionRecord {
    connected: bool,
    status: StatusMap,
}

struct Inner {
    clients: HashMap<Backend, Arc<dyn CadClient>>,
    /// Single writer discipline: probe collection and manual
    /// connect/disconnect both write under this lock.
    records: Mutex<HashMap<Backend, ConnectionRecord>>,
    events: broadcast::Sender<ConnectionEvent>,
    /// Re-entrancy guard: at most one probe cycle in flight.
    probing: AtomicBool,
    config: ManagerConfig,
    strategy: Box<dyn ProbeStrategy>,
}

/// Owns the per-backend connection state and the periodic probe task.
///
/// Other components never see the state directly; they go through the query
/// and command methods, or subscribe to [`ConnectionEvent`]s.
pub struct ConnectionManager {
    inner: Arc<Inner>,
    monitor: StdMutex<Option<JoinHandle<()>>>,
}

pub struct ConnectionManagerBuilder {
    config: ManagerConfig,
    clients: HashMap<Backend, Arc<dyn CadClient>>,
    strategy: Box<dyn ProbeStrategy>,
}

impl ConnectionManagerBuilder {
    fn new() -> Self {
        Self {
            config: ManagerConfig::default(),
            clients: HashMap::new(),
            strategy: Box::new(PooledProbe),
        }
    }

    pub fn config(mut self, config: ManagerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn client(mut self, backend: Backend, client: Arc<dyn CadClient>) -> Self {
        self.clients.insert(backend, client);
        self
    }

    pub fn strategy(mut self, strategy: Box<dyn ProbeStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn build(self) -> ConnectionManager {
        let (events, _) = broadcast::channel(64);
        let records = Backend::ALL
            .iter()
            .map(|b| (*b, ConnectionRecord::default()))
            .collect();

        ConnectionManager {
            inner: Arc::new(Inner {
                clients: self.clients,
                records: Mutex::new(records),
                events,
                probing: AtomicBool::new(false),
                config: self.config,
                strategy: self.strategy,
            }),
            monitor: StdMutex::new(None),
        }
    }
}

impl ConnectionManager {
    pub fn builder() -> ConnectionManagerBuilder {
        ConnectionManagerBuilder::new()
    }

    /// Backends that have a registered client, in enum order.
    pub fn registered_backends(&self) -> Vec<Backend> {
        Backend::ALL
            .iter()
            .copied()
            .filter(|b| self.inner.clients.contains_key(b))
            .collect()
    }

    /// Subscribes to connectivity and status notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<ConnectionEvent> {
        self.inner.events.subscribe()
    }

    /// Starts periodic monitoring ([`DEFAULT_PROBE_INTERVAL`] is a sensible
    /// interval). The first cycle runs immediately; each tick spawns its own
    /// cycle task so the timer is never blocked by a slow backend.
    pub fn start(&self, interval: Duration) {
        self.stop();

        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let inner = Arc::clone(&inner);
                tokio::spawn(async move { inner.run_probe_cycle().await });
            }
        });

        *self.monitor.lock().expect("monitor lock poisoned") = Some(handle);
        info!(interval_ms = interval.as_millis() as u64, "connection monitoring started");
    }

    /// Stops the periodic timer without waiting for an in-flight cycle:
    /// already-dispatched probes run to completion or timeout on their own.
    pub fn stop(&self) {
        if let Some(handle) = self.monitor.lock().expect("monitor lock poisoned").take() {
            handle.abort();
            info!("connection monitoring stopped");
        }
    }

    /// Runs one probe cycle inline, honoring the re-entrancy guard.
    pub async fn probe_now(&self) {
        self.inner.run_probe_cycle().await;
    }

    /// Manual connect. Always emits a connectivity notification, even when
    /// the flag did not change — this is an explicit user action, unlike the
    /// periodic probe path.
    pub async fn connect(&self, backend: Backend, timeout: Duration) -> bool {
        let Some(client) = self.inner.clients.get(&backend).cloned() else {
            warn!(backend = %backend, "connect requested for unregistered backend");
            return false;
        };

        let probe = async {
            if client.connect(timeout).await? {
                let status = client.get_status().await?;
                Ok::<_, BridgeError>((true, status))
            } else {
                Ok((false, StatusMap::new()))
            }
        };
        let attempt = tokio::time::timeout(timeout, probe).await;

        let (connected, status) = match attempt {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                warn!(backend = %backend, error = %e, "manual connect failed");
                (false, StatusMap::new())
            }
            Err(_) => {
                warn!(backend = %backend, "manual connect timed out");
                (false, StatusMap::new())
            }
        };

        {
            let mut records = self.inner.records.lock().await;
            let record = records.entry(backend).or_default();
            record.connected = connected;
            record.status = status.clone();
        }

        self.inner.emit(ConnectionEvent::ConnectivityChanged { backend, connected });
        if connected && !status.is_empty() {
            self.inner.emit(ConnectionEvent::StatusUpdated { backend, status });
        }
        connected
    }

    /// Disconnects a backend, clears its cached status, and notifies
    /// unconditionally. Adapter errors are swallowed.
    pub async fn disconnect(&self, backend: Backend) {
        if let Some(client) = self.inner.clients.get(&backend) {
            if let Err(e) = client.disconnect().await {
                warn!(backend = %backend, error = %e, "disconnect reported an error");
            }
        }

        {
            let mut records = self.inner.records.lock().await;
            let record = records.entry(backend).or_default();
            record.connected = false;
            record.status.clear();
        }

        self.inner.emit(ConnectionEvent::ConnectivityChanged {
            backend,
            connected: false,
        });
    }

    /// Cached connectivity flag; never touches the adapter.
    pub async fn is_connected(&self, backend: Backend) -> bool {
        let records = self.inner.records.lock().await;
        records.get(&backend).map(|r| r.connected).unwrap_or(false)
    }

    /// Cached status; empty whenever the backend is not connected.
    pub async fn get_status(&self, backend: Backend) -> StatusMap {
        let records = self.inner.records.lock().await;
        records
            .get(&backend)
            .map(|r| r.status.clone())
            .unwrap_or_default()
    }

    /// Lists sketches in the backend's active document. Not connected or any
    /// adapter error both yield an empty list.
    pub async fn list_sketches(&self, backend: Backend) -> Vec<SketchInfo> {
        let Some(client) = self.connected_client(backend).await else {
            return Vec::new();
        };
        match client.list_sketches().await {
            Ok(sketches) => sketches,
            Err(e) => {
                warn!(backend = %backend, error = %e, "list_sketches failed");
                Vec::new()
            }
        }
    }

    /// Lists planes available for sketch creation; empty when not connected
    /// or on any adapter error.
    pub async fn list_planes(&self, backend: Backend) -> Vec<PlaneInfo> {
        let Some(client) = self.connected_client(backend).await else {
            return Vec::new();
        };
        match client.list_planes().await {
            Ok(planes) => planes,
            Err(e) => {
                warn!(backend = %backend, error = %e, "list_planes failed");
                Vec::new()
            }
        }
    }

    /// Exports one sketch. `None` when not connected or on any adapter error;
    /// the connectivity flag is left for the next probe to correct.
    pub async fn export_sketch(&self, backend: Backend, name: &str) -> Option<SketchDocument> {
        let client = self.connected_client(backend).await?;
        match client.export_sketch(name).await {
            Ok(doc) => Some(doc),
            Err(e) => {
                warn!(backend = %backend, sketch = name, error = %e, "export failed");
                None
            }
        }
    }

    /// Imports a sketch and returns the created name, or `None` on failure.
    /// On success the sketch is opened in the remote UI as a best-effort side
    /// effect; its failure never changes the result.
    pub async fn import_sketch(
        &self,
        backend: Backend,
        doc: &SketchDocument,
        name: Option<&str>,
        plane: Option<&str>,
    ) -> Option<String> {
        let client = self.connected_client(backend).await?;
        match client.import_sketch(doc, name, plane).await {
            Ok(created_name) => {
                if let Err(e) = client.open_sketch(&created_name).await {
                    debug!(backend = %backend, sketch = %created_name, error = %e,
                        "best-effort open after import failed");
                }
                Some(created_name)
            }
            Err(e) => {
                warn!(backend = %backend, error = %e, "import failed");
                None
            }
        }
    }

    async fn connected_client(&self, backend: Backend) -> Option<Arc<dyn CadClient>> {
        if !self.is_connected(backend).await {
            return None;
        }
        self.inner.clients.get(&backend).cloned()
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        if let Ok(mut monitor) = self.monitor.lock() {
            if let Some(handle) = monitor.take() {
                handle.abort();
            }
        }
    }
}

impl Inner {
    /// One probe cycle. Skipped entirely when the previous cycle has not
    /// finished collecting its results.
    async fn run_probe_cycle(&self) {
        if self.probing.swap(true, Ordering::SeqCst) {
            debug!("probe cycle still in flight, skipping tick");
            return;
        }

        let targets: Vec<ProbeTarget> = {
            let records = self.records.lock().await;
            Backend::ALL
                .iter()
                .filter_map(|backend| {
                    let client = self.clients.get(backend)?;
                    Some(ProbeTarget {
                        backend: *backend,
                        client: Arc::clone(client),
                        already_connected: records
                            .get(backend)
                            .map(|r| r.connected)
                            .unwrap_or(false),
                        revalidate: self.config.revalidate_connected,
                        timeout: self.config.probe_timeout,
                    })
                })
                .collect()
        };

        let outcomes = self.strategy.run(targets).await;

        {
            let mut records = self.records.lock().await;
            for outcome in outcomes {
                let record = records.entry(outcome.backend).or_default();
                let was_connected = record.connected;
                record.connected = outcome.connected;
                record.status = outcome.status.clone();

                if outcome.connected && !outcome.status.is_empty() {
                    self.emit(ConnectionEvent::StatusUpdated {
                        backend: outcome.backend,
                        status: outcome.status,
                    });
                }

                if outcome.connected != was_connected {
                    info!(backend = %outcome.backend, connected = outcome.connected,
                        "connectivity changed");
                    self.emit(ConnectionEvent::ConnectivityChanged {
                        backend: outcome.backend,
                        connected: outcome.connected,
                    });
                }
            }
        }

        self.probing.store(false, Ordering::SeqCst);
    }

    fn emit(&self, event: ConnectionEvent) {
        // Nobody listening is fine.
        let _ = self.events.send(event);
    }
}
