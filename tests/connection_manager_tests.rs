//! Integration tests for the connection manager: probe semantics,
//! edge-triggered notifications, and failure isolation.

use std::sync::Arc;
use std::time::Duration;

use sketchbridge::{
    Backend, CadClient, ConnectionEvent, ConnectionManager, ManagerConfig, MockCadClient,
    SequentialProbe, SketchDocument,
};
use tokio::sync::broadcast;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn manager_with(clients: Vec<(Backend, Arc<MockCadClient>)>) -> ConnectionManager {
    let mut builder = ConnectionManager::builder();
    for (backend, client) in clients {
        builder = builder.client(backend, client);
    }
    builder.build()
}

fn drain(rx: &mut broadcast::Receiver<ConnectionEvent>) -> Vec<ConnectionEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn connectivity_edges(events: &[ConnectionEvent]) -> Vec<(Backend, bool)> {
    events
        .iter()
        .filter_map(|e| match e {
            ConnectionEvent::ConnectivityChanged { backend, connected } => {
                Some((*backend, *connected))
            }
            _ => None,
        })
        .collect()
}

fn status_updates(events: &[ConnectionEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, ConnectionEvent::StatusUpdated { .. }))
        .count()
}

#[tokio::test]
async fn test_manual_connect_caches_status_and_notifies() {
    init_tracing();
    let client = Arc::new(MockCadClient::new("FreeCAD"));
    client
        .set_status_entry("document", serde_json::json!("Part.FCStd"))
        .await;
    let manager = manager_with(vec![(Backend::FreeCad, client)]);
    let mut rx = manager.subscribe();

    assert!(manager.connect(Backend::FreeCad, Duration::from_secs(1)).await);
    assert!(manager.is_connected(Backend::FreeCad).await);
    assert_eq!(
        manager.get_status(Backend::FreeCad).await.get("document"),
        Some(&serde_json::json!("Part.FCStd"))
    );

    let events = drain(&mut rx);
    assert_eq!(connectivity_edges(&events), vec![(Backend::FreeCad, true)]);
    assert_eq!(status_updates(&events), 1);
}

#[tokio::test]
async fn test_failed_connect_clears_state_immediately() {
    init_tracing();
    let client = Arc::new(MockCadClient::new("Inventor"));
    client
        .set_status_entry("sketch_count", serde_json::json!(3))
        .await;
    let manager = manager_with(vec![(Backend::Inventor, Arc::clone(&client))]);

    assert!(manager.connect(Backend::Inventor, Duration::from_secs(1)).await);
    assert!(!manager.get_status(Backend::Inventor).await.is_empty());

    client.set_fail_connect(true).await;
    assert!(!manager.connect(Backend::Inventor, Duration::from_secs(1)).await);
    assert!(!manager.is_connected(Backend::Inventor).await);
    assert!(manager.get_status(Backend::Inventor).await.is_empty());
}

#[tokio::test]
async fn test_manual_connect_notifies_even_when_unchanged() {
    let client = Arc::new(MockCadClient::new("FreeCAD"));
    let manager = manager_with(vec![(Backend::FreeCad, client)]);
    let mut rx = manager.subscribe();

    assert!(manager.connect(Backend::FreeCad, Duration::from_secs(1)).await);
    assert!(manager.connect(Backend::FreeCad, Duration::from_secs(1)).await);

    let events = drain(&mut rx);
    assert_eq!(
        connectivity_edges(&events),
        vec![(Backend::FreeCad, true), (Backend::FreeCad, true)]
    );
}

#[tokio::test]
async fn test_probe_connectivity_is_edge_triggered() {
    init_tracing();
    let client = Arc::new(MockCadClient::new("FreeCAD"));
    client
        .set_status_entry("document", serde_json::json!("Demo"))
        .await;
    let manager = manager_with(vec![(Backend::FreeCad, client)]);
    let mut rx = manager.subscribe();

    manager.probe_now().await;
    let first = drain(&mut rx);
    assert_eq!(connectivity_edges(&first), vec![(Backend::FreeCad, true)]);
    assert_eq!(status_updates(&first), 1);

    // Reobserving the same connectivity must not fire another edge, but
    // status stays level-triggered.
    manager.probe_now().await;
    let second = drain(&mut rx);
    assert!(connectivity_edges(&second).is_empty());
    assert_eq!(status_updates(&second), 1);
}

#[tokio::test]
async fn test_probe_trusts_cached_flag_unless_revalidating() {
    let client = Arc::new(MockCadClient::new("FreeCAD"));
    let manager = manager_with(vec![(Backend::FreeCad, Arc::clone(&client))]);

    manager.probe_now().await;
    manager.probe_now().await;
    // Second cycle skips the connect and only refreshes status.
    assert_eq!(client.counts().connect, 1);
    assert_eq!(client.counts().get_status, 2);

    let client = Arc::new(MockCadClient::new("FreeCAD"));
    let manager = ConnectionManager::builder()
        .config(ManagerConfig {
            revalidate_connected: true,
            ..ManagerConfig::default()
        })
        .client(Backend::FreeCad, Arc::clone(&client) as Arc<dyn CadClient>)
        .build();

    manager.probe_now().await;
    manager.probe_now().await;
    assert_eq!(client.counts().connect, 2);
}

#[tokio::test]
async fn test_probe_status_failure_marks_disconnected() {
    let client = Arc::new(MockCadClient::new("SolidWorks"));
    client
        .set_status_entry("document", serde_json::json!("Block"))
        .await;
    let manager = manager_with(vec![(Backend::SolidWorks, Arc::clone(&client))]);
    let mut rx = manager.subscribe();

    manager.probe_now().await;
    assert!(manager.is_connected(Backend::SolidWorks).await);
    drain(&mut rx);

    client.set_fail_status(true).await;
    manager.probe_now().await;
    assert!(!manager.is_connected(Backend::SolidWorks).await);
    assert!(manager.get_status(Backend::SolidWorks).await.is_empty());
    let events = drain(&mut rx);
    assert_eq!(
        connectivity_edges(&events),
        vec![(Backend::SolidWorks, false)]
    );
}

#[tokio::test]
async fn test_probe_isolates_per_backend_failures() {
    let healthy = Arc::new(MockCadClient::new("FreeCAD"));
    let broken = Arc::new(MockCadClient::refusing("Fusion 360"));
    let manager = manager_with(vec![
        (Backend::FreeCad, Arc::clone(&healthy)),
        (Backend::Fusion, Arc::clone(&broken)),
    ]);

    manager.probe_now().await;
    assert!(manager.is_connected(Backend::FreeCad).await);
    assert!(!manager.is_connected(Backend::Fusion).await);
}

#[tokio::test]
async fn test_overlapping_probe_cycle_is_a_no_op() {
    let client = Arc::new(MockCadClient::new("FreeCAD"));
    client.set_connect_delay(Duration::from_millis(300)).await;
    let manager = Arc::new(manager_with(vec![(Backend::FreeCad, Arc::clone(&client))]));

    let slow = {
        let manager = Arc::clone(&manager);
        tokio::spawn(async move { manager.probe_now().await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    // The first cycle is still collecting; this one must perform zero
    // adapter calls.
    manager.probe_now().await;
    slow.await.expect("probe task panicked");

    assert_eq!(client.counts().connect, 1);
}

#[tokio::test]
async fn test_disconnect_clears_status_and_notifies() {
    let client = Arc::new(MockCadClient::new("FreeCAD"));
    client
        .set_status_entry("document", serde_json::json!("Demo"))
        .await;
    let manager = manager_with(vec![(Backend::FreeCad, client)]);

    assert!(manager.connect(Backend::FreeCad, Duration::from_secs(1)).await);
    let mut rx = manager.subscribe();

    manager.disconnect(Backend::FreeCad).await;
    assert!(!manager.is_connected(Backend::FreeCad).await);
    assert!(manager.get_status(Backend::FreeCad).await.is_empty());
    assert_eq!(
        connectivity_edges(&drain(&mut rx)),
        vec![(Backend::FreeCad, false)]
    );
}

#[tokio::test]
async fn test_operations_require_connection() {
    let client = Arc::new(MockCadClient::new("FreeCAD"));
    client.add_sketch(SketchDocument::new("Sketch001")).await;
    let manager = manager_with(vec![(Backend::FreeCad, Arc::clone(&client))]);

    assert!(manager.list_sketches(Backend::FreeCad).await.is_empty());
    assert!(manager.list_planes(Backend::FreeCad).await.is_empty());
    assert!(manager
        .export_sketch(Backend::FreeCad, "Sketch001")
        .await
        .is_none());
    assert!(manager
        .import_sketch(Backend::FreeCad, &SketchDocument::new("New"), None, None)
        .await
        .is_none());

    // No adapter traffic at all while disconnected.
    let counts = client.counts();
    assert_eq!(counts.list_sketches, 0);
    assert_eq!(counts.export, 0);
    assert_eq!(counts.import, 0);
}

#[tokio::test]
async fn test_failed_import_never_opens() {
    let client = Arc::new(MockCadClient::new("FreeCAD"));
    client.set_fail_import(true).await;
    let manager = manager_with(vec![(Backend::FreeCad, Arc::clone(&client))]);
    assert!(manager.connect(Backend::FreeCad, Duration::from_secs(1)).await);

    let created = manager
        .import_sketch(Backend::FreeCad, &SketchDocument::new("New"), None, None)
        .await;
    assert!(created.is_none());
    assert_eq!(client.counts().open, 0);
}

#[tokio::test]
async fn test_open_failure_does_not_affect_import_result() {
    let client = Arc::new(MockCadClient::new("FreeCAD"));
    client.set_fail_open(true).await;
    let manager = manager_with(vec![(Backend::FreeCad, Arc::clone(&client))]);
    assert!(manager.connect(Backend::FreeCad, Duration::from_secs(1)).await);

    let created = manager
        .import_sketch(Backend::FreeCad, &SketchDocument::new("New"), None, None)
        .await;
    assert_eq!(created.as_deref(), Some("New"));
    assert_eq!(client.counts().open, 1);
}

#[tokio::test]
async fn test_sequential_strategy_observes_same_semantics() {
    let a = Arc::new(MockCadClient::new("FreeCAD"));
    let b = Arc::new(MockCadClient::new("Inventor"));
    let manager = ConnectionManager::builder()
        .client(Backend::FreeCad, Arc::clone(&a) as Arc<dyn CadClient>)
        .client(Backend::Inventor, Arc::clone(&b) as Arc<dyn CadClient>)
        .strategy(Box::new(SequentialProbe))
        .build();
    let mut rx = manager.subscribe();

    manager.probe_now().await;
    manager.probe_now().await;

    let edges = connectivity_edges(&drain(&mut rx));
    assert_eq!(edges.len(), 2, "one edge per backend across both cycles");
    assert!(edges.contains(&(Backend::FreeCad, true)));
    assert!(edges.contains(&(Backend::Inventor, true)));
}

#[tokio::test]
async fn test_periodic_monitoring_start_and_stop() {
    init_tracing();
    let client = Arc::new(MockCadClient::new("FreeCAD"));
    let manager = manager_with(vec![(Backend::FreeCad, Arc::clone(&client))]);

    manager.start(Duration::from_millis(50));
    tokio::time::sleep(Duration::from_millis(200)).await;
    manager.stop();

    assert!(manager.is_connected(Backend::FreeCad).await);
    assert!(client.counts().connect >= 1);

    // stop() is idempotent and non-blocking.
    manager.stop();
}

#[tokio::test]
async fn test_list_planes_when_connected() {
    let client = Arc::new(MockCadClient::new("FreeCAD"));
    client
        .add_plane(sketchbridge::PlaneInfo {
            id: "XY_Plane".into(),
            name: "XY-Plane".into(),
            kind: "origin".into(),
        })
        .await;
    let manager = manager_with(vec![(Backend::FreeCad, Arc::clone(&client))]);
    assert!(manager.connect(Backend::FreeCad, Duration::from_secs(1)).await);

    let planes = manager.list_planes(Backend::FreeCad).await;
    assert_eq!(planes.len(), 1);
    assert_eq!(planes[0].id, "XY_Plane");

    client.set_fail_list(true).await;
    assert!(manager.list_planes(Backend::FreeCad).await.is_empty());
}

#[tokio::test]
async fn test_unregistered_backend_reads_as_disconnected() {
    let manager = manager_with(vec![]);

    assert!(!manager.is_connected(Backend::SolidWorks).await);
    assert!(manager.get_status(Backend::SolidWorks).await.is_empty());
    assert!(!manager.connect(Backend::SolidWorks, Duration::from_secs(1)).await);
    assert!(manager.registered_backends().is_empty());
}
