//! Connection health, reconnects and the reconnect sweep
//!
//! Run with: cargo test --test health_test

use std::sync::Arc;

use mediagate_core::{BackendFactory, MediaInfo, ServerConfig};
use mediagate_gateway::{spawn_reconnect_sweep, GatewayConfig, HealthState, MediaGateway};
use mediagate_mock::MockBackendFactory;
use pretty_assertions::assert_eq;

const TWO_HOLDERS: &str = r#"
[gateway]
call_timeout_secs = 2
sweep_interval_secs = 60

[[servers]]
name = "A"
type = "mock"

[servers.config]
connected = false
libraries = [{ id = "1", name = "Films", kind = "movies" }]
movies = [{ id = "a-1", title = "Nightfall", year = 2021 }]

[[servers]]
name = "B"
type = "mock"

[servers.config]
libraries = [{ id = "1", name = "Films", kind = "movies" }]
movies = [{ id = "b-1", title = "Nightfall", year = 2021 }]
"#;

async fn gateway(toml: &str) -> (Arc<MediaGateway>, Arc<MockBackendFactory>) {
    let config = GatewayConfig::from_toml_str(toml).unwrap();
    let factory = Arc::new(MockBackendFactory::new());
    let factories: Vec<Arc<dyn BackendFactory>> = vec![factory.clone()];
    let gw = MediaGateway::from_config(&config, &factories).await;
    (Arc::new(gw), factory)
}

fn states(gw: &MediaGateway) -> Vec<(String, HealthState)> {
    gw.health_snapshot()
        .into_iter()
        .map(|h| (h.name, h.state))
        .collect()
}

fn nightfall() -> MediaInfo {
    MediaInfo::movie("Nightfall").with_year(2021)
}

#[tokio::test]
async fn test_inactive_server_skipped_until_swept() {
    let (gw, factory) = gateway(TWO_HOLDERS).await;
    let a = factory.created("A").unwrap();

    assert_eq!(gw.resolve_existence(&nightfall(), None).await.unwrap().server, "B");
    assert_eq!(a.call_count("find_movies"), 0);

    gw.periodic_reconnect_sweep().await;
    assert_eq!(
        states(&gw),
        vec![
            ("A".to_string(), HealthState::Active),
            ("B".to_string(), HealthState::Active)
        ]
    );
    assert_eq!(gw.resolve_existence(&nightfall(), None).await.unwrap().server, "A");
}

#[tokio::test]
async fn test_reconnect_is_idempotent_on_active_server() {
    let (gw, factory) = gateway(TWO_HOLDERS).await;
    let b = gw.registry().get("B").unwrap();

    assert!(b.reconnect().await);
    assert!(b.reconnect().await);
    assert_eq!(factory.created("B").unwrap().reconnect_count(), 0);

    gw.periodic_reconnect_sweep().await;
    gw.periodic_reconnect_sweep().await;
    assert_eq!(factory.created("A").unwrap().reconnect_count(), 1);
    assert_eq!(factory.created("B").unwrap().reconnect_count(), 0);
}

#[tokio::test]
async fn test_connectivity_reconnects_then_reports() {
    let (gw, factory) = gateway(TWO_HOLDERS).await;

    let report = gw.test_connectivity().await.unwrap();
    assert!(report.ok);
    assert_eq!(factory.created("A").unwrap().reconnect_count(), 1);

    factory.created("B").unwrap().set_connected(false);
    let report = gw.test_connectivity().await.unwrap();
    assert!(report.ok, "B reconnects during the test");
}

#[tokio::test]
async fn test_connectivity_fails_closed_on_unreachable_server() {
    let toml = TWO_HOLDERS.replacen(
        "connected = false",
        "connected = false\nreconnect_fails = true",
        1,
    );
    let (gw, _) = gateway(&toml).await;

    let report = gw.test_connectivity().await.unwrap();
    assert!(!report.ok);
    assert_eq!(report.message, "Cannot connect to media server: A");
}

#[tokio::test]
async fn test_server_dropping_mid_call_falls_through() {
    let (gw, factory) = gateway(TWO_HOLDERS).await;
    gw.periodic_reconnect_sweep().await;

    let a = factory.created("A").unwrap();
    a.fail_next_calls(1);

    assert_eq!(gw.resolve_existence(&nightfall(), None).await.unwrap().server, "B");
    assert_eq!(states(&gw)[0].1, HealthState::Inactive);
}

#[tokio::test(start_paused = true)]
async fn test_stalled_server_times_out() {
    let (gw, factory) = gateway(TWO_HOLDERS).await;
    gw.periodic_reconnect_sweep().await;
    factory.created("A").unwrap().set_stalled(true);

    assert_eq!(gw.resolve_existence(&nightfall(), None).await.unwrap().server, "B");
    assert_eq!(states(&gw)[0].1, HealthState::Inactive);
}

#[tokio::test(start_paused = true)]
async fn test_background_sweep_restores_server() {
    let (gw, factory) = gateway(TWO_HOLDERS).await;
    let interval = gw.settings().sweep_interval();
    let sweep = spawn_reconnect_sweep(gw.clone(), interval);

    tokio::time::sleep(interval / 2).await;
    assert_eq!(states(&gw)[0].1, HealthState::Inactive);

    tokio::time::sleep(interval).await;
    assert_eq!(states(&gw)[0].1, HealthState::Active);
    assert_eq!(factory.created("A").unwrap().reconnect_count(), 1);

    sweep.stop();
}

#[tokio::test]
async fn test_replacing_server_releases_old_connection() {
    let (gw, factory) = gateway(TWO_HOLDERS).await;
    let old = factory.created("B").unwrap();

    let replacement = ServerConfig::new("B", "mock");
    let backend = factory.connect(&replacement).await.unwrap();
    gw.registry().register(replacement, backend).await.unwrap();

    assert!(old.is_shut_down());
    assert_eq!(gw.registry().names(), vec!["A", "B"]);
    assert_eq!(gw.resolve_existence(&nightfall(), None).await, None);
}
