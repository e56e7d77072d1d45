#![allow(clippy::unwrap_used)]
// Integration tests for `Aggregator` against a wiremock-backed API.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{any, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use headdeck_api::{Credential, MemoryCredentialStore, TransportConfig};
use headdeck_core::{Aggregator, ResourceKind};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup(token: Option<&str>) -> (MockServer, Aggregator) {
    let server = MockServer::start().await;
    let store = match token {
        Some(t) => MemoryCredentialStore::with_credential(Credential::new(t)),
        None => MemoryCredentialStore::new(),
    };
    let aggregator = Aggregator::connect(
        Url::parse(&server.uri()).unwrap(),
        Arc::new(store),
        &TransportConfig::default(),
    )
    .unwrap();
    (server, aggregator)
}

fn nodes_body(n: usize) -> serde_json::Value {
    let nodes: Vec<_> = (1..=n)
        .map(|i| {
            json!({
                "id": i.to_string(),
                "name": format!("node-{i}"),
                "user": { "id": "1", "name": "alice" }
            })
        })
        .collect();
    json!({ "nodes": nodes })
}

async fn mount_empty(server: &MockServer, endpoint: &str, envelope: &str) {
    let mut body = serde_json::Map::new();
    body.insert(envelope.to_owned(), json!([]));
    Mock::given(method("GET"))
        .and(path(endpoint))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn counts(aggregator: &Aggregator) -> Vec<usize> {
    aggregator.nav_entries().iter().map(|e| e.count).collect()
}

// ── Credential handling ─────────────────────────────────────────────

#[tokio::test]
async fn missing_credential_fetches_nothing_and_redirects() {
    let (server, aggregator) = setup(None).await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    aggregator.fetch_all().await;

    assert!(server.received_requests().await.unwrap().is_empty());
    assert_eq!(aggregator.navigation().current_path(), "/setup");
    assert_eq!(counts(&aggregator), vec![0, 0, 0, 0]);
    for kind in [
        ResourceKind::Users,
        ResourceKind::Nodes,
        ResourceKind::Routes,
        ResourceKind::ApiKeys,
    ] {
        assert!(aggregator.error(kind).is_none());
        assert!(!aggregator.is_loading(kind));
    }
}

#[tokio::test]
async fn unauthorized_keeps_data_and_sets_no_error() {
    let (server, aggregator) = setup(Some("k")).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/node"))
        .respond_with(ResponseTemplate::new(200).set_body_json(nodes_body(3)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/node"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    aggregator.fetch_nodes().await;
    assert_eq!(aggregator.count(ResourceKind::Nodes), 3);

    aggregator.fetch_nodes().await;

    let nodes = aggregator.nodes();
    assert_eq!(nodes.len(), 3);
    assert!(nodes.error.is_none());
    assert!(!nodes.loading);
    assert_eq!(aggregator.navigation().current_path(), "/setup");
    assert_eq!(
        aggregator.client().credentials().get().unwrap().expose(),
        "k"
    );
}

// ── Counts and selection ────────────────────────────────────────────

#[tokio::test]
async fn counts_follow_collection_sizes() {
    let (server, aggregator) = setup(Some("k")).await;

    mount_empty(&server, "/api/v1/user", "users").await;
    mount_empty(&server, "/api/v1/routes", "routes").await;
    mount_empty(&server, "/api/v1/apikey", "apiKeys").await;
    Mock::given(method("GET"))
        .and(path("/api/v1/node"))
        .respond_with(ResponseTemplate::new(200).set_body_json(nodes_body(3)))
        .mount(&server)
        .await;

    aggregator.fetch_all().await;

    assert_eq!(counts(&aggregator), vec![0, 3, 0, 0]);

    aggregator.navigation().navigate("/nodes");
    let selected = aggregator.selected().unwrap();
    assert_eq!(selected.label, "Nodes");
    assert_eq!(selected.count, 3);

    aggregator.navigation().navigate("/unknown");
    assert!(aggregator.selected().is_none());
}

#[tokio::test]
async fn failed_refresh_keeps_previous_data() {
    let (server, aggregator) = setup(Some("k")).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/node"))
        .respond_with(ResponseTemplate::new(200).set_body_json(nodes_body(3)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/node"))
        .respond_with(ResponseTemplate::new(500).set_body_string("db locked"))
        .mount(&server)
        .await;

    aggregator.fetch_nodes().await;
    aggregator.fetch_nodes().await;

    let nodes = aggregator.nodes();
    assert_eq!(nodes.len(), 3);
    assert_eq!(nodes.error.as_ref().unwrap().status, Some(500));
    assert_eq!(counts(&aggregator), vec![0, 3, 0, 0]);
    assert_eq!(aggregator.navigation().current_path(), "/");
}

#[tokio::test]
async fn one_failing_or_slow_collection_does_not_hold_up_the_others() {
    let (server, aggregator) = setup(Some("k")).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/user"))
        .respond_with(ResponseTemplate::new(500).set_body_string("db locked"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/node"))
        .respond_with(ResponseTemplate::new(200).set_body_json(nodes_body(3)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/routes"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "routes": [] }))
                .set_delay(Duration::from_millis(400)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/apikey"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "apiKeys": [{ "id": "1", "prefix": "abc" }, { "id": "2", "prefix": "def" }]
        })))
        .mount(&server)
        .await;

    let all = {
        let aggregator = aggregator.clone();
        tokio::spawn(async move { aggregator.fetch_all().await })
    };
    tokio::time::sleep(Duration::from_millis(150)).await;

    assert!(aggregator.is_loading(ResourceKind::Routes));
    assert_eq!(counts(&aggregator), vec![0, 3, 0, 2]);
    assert!(!aggregator.is_loading(ResourceKind::Nodes));

    all.await.unwrap();

    let users_error = aggregator.error(ResourceKind::Users).unwrap();
    assert_eq!(users_error.status, Some(500));
    for kind in [ResourceKind::Nodes, ResourceKind::Routes, ResourceKind::ApiKeys] {
        assert!(aggregator.error(kind).is_none());
        assert!(!aggregator.is_loading(kind));
    }
    assert!(!aggregator.is_loading(ResourceKind::Users));
    assert_eq!(counts(&aggregator), vec![0, 3, 0, 2]);
    assert_eq!(aggregator.navigation().current_path(), "/");
}

#[tokio::test]
async fn subscribers_see_new_data() {
    let (server, aggregator) = setup(Some("k")).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": [{ "id": "1", "name": "alice" }, { "id": "2", "name": "bob" }]
        })))
        .mount(&server)
        .await;

    let mut stream = aggregator.subscribe_users();
    assert!(stream.current().is_empty());

    aggregator.fetch_users().await;

    let snap = stream.changed().await.unwrap();
    assert_eq!(snap.len(), 2);
    assert!(!snap.loading);
    assert_eq!(snap.data[0].name, "alice");
}

// ── Stale responses ─────────────────────────────────────────────────

#[tokio::test]
async fn response_arriving_after_redirect_is_discarded() {
    let (server, aggregator) = setup(Some("k")).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/node"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(nodes_body(3))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/user"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    tokio::join!(aggregator.fetch_nodes(), aggregator.fetch_users());

    let nodes = aggregator.nodes();
    assert!(nodes.is_empty());
    assert!(!nodes.loading);
    assert_eq!(aggregator.navigation().current_path(), "/setup");
    assert_eq!(counts(&aggregator), vec![0, 0, 0, 0]);
}

#[tokio::test]
async fn newer_fetch_supersedes_older_one() {
    let (server, aggregator) = setup(Some("k")).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/node"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(nodes_body(3))
                .set_delay(Duration::from_millis(300)),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/node"))
        .respond_with(ResponseTemplate::new(200).set_body_json(nodes_body(1)))
        .mount(&server)
        .await;

    let slow = aggregator.spawn_fetch(ResourceKind::Nodes);
    tokio::time::sleep(Duration::from_millis(50)).await;

    aggregator.fetch_nodes().await;
    assert_eq!(aggregator.count(ResourceKind::Nodes), 1);

    slow.await.unwrap();

    let nodes = aggregator.nodes();
    assert_eq!(nodes.len(), 1);
    assert!(!nodes.loading);
    assert_eq!(counts(&aggregator), vec![0, 1, 0, 0]);
}
