//! Routing tests against the bundled dataset, without a socket

use bytes::Bytes;
use clap::Parser;
use http_body_util::{BodyExt, Full};
use hyper::{Method, Request, Response, StatusCode};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use career_tree::graph::LayeredLayout;
use career_tree::server::{dispatch, AppState};
use career_tree::submission::{MemorySubmissionStore, SubmissionGateway, TokenBucket};
use career_tree::tree::{DatasetHandle, DatasetSource};
use career_tree::Args;

fn data_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data").join(name)
}

fn state_with(extra: &[&str], tokens: u32) -> (Arc<AppState>, Arc<MemorySubmissionStore>) {
    let mut argv = vec!["career-tree", "--dev-mode"];
    argv.extend_from_slice(extra);
    let args = Args::parse_from(argv);

    let source = DatasetSource::new(
        data_path("career_tree_data.json"),
        data_path("metadata.json"),
    );
    let dataset = DatasetHandle::open(source, Arc::new(LayeredLayout)).unwrap();

    let store = Arc::new(MemorySubmissionStore::new());
    let gateway = SubmissionGateway::new(
        Arc::new(TokenBucket::new(tokens, Duration::from_secs(3600))),
        store.clone(),
    );
    (
        Arc::new(AppState::new(args, Arc::new(dataset), gateway)),
        store,
    )
}

fn state() -> Arc<AppState> {
    state_with(&[], 7).0
}

fn client() -> SocketAddr {
    "127.0.0.1:50000".parse().unwrap()
}

fn get(uri: &str) -> Request<Full<Bytes>> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Full::new(Bytes::new()))
        .unwrap()
}

fn post(uri: &str, body: impl Into<Bytes>) -> Request<Full<Bytes>> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Full::new(body.into()))
        .unwrap()
}

async fn body_json(response: Response<Full<Bytes>>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_roots_lists_entry_points() {
    let response = dispatch(state(), client(), get("/api/roots")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );

    let body = body_json(response).await;
    assert_eq!(body[0]["key"], "10th Class");
    assert_eq!(body[0]["href"], "/explore/10th-class");
}

#[tokio::test]
async fn test_explore_found_node() {
    let response = dispatch(
        state(),
        client(),
        get("/api/explore/10th-class/science/pcm/b-tech"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "found");
    assert_eq!(body["node"]["key"], "10th Class/Science/PCM/B.Tech");
    assert_eq!(body["parent"]["key"], "10th Class/Science/PCM");
    assert_eq!(body["parent_href"], "/explore/10th-class/science/pcm");
    assert!(body["metadata"].is_object());
    assert!(body["children"]
        .as_array()
        .unwrap()
        .iter()
        .any(|c| c["href"] == "/explore/10th-class/science/pcm/b-tech/computer-science"));
}

#[tokio::test]
async fn test_explore_pending_node() {
    let response = dispatch(state(), client(), get("/api/explore/10th-class/commerce/bba")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "pending");
    assert_eq!(body["name"], "BBA");
    assert_eq!(body["parent"]["href"], "/explore/10th-class/commerce");
}

#[tokio::test]
async fn test_explore_unknown_path() {
    for uri in [
        "/api/explore/10th-class/science/astrology",
        "/api/explore/12th-class",
        "/api/explore",
    ] {
        let response = dispatch(state(), client(), get(uri)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(body_json(response).await["status"], "not_found");
    }
}

#[tokio::test]
async fn test_map_payload() {
    let response = dispatch(state(), client(), get("/api/map")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let nodes = body["nodes"].as_array().unwrap();
    assert_eq!(body["node_count"], nodes.len());
    assert!(nodes.iter().any(|n| n["id"] == "10th Class"));
    assert!(body["edges"]
        .as_array()
        .unwrap()
        .iter()
        .any(|e| e["id"] == "10th Class-10th Class/Science"));
}

#[tokio::test]
async fn test_metadata_lookup() {
    let state = state();
    let found = dispatch(
        Arc::clone(&state),
        client(),
        get("/api/metadata?key=10th+Class%2FScience%2FPCM"),
    )
    .await;
    assert_eq!(found.status(), StatusCode::OK);
    assert!(body_json(found).await.is_object());

    let missing = dispatch(Arc::clone(&state), client(), get("/api/metadata?key=10th+Class")).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let no_key = dispatch(state, client(), get("/api/metadata")).await;
    assert_eq!(no_key.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_suggest_round_trip_through_router() {
    let (state, store) = state_with(&[], 7);
    let body = json!({
        "title": "Merchant Navy",
        "description": "Deck and engine officers on commercial ships.",
        "parentPath": "10th Class/Science/PCM"
    });

    let response = dispatch(state, client(), post("/api/suggest", body.to_string())).await;
    assert_eq!(response.status(), StatusCode::OK);

    let reply = body_json(response).await;
    assert_eq!(reply["success"], true);
    assert_eq!(reply["message"], "Suggestion saved to Database!");
    assert_eq!(store.suggestions().await.len(), 1);
}

#[tokio::test]
async fn test_suggest_validation_errors() {
    let (state, store) = state_with(&[], 7);
    let body = json!({"title": "Navy", "description": "short", "parentPath": ""});

    let response = dispatch(state, client(), post("/api/suggest", body.to_string())).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let reply = body_json(response).await;
    assert_eq!(reply["success"], false);
    assert!(reply["errors"]["fieldErrors"]["title"].is_array());
    assert!(store.suggestions().await.is_empty());
}

#[tokio::test]
async fn test_rate_limited_submission() {
    let (state, _store) = state_with(&[], 1);
    let body = json!({
        "title": "Merchant Navy",
        "description": "Deck and engine officers on commercial ships.",
        "parentPath": "10th Class"
    })
    .to_string();

    let first = dispatch(Arc::clone(&state), client(), post("/api/suggest", body.clone())).await;
    assert_eq!(first.status(), StatusCode::OK);

    let second = dispatch(state, client(), post("/api/edit", body)).await;
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let (state, store) = state_with(&["--max-body-bytes", "1024"], 7);
    let body = format!(r#"{{"title": "{}"}}"#, "x".repeat(4096));

    let response = dispatch(state, client(), post("/api/suggest", body)).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(store.suggestions().await.is_empty());
}

#[tokio::test]
async fn test_preflight_and_fallback() {
    let state = state();
    let preflight = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/suggest")
        .body(Full::new(Bytes::new()))
        .unwrap();
    let response = dispatch(Arc::clone(&state), client(), preflight).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("access-control-allow-methods").unwrap(),
        "GET, POST, OPTIONS"
    );

    let missing = dispatch(Arc::clone(&state), client(), get("/api/nothing-here")).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let wrong_method = dispatch(state, client(), get("/api/suggest")).await;
    assert_eq!(wrong_method.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_in_dev_mode() {
    let response = dispatch(state(), client(), get("/health")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["healthy"], true);
    assert_eq!(body["store"]["mode"], "memory");
}
