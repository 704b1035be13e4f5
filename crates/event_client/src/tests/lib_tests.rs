use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};
use shared::{domain::EventRecord, error::ErrorCode};
use tokio::{net::TcpListener, sync::Mutex};

use super::*;

#[derive(Clone, Default)]
struct StoreState {
    seen: Arc<Mutex<Vec<(String, Value)>>>,
}

async fn fake_search(
    State(state): State<StoreState>,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.seen.lock().await.push(("search".into(), body));
    Json(json!({
        "records": [
            { "id": "svc-1", "type": "network", "timestamp": 200, "data": "up" },
            { "id": "svc-2", "type": "deploy", "timestamp": 100 },
        ]
    }))
}

async fn fake_read(
    State(state): State<StoreState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    state.seen.lock().await.push(("read".into(), body.clone()));
    match body["id"].as_str() {
        Some("svc-1") => Ok(Json(json!({
            "record": { "id": "svc-1", "type": "network", "timestamp": 200 }
        }))),
        Some("broken") => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "code": "internal", "message": "disk full" })),
        )),
        _ => Err((
            StatusCode::NOT_FOUND,
            Json(json!({ "code": "not_found", "message": "no such record" })),
        )),
    }
}

async fn spawn_store(prefix: &str) -> (String, StoreState) {
    let state = StoreState::default();
    let routes = Router::new()
        .route("/event/search", post(fake_search))
        .route("/event/read", post(fake_read));
    let app = if prefix.is_empty() {
        routes.with_state(state.clone())
    } else {
        Router::new()
            .nest(prefix, routes)
            .with_state(state.clone())
    };

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}{prefix}"), state)
}

#[tokio::test]
async fn http_search_posts_criteria_and_decodes_records() {
    let (url, state) = spawn_store("").await;
    let store = HttpEventStore::new(&url).expect("store");

    let response = store
        .search(&SearchRequest::filtered("", "network"))
        .await
        .expect("search");
    assert_eq!(response.records.len(), 2);
    assert_eq!(response.records[0].payload["data"], "up");

    let seen = state.seen.lock().await;
    assert_eq!(seen[0].0, "search");
    assert_eq!(
        seen[0].1,
        json!({ "id": "", "type": "network", "reverse": true })
    );
}

#[tokio::test]
async fn http_store_honours_base_path_prefix() {
    let (url, _state) = spawn_store("/api").await;
    let store = HttpEventStore::new(&url).expect("store");
    assert!(store.base_url().path().ends_with("/api/"));

    let response = store
        .read(&ReadRequest { id: "svc-1".into() })
        .await
        .expect("read");
    assert_eq!(response.record, EventRecord::new("svc-1", "network", 200));
}

#[tokio::test]
async fn http_read_maps_missing_record_to_not_found() {
    let (url, _state) = spawn_store("").await;
    let store = HttpEventStore::new(&url).expect("store");

    let err = store
        .read(&ReadRequest { id: "ghost".into() })
        .await
        .expect_err("should fail");
    assert!(err.is_not_found());
}

#[tokio::test]
async fn http_read_surfaces_remote_error_body() {
    let (url, _state) = spawn_store("").await;
    let store = HttpEventStore::new(&url).expect("store");

    let err = store
        .read(&ReadRequest { id: "broken".into() })
        .await
        .expect_err("should fail");
    match err {
        StoreError::Remote { status, source } => {
            assert_eq!(status, 500);
            assert_eq!(source.code, ErrorCode::Internal);
            assert_eq!(source.message, "disk full");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn http_store_rejects_invalid_url() {
    let err = HttpEventStore::new("not a url").expect_err("should fail");
    assert!(matches!(err, StoreError::InvalidUrl(_)));
}

#[tokio::test]
async fn http_store_reports_unreachable_backend() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let store = HttpEventStore::new(&format!("http://{addr}")).expect("store");
    let err = store
        .search(&SearchRequest::newest_first())
        .await
        .expect_err("should fail");
    assert!(matches!(err, StoreError::Transport(_)));
}

fn seeded() -> MemoryEventStore {
    MemoryEventStore::new([
        EventRecord::new("svc-1", "network", 100),
        EventRecord::new("svc-2", "deploy", 300),
        EventRecord::new("svc-1", "deploy", 200),
    ])
}

#[tokio::test]
async fn memory_search_ands_filters_and_ignores_empty_ones() {
    let store = seeded();

    let all = store
        .search(&SearchRequest::newest_first())
        .await
        .expect("search");
    let stamps: Vec<i64> = all.records.iter().map(|r| r.timestamp).collect();
    assert_eq!(stamps, vec![300, 200, 100]);

    let both = store
        .search(&SearchRequest::filtered("svc-1", "deploy"))
        .await
        .expect("search");
    assert_eq!(both.records, vec![EventRecord::new("svc-1", "deploy", 200)]);

    let by_type = store
        .search(&SearchRequest::filtered("", "deploy"))
        .await
        .expect("search");
    assert_eq!(by_type.records.len(), 2);

    assert_eq!(store.searches().await.len(), 3);
}

#[tokio::test]
async fn memory_search_without_reverse_is_oldest_first() {
    let store = seeded();
    let response = store
        .search(&SearchRequest::default())
        .await
        .expect("search");
    assert_eq!(response.records[0].timestamp, 100);
}

#[tokio::test]
async fn memory_read_returns_latest_record_for_resource() {
    let store = seeded();
    let response = store
        .read(&ReadRequest { id: "svc-1".into() })
        .await
        .expect("read");
    assert_eq!(response.record.timestamp, 200);

    let err = store
        .read(&ReadRequest { id: "nope".into() })
        .await
        .expect_err("should fail");
    assert!(err.is_not_found());
    assert_eq!(store.reads().await, vec!["svc-1".to_string(), "nope".to_string()]);
}

#[tokio::test]
async fn unavailable_memory_store_fails_every_call() {
    let store = MemoryEventStore::unavailable("backend down");
    let err = store
        .search(&SearchRequest::newest_first())
        .await
        .expect_err("should fail");
    assert!(matches!(err, StoreError::Unavailable(_)));
    assert!(store
        .read(&ReadRequest { id: "a".into() })
        .await
        .is_err());
}
