//! Router tests driving the endpoints in-process.

use actlog_core::ActivityStore as _;
use actlog_store_file::FileStore;
use axum::{
  body::Body,
  http::{Request, StatusCode, header},
};
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use tower::ServiceExt as _;

use super::*;

async fn make_shell() -> (tempfile::TempDir, Shell<FileStore>) {
  let dir = tempfile::tempdir().unwrap();
  let store = FileStore::open(dir.path().join("activities.db")).await.unwrap();
  (dir, Shell::new(store))
}

async fn oneshot_json(
  shell:  Shell<FileStore>,
  method: &str,
  uri:    &str,
  body:   Option<Value>,
) -> (StatusCode, Value) {
  let builder = Request::builder()
    .method(method)
    .uri(uri)
    .header(header::CONTENT_TYPE, "application/json");
  let body = body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty);
  let req = builder.body(body).unwrap();

  let resp = ipc_router(shell).oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
  (status, value)
}

// ── log-activity ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn log_activity_returns_201_with_stored_record() {
  let (_dir, shell) = make_shell().await;
  let before = Utc::now();

  let (status, body) = oneshot_json(
    shell.clone(),
    "POST",
    LOG_ACTIVITY,
    Some(json!({ "kind": "focus", "app": "editor", "timestamp": "2000-01-01" })),
  )
  .await;

  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["kind"], json!("focus"));
  assert_eq!(body["app"], json!("editor"));
  assert!(body["_id"].is_string());

  let at: DateTime<Utc> = serde_json::from_value(body["timestamp"].clone()).unwrap();
  assert!(at >= before);

  assert_eq!(shell.store().query_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn log_activity_rejects_non_object_body() {
  let (_dir, shell) = make_shell().await;

  let (status, _) =
    oneshot_json(shell.clone(), "POST", LOG_ACTIVITY, Some(json!("just a string"))).await;

  assert!(status.is_client_error());
  assert!(shell.store().is_empty().await);
}

// ── get-activities ───────────────────────────────────────────────────────────

#[tokio::test]
async fn get_activities_on_empty_store_is_empty_array() {
  let (_dir, shell) = make_shell().await;
  let (status, body) = oneshot_json(shell, "GET", GET_ACTIVITIES, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!([]));
}

#[tokio::test]
async fn get_activities_is_newest_first() {
  let (_dir, shell) = make_shell().await;
  for i in 0..5 {
    shell.log_activity(NewActivity::new().with("seq", i)).await.unwrap();
  }

  let (status, body) = oneshot_json(shell, "GET", GET_ACTIVITIES, None).await;
  assert_eq!(status, StatusCode::OK);

  let activities: Vec<Activity> = serde_json::from_value(body).unwrap();
  assert_eq!(activities.len(), 5);
  assert!(activities.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
}

// ── Lifecycle ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn endpoints_return_503_after_teardown() {
  let (_dir, shell) = make_shell().await;
  shell.begin_teardown().await;

  let (status, body) =
    oneshot_json(shell.clone(), "POST", LOG_ACTIVITY, Some(json!({ "kind": "late" }))).await;
  assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
  assert_eq!(body["error"], json!("activity store is not ready"));

  let (status, _) = oneshot_json(shell.clone(), "GET", GET_ACTIVITIES, None).await;
  assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

  assert!(shell.store().is_empty().await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_through_the_router() {
  let (_dir, shell) = make_shell().await;

  let handles: Vec<_> = (0..50)
    .map(|i| {
      let shell = shell.clone();
      tokio::spawn(async move {
        oneshot_json(shell, "POST", LOG_ACTIVITY, Some(json!({ "n": i }))).await
      })
    })
    .collect();

  for h in handles {
    let (status, _) = h.await.unwrap();
    assert_eq!(status, StatusCode::CREATED);
  }

  let (_, body) = oneshot_json(shell, "GET", GET_ACTIVITIES, None).await;
  assert_eq!(body.as_array().unwrap().len(), 50);
}
