//! Integration tests for the `count-todos` HTTP endpoint.
//!
//! Tests:
//! - Success: counts only the caller's tasks
//! - Authentication: missing header, bad scheme, rejected token
//! - Isolation: the store is never queried for unauthenticated requests
//! - CORS: headers on success, failure, preflight and 405 responses
//! - Store failures: surfaced as 400 with the store's message
//! - Panics: caught at the transport, still 400 JSON with CORS

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, Response, StatusCode};
use http_body_util::BodyExt;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tasklist::server::auth::MockValidator;
use tasklist::server::http::router;
use tasklist::server::CountService;
use tasklist::store::{InMemoryTaskStore, TaskStore};
use tasklist::types::{NewTask, Task};
use tasklist::{Error, Result};
use tower::ServiceExt;

const PATH: &str = "/functions/v1/count-todos";

/// Store wrapper counting every call that reaches the backend.
struct CountingStore {
    inner: InMemoryTaskStore,
    calls: AtomicUsize,
    fail_with: Option<String>,
}

impl CountingStore {
    fn new(inner: InMemoryTaskStore) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
            fail_with: None,
        }
    }

    fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::new(InMemoryTaskStore::new())
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn enter(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.fail_with {
            Some(message) => Err(Error::store(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TaskStore for CountingStore {
    async fn list(&self, owner_id: &str) -> Result<Vec<Task>> {
        self.enter()?;
        self.inner.list(owner_id).await
    }

    async fn completion_flags(&self, owner_id: &str) -> Result<Vec<bool>> {
        self.enter()?;
        self.inner.completion_flags(owner_id).await
    }

    async fn insert(&self, new_task: NewTask) -> Result<Task> {
        self.enter()?;
        self.inner.insert(new_task).await
    }

    async fn set_completed(&self, task_id: &str, owner_id: &str, completed: bool) -> Result<Task> {
        self.enter()?;
        self.inner.set_completed(task_id, owner_id, completed).await
    }

    async fn delete(&self, task_id: &str, owner_id: &str) -> Result<()> {
        self.enter()?;
        self.inner.delete(task_id, owner_id).await
    }
}

/// Store whose every operation panics.
struct PanickingStore;

#[async_trait]
impl TaskStore for PanickingStore {
    async fn list(&self, _owner_id: &str) -> Result<Vec<Task>> {
        panic!("list exploded")
    }

    async fn completion_flags(&self, _owner_id: &str) -> Result<Vec<bool>> {
        panic!("completion flags exploded")
    }

    async fn insert(&self, _new_task: NewTask) -> Result<Task> {
        panic!("insert exploded")
    }

    async fn set_completed(&self, _task_id: &str, _owner_id: &str, _completed: bool) -> Result<Task> {
        panic!("update exploded")
    }

    async fn delete(&self, _task_id: &str, _owner_id: &str) -> Result<()> {
        panic!("delete exploded")
    }
}

async fn seeded_store() -> InMemoryTaskStore {
    let store = InMemoryTaskStore::new();
    for (owner, text, completed) in [
        ("alice", "a", true),
        ("alice", "b", false),
        ("alice", "c", true),
        ("bob", "d", true),
    ] {
        let task = store.insert(NewTask::new(owner, text).unwrap()).await.unwrap();
        if completed {
            store.set_completed(&task.id, owner, true).await.unwrap();
        }
    }
    store
}

fn app(store: Arc<CountingStore>, validator: MockValidator) -> axum::Router {
    let service = CountService::new(Arc::new(validator), store);
    router(Arc::new(service), PATH)
}

fn request(method: Method, authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(PATH);
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::empty()).unwrap()
}

async fn json_body(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn assert_cors(response: &Response<Body>) {
    let headers = response.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_HEADERS],
        "authorization, x-client-info, apikey, content-type"
    );
}

#[tokio::test]
async fn test_counts_only_callers_tasks() {
    let store = Arc::new(CountingStore::new(seeded_store().await));
    let app = app(store.clone(), MockValidator::new().with_token("alice-token", "alice"));

    let response = app
        .oneshot(request(Method::POST, Some("Bearer alice-token")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_cors(&response);
    assert_eq!(
        json_body(response).await,
        json!({ "totalCount": 3, "completedCount": 2 })
    );
    assert_eq!(store.calls(), 1);
}

#[tokio::test]
async fn test_user_without_tasks_gets_zero_counts() {
    let store = Arc::new(CountingStore::new(seeded_store().await));
    let app = app(store, MockValidator::new().with_token("carol-token", "carol"));

    let response = app
        .oneshot(request(Method::GET, Some("Bearer carol-token")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({ "totalCount": 0, "completedCount": 0 })
    );
}

#[tokio::test]
async fn test_missing_header_never_reaches_validator_or_store() {
    let store = Arc::new(CountingStore::new(seeded_store().await));
    let validator = MockValidator::new().with_token("alice-token", "alice");
    let app = app(store.clone(), validator.clone());

    let response = app.oneshot(request(Method::POST, None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_cors(&response);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "No authorization header" })
    );
    assert_eq!(validator.calls(), 0);
    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn test_rejected_token_never_reaches_store() {
    let store = Arc::new(CountingStore::new(seeded_store().await));
    let validator = MockValidator::new().with_token("alice-token", "alice");
    let app = app(store.clone(), validator.clone());

    let response = app
        .oneshot(request(Method::POST, Some("Bearer forged")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await, json!({ "error": "Invalid user token" }));
    assert_eq!(validator.calls(), 1);
    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn test_non_bearer_scheme_is_treated_as_missing() {
    let store = Arc::new(CountingStore::new(seeded_store().await));
    let app = app(store.clone(), MockValidator::new());

    let response = app
        .oneshot(request(Method::POST, Some("Basic YWxpY2U6cHc=")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "No authorization header" })
    );
    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn test_store_failure_is_reported_as_400() {
    let store = Arc::new(CountingStore::failing("relation \"todos\" does not exist"));
    let app = app(store, MockValidator::new().with_token("alice-token", "alice"));

    let response = app
        .oneshot(request(Method::POST, Some("Bearer alice-token")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_cors(&response);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "relation \"todos\" does not exist" })
    );
}

#[tokio::test]
async fn test_panicking_store_becomes_400_with_cors() {
    let validator = MockValidator::new().with_token("alice-token", "alice");
    let service = CountService::new(Arc::new(validator), Arc::new(PanickingStore));
    let app = router(Arc::new(service), PATH);

    let response = app
        .oneshot(request(Method::POST, Some("Bearer alice-token")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_cors(&response);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "completion flags exploded" })
    );
}

#[tokio::test]
async fn test_preflight_returns_empty_200_with_cors() {
    let store = Arc::new(CountingStore::new(InMemoryTaskStore::new()));
    let app = app(store.clone(), MockValidator::new());

    let response = app.oneshot(request(Method::OPTIONS, None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_cors(&response);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert!(body.is_empty());
    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn test_unsupported_method_still_carries_cors() {
    let store = Arc::new(CountingStore::new(InMemoryTaskStore::new()));
    let app = app(store, MockValidator::new());

    let response = app.oneshot(request(Method::DELETE, None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_cors(&response);
}

#[tokio::test]
async fn test_health_reports_ok() {
    let store = Arc::new(CountingStore::new(InMemoryTaskStore::new()));
    let app = app(store, MockValidator::new());

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_concurrent_requests_are_independent() {
    let store = Arc::new(CountingStore::new(seeded_store().await));
    let validator = MockValidator::new()
        .with_token("alice-token", "alice")
        .with_token("bob-token", "bob");
    let app = app(store.clone(), validator);

    let mut handles = Vec::new();
    for i in 0..8 {
        let app = app.clone();
        let token = if i % 2 == 0 { "Bearer alice-token" } else { "Bearer bob-token" };
        handles.push(tokio::spawn(async move {
            let response = app.oneshot(request(Method::POST, Some(token))).await.unwrap();
            (i, json_body(response).await)
        }));
    }

    for handle in handles {
        let (i, body) = handle.await.unwrap();
        let expected = if i % 2 == 0 {
            json!({ "totalCount": 3, "completedCount": 2 })
        } else {
            json!({ "totalCount": 1, "completedCount": 1 })
        };
        assert_eq!(body, expected);
    }
    assert_eq!(store.calls(), 8);
}
