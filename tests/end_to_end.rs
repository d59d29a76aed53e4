//! End-to-end: a real listener serving `count-todos`, called through
//! `HttpCountSource` from a `TaskClient`.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use tasklist::client::{CountSource, HttpCountSource, Session, TaskClient};
use tasklist::server::auth::MockValidator;
use tasklist::server::http::{router, serve_on};
use tasklist::server::CountService;
use tasklist::store::InMemoryTaskStore;
use tasklist::Error;
use tokio::net::TcpListener;
use url::Url;

const PATH: &str = "/functions/v1/count-todos";

async fn spawn_server(store: Arc<InMemoryTaskStore>) -> (Url, tokio::task::JoinHandle<()>) {
    let validator = MockValidator::new().with_token("alice-token", "alice");
    let service = Arc::new(CountService::new(Arc::new(validator), store));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let _ = serve_on(listener, router(service, PATH)).await;
    });
    let endpoint = Url::parse(&format!("http://{addr}{PATH}")).unwrap();
    (endpoint, handle)
}

#[tokio::test]
async fn test_client_counts_over_http() {
    let store = Arc::new(InMemoryTaskStore::new());
    let (endpoint, server) = spawn_server(store.clone()).await;
    let counts = Arc::new(HttpCountSource::new(endpoint).unwrap().with_api_key("anon-key"));
    let client = TaskClient::new(Session::new("alice", "alice-token"), store, counts);

    assert_eq!(client.summary().await.unwrap(), "All caught up!");

    let task = client.create("ship it").await.unwrap();
    client.create("write docs").await.unwrap();
    client.toggle_task(&task).await.unwrap();

    let counts = client.counts().await.unwrap();
    assert_eq!((counts.total_count(), counts.completed_count()), (2, 1));
    assert_eq!(client.summary().await.unwrap(), "You have 1 active task");

    server.abort();
}

#[tokio::test]
async fn test_rejected_token_surfaces_service_message() {
    let (endpoint, server) = spawn_server(Arc::new(InMemoryTaskStore::new())).await;
    let source = HttpCountSource::new(endpoint).unwrap();

    let err = source.fetch_counts("forged").await.unwrap_err();

    assert!(matches!(err, Error::Service(ref message) if message == "Invalid user token"));
    server.abort();
}
