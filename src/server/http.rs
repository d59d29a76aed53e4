//! HTTP transport for the `count-todos` function.
//!
//! Maps [`CountService::count`] results onto the wire:
//!
//! | Outcome                  | Status | Body                                  |
//! |--------------------------|--------|---------------------------------------|
//! | counted                  | 200    | `{"totalCount":n,"completedCount":m}` |
//! | any [`ServiceError`]     | 400    | `{"error":"<message>"}`               |
//! | panic inside the handler | 400    | `{"error":"<message>"}`               |
//! | `OPTIONS` preflight      | 200    | empty                                 |
//!
//! Every response, including preflights and method-not-allowed answers,
//! carries `Access-Control-Allow-Origin: *` and the fixed
//! `Access-Control-Allow-Headers` list so browser clients on any origin can
//! call the function.

use std::any::Any;
use std::sync::Arc;

use axum::extract::State;
use axum::http::header::{ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_ORIGIN, AUTHORIZATION};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::set_header::SetResponseHeaderLayer;

use super::aggregation::{CountService, ServiceError};
use super::config::ServiceConfig;
use crate::error::{Error, Result};
use crate::shared::http_utils::{redact_authorization, CORS_ALLOW_HEADERS, CORS_ALLOW_ORIGIN};

/// Error body returned with status 400.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Diagnostic message.
    pub error: String,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

/// Build the router serving the count function at `function_path`, plus a
/// `/health` check.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use tasklist::server::aggregation::CountService;
/// use tasklist::server::auth::MockValidator;
/// use tasklist::server::http::router;
/// use tasklist::store::InMemoryTaskStore;
///
/// let service = CountService::new(
///     Arc::new(MockValidator::new()),
///     Arc::new(InMemoryTaskStore::new()),
/// );
/// let app = router(Arc::new(service), "/functions/v1/count-todos");
/// # let _ = app;
/// ```
pub fn router(service: Arc<CountService>, function_path: &str) -> Router {
    Router::new()
        .route(
            function_path,
            post(count_todos).get(count_todos).options(preflight),
        )
        .route("/health", get(health))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static(CORS_ALLOW_ORIGIN),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(CORS_ALLOW_HEADERS),
        ))
        .with_state(service)
}

async fn count_todos(State(service): State<Arc<CountService>>, headers: HeaderMap) -> Response {
    let authorization = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    tracing::debug!(
        authorization = authorization.map(redact_authorization).as_deref().unwrap_or("<none>"),
        "count-todos request"
    );
    match service.count(authorization).await {
        Ok(count) => (StatusCode::OK, Json(count)).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "count-todos failed");
            err.into_response()
        },
    }
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = panic
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| panic.downcast_ref::<&str>().map(|s| (*s).to_string()))
        .unwrap_or_else(|| "unexpected failure".to_string());
    tracing::error!(%message, "count-todos panicked");
    ServiceError::Internal(message).into_response()
}

/// Bind `config.bind` and serve until Ctrl+C.
///
/// # Errors
///
/// Returns [`Error::Config`] if the address cannot be bound and
/// [`Error::Internal`] if the server stops with an I/O error.
pub async fn serve(config: &ServiceConfig, service: Arc<CountService>) -> Result<()> {
    let listener = TcpListener::bind(config.bind)
        .await
        .map_err(|e| Error::config(format!("failed to bind {}: {e}", config.bind)))?;
    serve_on(listener, router(service, &config.function_path)).await
}

/// Serve an already-built router on an already-bound listener until Ctrl+C.
///
/// # Errors
///
/// Returns [`Error::Internal`] if the server stops with an I/O error.
pub async fn serve_on(listener: TcpListener, app: Router) -> Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("count-todos listening on http://{addr}");
    }
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::internal(format!("server error: {e}")))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn service_error_maps_to_400_json() {
        let response = ServiceError::Store("connection refused".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "connection refused" }));
    }

    #[test]
    fn panic_payloads_become_messages() {
        let response = panic_response(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let response = panic_response(Box::new(String::from("kaboom")));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let response = panic_response(Box::new(42_u8));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
