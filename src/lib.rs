//! HTTP request logger
//!
//! Axum middleware that times every request and emits one structured access
//! log record per request, with standard HTTP metadata (client IP, status,
//! method, path, user agent, bytes in/out).
//!
//! # Features
//!
//! - Exact-match skip list for noisy paths such as health checks
//! - Error severity for every status at or above 300, with the private errors
//!   recorded by handlers as the log message
//! - Pluggable [`LogSink`](middleware::LogSink); records go to `tracing` by default
//!
//! # Usage
//!
//! ```no_run
//! use axum::{middleware::from_fn_with_state, routing::get, Router};
//! use http_request_logger::middleware::{logging_middleware, RequestLogger, RequestLoggerConfig};
//!
//! let logger = RequestLogger::with_config(RequestLoggerConfig {
//!     skip_paths: vec!["/health".to_string()],
//! });
//! let app: Router = Router::new()
//!     .route("/health", get(|| async { "ok" }))
//!     .layer(from_fn_with_state(logger, logging_middleware));
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod state;
pub mod utils;

use axum::{middleware::from_fn_with_state, Router};
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
};

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, AppResult, RequestErrors};
pub use middleware::{logging_middleware, RequestLogger, RequestLoggerConfig};
pub use state::AppState;

/// Build the application router.
///
/// Panics inside handlers are turned into 500 responses before they reach the
/// request logger, so they are still logged.
pub fn create_router(state: AppState, logger: RequestLogger) -> Router {
    Router::new()
        .merge(handlers::health::routes())
        .nest("/api/v1", handlers::routes())
        .layer(CatchPanicLayer::new())
        .layer(from_fn_with_state(logger, logging_middleware))
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        extract::Request,
        http::{header, Method, StatusCode},
        response::Response,
    };
    use tokio::task::JoinSet;
    use tower::ServiceExt;

    use super::*;
    use crate::config::LoggingConfig;
    use crate::middleware::{MemorySink, Severity};

    fn test_app(skip_paths: &[&str]) -> (Router, MemorySink) {
        let logging = LoggingConfig {
            skip_paths: skip_paths.iter().map(|p| p.to_string()).collect(),
            ..LoggingConfig::default()
        };
        let sink = MemorySink::new();
        let logger = RequestLogger::with_sink(RequestLoggerConfig::from(&logging), sink.clone());
        (create_router(AppState::new(), logger), sink)
    }

    /// Send a request and read the full body, as a client would
    async fn send(app: &Router, request: Request) -> Response {
        let response = app.clone().oneshot(request).await.unwrap();
        let (parts, body) = response.into_parts();
        let bytes = to_bytes(body, usize::MAX).await.unwrap();
        Response::from_parts(parts, Body::from(bytes))
    }

    fn get(uri: &str) -> Request {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn create_order(body: &'static str) -> Request {
        Request::builder()
            .method(Method::POST)
            .uri("/api/v1/orders")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::CONTENT_LENGTH, body.len().to_string())
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_skipped_health_check_is_not_logged() {
        let (app, sink) = test_app(&["/health"]);

        let response = send(&app, get("/health")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let health: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(health["status"], "healthy");

        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_created_order_logged_as_info() {
        let (app, sink) = test_app(&["/health"]);

        let response = send(&app, create_order(r#"{"item":"widget","quantity":3}"#)).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        let emissions = sink.emissions();
        assert_eq!(emissions.len(), 1);
        assert_eq!(emissions[0].severity, Severity::Info);
        assert_eq!(emissions[0].message, "");

        let record = &emissions[0].record;
        assert_eq!(record.status, 201);
        assert_eq!(record.method, "POST");
        assert_eq!(record.path, "/api/v1/orders");
        assert_eq!(record.bytes_in.as_deref(), Some("30"));
        assert_eq!(record.bytes_out, body.len() as i64);
    }

    #[tokio::test]
    async fn test_missing_order_logged_as_error_with_private_error() {
        let (app, sink) = test_app(&["/health"]);

        let response = send(&app, get("/api/v1/orders/999")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let emissions = sink.emissions();
        assert_eq!(emissions.len(), 1);
        assert_eq!(emissions[0].severity, Severity::Error);
        assert_eq!(emissions[0].message, "Error #01: Not found: order 999\n");
        assert_eq!(emissions[0].record.path, "/api/v1/orders/999");
    }

    #[tokio::test]
    async fn test_stored_order_can_be_fetched() {
        let (app, sink) = test_app(&[]);

        send(&app, create_order(r#"{"item":"widget","quantity":3}"#)).await;
        let response = send(&app, get("/api/v1/orders/1")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let emissions = sink.emissions();
        assert_eq!(emissions.len(), 2);
        assert!(emissions.iter().all(|e| e.severity == Severity::Info));
    }

    #[tokio::test]
    async fn test_invalid_order_logged_with_validation_error() {
        let (app, sink) = test_app(&[]);

        let response = send(&app, create_order(r#"{"item":"widget","quantity":0}"#)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let emissions = sink.emissions();
        assert_eq!(emissions[0].severity, Severity::Error);
        assert!(emissions[0].message.contains("Validation error"));
    }

    #[tokio::test]
    async fn test_redirect_logged_as_error() {
        let (app, sink) = test_app(&[]);

        let response = send(&app, get("/api/v1/docs")).await;
        assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);

        let emissions = sink.emissions();
        assert_eq!(emissions.len(), 1);
        assert_eq!(emissions[0].severity, Severity::Error);
        assert_eq!(emissions[0].message, "");
    }

    #[tokio::test]
    async fn test_unknown_route_logged_once() {
        let (app, sink) = test_app(&["/health"]);

        let response = send(&app, get("/nope")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.emissions()[0].record.path, "/nope");
    }

    #[tokio::test]
    async fn test_concurrent_requests_each_logged_once() {
        let (app, sink) = test_app(&["/health"]);

        let mut tasks = JoinSet::new();
        for i in 0..20 {
            let app = app.clone();
            tasks.spawn(async move {
                let uri = if i % 2 == 0 { "/health" } else { "/api/v1/orders" };
                app.oneshot(get(uri)).await.unwrap().status()
            });
        }
        while let Some(status) = tasks.join_next().await {
            assert_eq!(status.unwrap(), StatusCode::OK);
        }

        let emissions = sink.emissions();
        assert_eq!(emissions.len(), 10);
        assert!(emissions.iter().all(|e| e.record.path == "/api/v1/orders"));
    }
}
