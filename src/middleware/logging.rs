//! Logging middleware

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;

use super::body::LoggedBody;
use super::record::{RequestRecord, RequestSnapshot};
use super::sink::{LogSink, Severity, TracingSink};
use crate::config::LoggingConfig;
use crate::error::RequestErrors;

/// Request logger options
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestLoggerConfig {
    /// Requests whose path matches one of these exactly are not logged
    #[serde(default)]
    pub skip_paths: Vec<String>,
}

impl From<&LoggingConfig> for RequestLoggerConfig {
    fn from(config: &LoggingConfig) -> Self {
        Self {
            skip_paths: config.skip_paths.clone(),
        }
    }
}

/// Shared state of the logging middleware (wrapped in Arc for cheap cloning)
#[derive(Clone)]
pub struct RequestLogger {
    inner: Arc<RequestLoggerInner>,
}

struct RequestLoggerInner {
    skip: HashSet<String>,
    sink: Arc<dyn LogSink>,
}

impl RequestLogger {
    /// Logger that skips nothing and writes to `tracing`
    pub fn new() -> Self {
        Self::with_config(RequestLoggerConfig::default())
    }

    /// Logger writing to `tracing`
    pub fn with_config(config: RequestLoggerConfig) -> Self {
        Self::with_sink(config, TracingSink)
    }

    /// Logger writing to the given sink
    pub fn with_sink(config: RequestLoggerConfig, sink: impl LogSink + 'static) -> Self {
        Self::with_shared_sink(config, Arc::new(sink))
    }

    /// Logger writing to a sink that is also held elsewhere
    pub fn with_shared_sink(config: RequestLoggerConfig, sink: Arc<dyn LogSink>) -> Self {
        Self {
            inner: Arc::new(RequestLoggerInner {
                skip: config.skip_paths.into_iter().collect(),
                sink,
            }),
        }
    }

    /// Whether requests to this (normalized) path are exempt from logging
    pub fn is_skipped(&self, path: &str) -> bool {
        self.inner.skip.contains(path)
    }

    /// Emit the record unless its path is skipped
    pub fn log(&self, record: &RequestRecord, errors: Option<&RequestErrors>) {
        if self.is_skipped(&record.path) {
            return;
        }

        let severity = Severity::for_status(record.status);
        let message = match severity {
            Severity::Error => errors
                .map(|errors| errors.private().to_string())
                .unwrap_or_default(),
            Severity::Info => String::new(),
        };

        self.inner.sink.emit(record, severity, &message);
    }
}

impl Default for RequestLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RequestLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestLogger")
            .field("skip", &self.inner.skip)
            .finish_non_exhaustive()
    }
}

/// Request logging middleware
///
/// Install with `axum::middleware::from_fn_with_state(logger, logging_middleware)`.
/// Latency covers the downstream handlers; the record itself is emitted once
/// the response body has been delivered, so `bytes_out` is the real count.
pub async fn logging_middleware(
    State(logger): State<RequestLogger>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let snapshot = RequestSnapshot::capture(&request);

    let response = next.run(request).await;

    let latency = start.elapsed();
    let record = RequestRecord::new(snapshot, response.status(), latency);
    if logger.is_skipped(&record.path) {
        return response;
    }

    let errors = response.extensions().get::<RequestErrors>().cloned();
    let (parts, body) = response.into_parts();
    let body = LoggedBody::new(body, logger, record, errors);

    Response::from_parts(parts, Body::new(body))
}
