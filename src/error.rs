//! Custom error types and handling
//!
//! This module defines the application's error types, the per-request error
//! collection read by the request logger, and the conversion of errors to HTTP
//! responses for the Axum framework.

use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    // Resource errors
    #[error("Not found: {0}")]
    NotFound(String),

    // Internal errors
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

/// Error details in response
#[derive(Debug, Serialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
}

impl AppError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Full error text, including causes that are never shown to clients
    fn private_message(&self) -> String {
        match self {
            Self::Internal(e) => format!("{}: {:#}", self, e),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Internal details go to the access log, not to the client
        let message = match &self {
            AppError::Internal(e) => {
                tracing::debug!("Internal error details: {:#?}", e);
                "An internal error occurred".to_string()
            }
            _ => self.to_string(),
        };

        let body = ErrorResponse {
            error: ErrorDetails {
                code: self.error_code().to_string(),
                message,
            },
        };

        let mut response = (status, Json(body)).into_response();
        RequestErrors::record_private(&mut response, self.private_message());
        response
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Visibility of an error recorded while handling a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    /// Only meant for server-side logs
    Private,
    /// Safe to expose to the client
    Public,
}

/// An error recorded by a handler or middleware
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedError {
    pub kind: ErrorType,
    pub message: String,
}

/// Ordered collection of errors recorded while handling one request.
///
/// Handlers attach it to the response extensions; the request logger reads it
/// once the pipeline has completed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestErrors {
    errors: Vec<RecordedError>,
}

impl RequestErrors {
    /// Append an error to the collection
    pub fn push(&mut self, kind: ErrorType, message: impl Into<String>) {
        self.errors.push(RecordedError {
            kind,
            message: message.into(),
        });
    }

    /// Record a private error on a response
    pub fn record_private(response: &mut Response, error: impl fmt::Display) {
        Self::record(response, ErrorType::Private, error.to_string());
    }

    /// Record a public error on a response
    pub fn record_public(response: &mut Response, error: impl fmt::Display) {
        Self::record(response, ErrorType::Public, error.to_string());
    }

    fn record(response: &mut Response, kind: ErrorType, message: String) {
        let extensions = response.extensions_mut();
        if extensions.get::<RequestErrors>().is_none() {
            extensions.insert(RequestErrors::default());
        }
        if let Some(errors) = extensions.get_mut::<RequestErrors>() {
            errors.push(kind, message);
        }
    }

    /// Errors of the given type, in recording order
    pub fn by_type(&self, kind: ErrorType) -> RequestErrors {
        RequestErrors {
            errors: self
                .errors
                .iter()
                .filter(|e| e.kind == kind)
                .cloned()
                .collect(),
        }
    }

    /// Errors meant only for server-side logs
    pub fn private(&self) -> RequestErrors {
        self.by_type(ErrorType::Private)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RecordedError> {
        self.errors.iter()
    }
}

impl fmt::Display for RequestErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            writeln!(f, "Error #{:02}: {}", i + 1, error.message)?;
        }
        Ok(())
    }
}
