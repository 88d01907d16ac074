//! HTTP Request Handlers
//!
//! This module contains all HTTP request handlers organized by domain.

pub mod health;
pub mod orders;

use axum::{response::Redirect, routing::get, Router};

use crate::state::AppState;

/// Create all API routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/orders", orders::routes())
        .route("/docs", get(docs))
}

/// Old documentation location
async fn docs() -> Redirect {
    Redirect::permanent("/api/v1/orders")
}
