//! Order handlers

mod handler;
pub mod request;
pub mod response;

pub use handler::*;
pub use request::*;
pub use response::*;

use axum::{routing::get, Router};

use crate::state::AppState;

/// Order routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::list_orders).post(handler::create_order))
        .route("/{id}", get(handler::get_order))
}
