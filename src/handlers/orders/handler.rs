//! Order handler implementations

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::Order,
    state::AppState,
};

use super::{request::CreateOrderRequest, response::OrdersListResponse};

/// List all orders
pub async fn list_orders(State(state): State<AppState>) -> Json<OrdersListResponse> {
    let orders = state.orders().await;
    Json(OrdersListResponse {
        total: orders.len(),
        orders,
    })
}

/// Create a new order
pub async fn create_order(
    State(state): State<AppState>,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<(StatusCode, Json<Order>)> {
    payload.validate()?;

    let order = state.insert_order(payload.item, payload.quantity).await;
    tracing::debug!(order_id = order.id, "Order created");

    Ok((StatusCode::CREATED, Json(order)))
}

/// Get an order by id
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> AppResult<Json<Order>> {
    state
        .order(id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("order {}", id)))
}
