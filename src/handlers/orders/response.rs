//! Order response DTOs

use serde::Serialize;

use crate::models::Order;

/// Order list response
#[derive(Debug, Serialize)]
pub struct OrdersListResponse {
    pub orders: Vec<Order>,
    pub total: usize,
}
