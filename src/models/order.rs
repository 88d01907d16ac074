//! Order model

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Order kept by the in-memory store
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: u64,
    pub item: String,
    pub quantity: u32,
    pub created_at: DateTime<Utc>,
}
