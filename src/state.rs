//! Application state management
//!
//! This module contains the shared application state that is passed
//! to all request handlers via Axum's State extractor.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::models::Order;
use crate::utils::now_utc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

/// Inner state (wrapped in Arc for cheap cloning)
struct AppStateInner {
    /// In-memory order store
    orders: RwLock<BTreeMap<u64, Order>>,

    /// Next order id
    next_order_id: AtomicU64,
}

impl AppState {
    /// Create a new application state
    pub fn new() -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                orders: RwLock::new(BTreeMap::new()),
                next_order_id: AtomicU64::new(1),
            }),
        }
    }

    /// Store a new order and return it
    pub async fn insert_order(&self, item: String, quantity: u32) -> Order {
        let order = Order {
            id: self.inner.next_order_id.fetch_add(1, Ordering::Relaxed),
            item,
            quantity,
            created_at: now_utc(),
        };
        self.inner
            .orders
            .write()
            .await
            .insert(order.id, order.clone());
        order
    }

    /// Look up an order by id
    pub async fn order(&self, id: u64) -> Option<Order> {
        self.inner.orders.read().await.get(&id).cloned()
    }

    /// All orders, ordered by id
    pub async fn orders(&self) -> Vec<Order> {
        self.inner.orders.read().await.values().cloned().collect()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
