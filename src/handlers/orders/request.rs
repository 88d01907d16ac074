//! Order request DTOs

use serde::Deserialize;
use validator::Validate;

/// Create order request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, max = 128))]
    pub item: String,

    #[validate(range(min = 1))]
    pub quantity: u32,
}
