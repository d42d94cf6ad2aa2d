//! Order domain types

use serde::{Deserialize, Serialize};

/// Order aggregate root
///
/// Built by the service layer and persisted as one header row plus one row per
/// item. `status` is a free-form label; validation belongs to the caller.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub customer_id: String,
    pub status: String,
    /// Creation time in epoch seconds
    pub created_on: i64,
    pub restaurant_id: String,
    #[serde(default)]
    pub order_items: Vec<OrderItem>,
}

/// Line item owned by an [`Order`]
///
/// `name` is a denormalized copy taken when the order was placed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_code: String,
    pub name: String,
    pub unit_price: f64,
    pub quantity: i32,
}

impl Order {
    /// Number of rows a successful insert of this order produces (header + items)
    pub fn row_count(&self) -> usize {
        1 + self.order_items.len()
    }
}
