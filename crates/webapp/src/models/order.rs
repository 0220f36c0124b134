//! Order and order-item rows.
//!
//! `order_items.price` is a snapshot of the product's unit price at order
//! time; later catalog price changes never affect placed orders. Invariant:
//! `orders.total_amount == sum(quantity * price) + DELIVERY_FEE`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use lavka_core::{AddressId, OrderId, OrderItemId, OrderStatus, ProductId, UserId};

/// A persisted order row from the `orders` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRow {
    pub id: OrderId,
    pub user_id: UserId,
    pub total_amount: i64,
    pub status: OrderStatus,
    pub address_id: AddressId,
    pub created_at: DateTime<Utc>,
}

/// Insert shape for a new order.
#[derive(Debug, Clone, Serialize)]
pub struct NewOrder {
    pub user_id: UserId,
    pub total_amount: i64,
    pub status: OrderStatus,
    pub address_id: AddressId,
}

/// A persisted order-item row from the `order_items` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemRow {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i64,
    pub price: i64,
    pub created_at: DateTime<Utc>,
}

/// Insert shape for one order line with its price snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct NewOrderItem {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i64,
    pub price: i64,
}
