//! Product rows. The catalog is read-only from the client's perspective.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use lavka_core::ProductId;

/// A persisted product row from the `products` collection.
///
/// `price` is the unit price in minor currency units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub stock: i64,
    pub created_at: DateTime<Utc>,
}

/// Insert shape for seeding the catalog (used by the CLI only).
#[derive(Debug, Clone, Serialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub stock: i64,
}
