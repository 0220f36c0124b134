//! Address rows. Addresses are created and selected, never edited or deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use lavka_core::{AddressId, UserId};

/// A persisted address row from the `addresses` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    pub user_id: UserId,
    pub title: String,
    pub address_text: String,
    pub lat: f64,
    pub lng: f64,
    pub created_at: DateTime<Utc>,
}

/// Insert shape for a new address.
#[derive(Debug, Clone, Serialize)]
pub struct NewAddress {
    pub user_id: UserId,
    pub title: String,
    pub address_text: String,
    pub lat: f64,
    pub lng: f64,
}
