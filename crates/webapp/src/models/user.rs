//! User rows and the Telegram profile shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use lavka_core::{TelegramId, UserId};

/// A persisted user row from the `users` collection.
///
/// `joints` is the loyalty-point balance in minor currency units. It is the
/// only field mutated in place after creation, and only by checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRow {
    pub id: UserId,
    pub telegram_id: TelegramId,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub joints: i64,
    pub created_at: DateTime<Utc>,
}

/// The read-only profile handed over by the Telegram host environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelegramUser {
    pub id: TelegramId,
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
}

impl TelegramUser {
    /// Full display name, "first last" with the last name omitted when absent.
    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.last_name {
            Some(last) => format!("{} {last}", self.first_name),
            None => self.first_name.clone(),
        }
    }
}
