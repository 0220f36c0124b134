//! User store: profile upsert, lookup by Telegram id and the conditional
//! loyalty-balance write.

use lavka_core::{TelegramId, UserId};

use super::{single_row, StoreError, SupabaseClient};
use crate::models::{TelegramUser, UserRow};

/// Store for the `users` collection.
pub struct UserStore<'a> {
    client: &'a SupabaseClient,
}

impl<'a> UserStore<'a> {
    /// Create a new user store.
    #[must_use]
    pub const fn new(client: &'a SupabaseClient) -> Self {
        Self { client }
    }

    /// Insert-or-merge the Telegram profile keyed by `telegram_id` and
    /// return the persisted row.
    ///
    /// The loyalty balance is never part of the upsert body, so an existing
    /// row keeps its balance and a fresh row gets the column default.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the request fails or no row comes back.
    pub async fn upsert_profile(&self, profile: &TelegramUser) -> Result<UserRow, StoreError> {
        let body = serde_json::json!({
            "telegram_id": profile.id,
            "username": profile.username,
            "first_name": profile.first_name,
            "last_name": profile.last_name,
        });

        let rows = self
            .client
            .insert_rows(
                "users",
                &[("on_conflict", "telegram_id")],
                "resolution=merge-duplicates,return=representation",
                &body,
            )
            .await?;
        single_row("users", rows)
    }

    /// Look up the persisted row for a Telegram id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the request fails; an absent row is `Ok(None)`.
    pub async fn find_by_telegram_id(
        &self,
        telegram_id: TelegramId,
    ) -> Result<Option<UserRow>, StoreError> {
        let filter = format!("eq.{telegram_id}");
        let rows: Vec<UserRow> = self
            .client
            .get_rows("users", &[("telegram_id", filter.as_str()), ("select", "*")])
            .await?;
        Ok(rows.into_iter().next())
    }

    /// Conditionally set the loyalty balance: the write only lands if the
    /// persisted balance still equals `expected` (compare-and-swap over
    /// PostgREST filters).
    ///
    /// Returns `true` when the row was updated, `false` when the guard
    /// missed because the balance moved since it was read.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the request itself fails.
    pub async fn update_joints_from(
        &self,
        id: UserId,
        expected: i64,
        new_balance: i64,
    ) -> Result<bool, StoreError> {
        let id_filter = format!("eq.{id}");
        let guard_filter = format!("eq.{expected}");
        let body = serde_json::json!({ "joints": new_balance });

        let rows: Vec<UserRow> = self
            .client
            .patch_rows(
                "users",
                &[
                    ("id", id_filter.as_str()),
                    ("joints", guard_filter.as_str()),
                ],
                &body,
            )
            .await?;
        Ok(!rows.is_empty())
    }
}
