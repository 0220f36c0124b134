//! Address store: list per user and create.

use lavka_core::UserId;

use super::{single_row, StoreError, SupabaseClient};
use crate::models::{Address, NewAddress};

/// Store for the `addresses` collection.
pub struct AddressStore<'a> {
    client: &'a SupabaseClient,
}

impl<'a> AddressStore<'a> {
    /// Create a new address store.
    #[must_use]
    pub const fn new(client: &'a SupabaseClient) -> Self {
        Self { client }
    }

    /// List the addresses owned by one user.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the request fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Address>, StoreError> {
        let filter = format!("eq.{user_id}");
        self.client
            .get_rows(
                "addresses",
                &[("user_id", filter.as_str()), ("select", "*")],
            )
            .await
    }

    /// Persist a new address and return the created row.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the request fails or no row comes back.
    pub async fn create(&self, address: &NewAddress) -> Result<Address, StoreError> {
        let rows = self
            .client
            .insert_rows("addresses", &[], "return=representation", address)
            .await?;
        single_row("addresses", rows)
    }
}
