//! Product store: the read-only catalog.

use super::{StoreError, SupabaseClient};
use crate::models::{NewProduct, Product};

/// Store for the `products` collection.
pub struct ProductStore<'a> {
    client: &'a SupabaseClient,
}

impl<'a> ProductStore<'a> {
    /// Create a new product store.
    #[must_use]
    pub const fn new(client: &'a SupabaseClient) -> Self {
        Self { client }
    }

    /// List the whole catalog, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the request fails.
    pub async fn list_catalog(&self) -> Result<Vec<Product>, StoreError> {
        self.client
            .get_rows(
                "products",
                &[("select", "*"), ("order", "created_at.desc")],
            )
            .await
    }

    /// Insert catalog rows (CLI seeding only).
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the request fails.
    pub async fn insert(&self, products: &[NewProduct]) -> Result<Vec<Product>, StoreError> {
        self.client
            .insert_rows("products", &[], "return=representation", products)
            .await
    }
}
