//! Order store: order-row creation and batch line-item insertion.

use super::{single_row, StoreError, SupabaseClient};
use crate::models::{NewOrder, NewOrderItem, OrderItemRow, OrderRow};

/// Store for the `orders` and `order_items` collections.
pub struct OrderStore<'a> {
    client: &'a SupabaseClient,
}

impl<'a> OrderStore<'a> {
    /// Create a new order store.
    #[must_use]
    pub const fn new(client: &'a SupabaseClient) -> Self {
        Self { client }
    }

    /// Insert one order row and return the created representation.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the request fails or no row comes back.
    pub async fn create(&self, order: &NewOrder) -> Result<OrderRow, StoreError> {
        let rows = self
            .client
            .insert_rows("orders", &[], "return=representation", order)
            .await?;
        single_row("orders", rows)
    }

    /// Batch-insert the order's line items with their price snapshots.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the request fails.
    pub async fn insert_items(
        &self,
        items: &[NewOrderItem],
    ) -> Result<Vec<OrderItemRow>, StoreError> {
        self.client
            .insert_rows("order_items", &[], "return=representation", items)
            .await
    }
}
