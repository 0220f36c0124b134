//! The order/checkout orchestrator.
//!
//! Converts a cart plus a selected address into a persisted order, its line
//! items and an updated loyalty balance, then notifies the operator chat.
//! Steps run strictly in order and every remote failure is terminal for the
//! attempt; there are no retries, timeouts or compensating rollbacks.
//!
//! Two inconsistencies are accepted (see DESIGN.md): an order row can
//! outlive a failed line-item insert, and a failed balance write leaves the
//! persisted balance stale until the next bootstrap.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use lavka_core::{OrderId, OrderStatus, TelegramId};

use crate::models::{NewOrder, NewOrderItem};
use crate::state::{SessionState, Tab, Transition};
use crate::supabase::{OrderStore, StoreError, SupabaseClient, UserStore};
use crate::telegram::notify::{OrderNotifier, OrderSummary};

/// Checkout request, already clamped at the route layer.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CheckoutRequest {
    /// Pay part of the order with loyalty points.
    pub redeem_joints: bool,
    /// Points to redeem; ignored unless `redeem_joints` is set.
    #[serde(default)]
    pub joints_to_redeem: i64,
}

/// Which checkout precondition was violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreconditionFailure {
    EmptyCart,
    NoAddressSelected,
    NoIdentity,
}

impl std::fmt::Display for PreconditionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyCart => write!(f, "the cart is empty"),
            Self::NoAddressSelected => write!(f, "no delivery address is selected"),
            Self::NoIdentity => write!(f, "no resolved user identity"),
        }
    }
}

/// The checkout failure taxonomy. Logged in full; collapsed to two generic
/// user-facing messages at the route boundary.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// A precondition was violated; nothing was attempted remotely.
    #[error("precondition violated: {0}")]
    Precondition(PreconditionFailure),

    /// No persisted row exists for the session's Telegram id.
    #[error("no persisted user for telegram id {0}")]
    UserNotFound(TelegramId),

    /// The persisted balance cannot cover the requested redemption.
    #[error("insufficient balance: requested {requested}, persisted {balance}")]
    InsufficientBalance { requested: i64, balance: i64 },

    /// The order row could not be created.
    #[error("order creation failed: {0}")]
    OrderCreate(#[source] StoreError),

    /// Line items could not be inserted. The order row already exists and
    /// is not rolled back.
    #[error("order items insertion failed for order {order_id}: {source}")]
    OrderItems {
        order_id: OrderId,
        #[source]
        source: StoreError,
    },

    /// Catch-all for transport failures before the order row exists.
    #[error("persistence transport failure: {0}")]
    Network(#[from] StoreError),
}

/// Outcome of the conditional balance write.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BalanceUpdate {
    /// The compare-and-swap landed; this is the new persisted balance.
    Applied { joints: i64 },
    /// The guard missed or the write failed; the session keeps its
    /// pre-checkout balance until the next bootstrap.
    Stale,
}

/// Whether the operator chat heard about the order.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    Delivered,
    Failed,
    Disabled,
}

/// What the caller gets back from a successful checkout.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutReceipt {
    pub order_id: OrderId,
    /// Pre-redemption order total (subtotal + delivery fee).
    pub total: i64,
    pub redeemed: i64,
    pub amount_due: i64,
    pub accrued: i64,
    pub balance: BalanceUpdate,
    pub notification: NotificationStatus,
}

/// Loyalty accrual: 10% of the order total, rounded down.
#[must_use]
pub const fn accrual(total: i64) -> i64 {
    total / 10
}

/// What is left to pay after redeeming points.
#[must_use]
pub const fn amount_due(total: i64, redeemed: i64) -> i64 {
    let due = total - redeemed;
    if due < 0 { 0 } else { due }
}

/// Run the checkout sequence against the persistence gateway and the
/// notification sink, then reconcile the session state.
///
/// The caller holds the session lock and is responsible for the advisory
/// busy flag around this call.
///
/// # Errors
///
/// Returns `CheckoutError`; see the type for the taxonomy. Any failure up
/// to and including order creation leaves the session state untouched.
#[tracing::instrument(skip_all, fields(telegram_id, order_id))]
pub async fn process_order(
    state: &mut SessionState,
    store: &SupabaseClient,
    notifier: Option<&OrderNotifier>,
    request: CheckoutRequest,
) -> Result<CheckoutReceipt, CheckoutError> {
    // Step 0: explicit precondition checks.
    let user = state
        .user
        .clone()
        .ok_or(CheckoutError::Precondition(PreconditionFailure::NoIdentity))?;
    if state.cart.is_empty() {
        return Err(CheckoutError::Precondition(PreconditionFailure::EmptyCart));
    }
    let address = state
        .selected_address
        .clone()
        .ok_or(CheckoutError::Precondition(
            PreconditionFailure::NoAddressSelected,
        ))?;

    tracing::Span::current().record("telegram_id", user.id.as_i64());

    let total = state.total();
    let redeemed = if request.redeem_joints {
        request.joints_to_redeem.max(0)
    } else {
        0
    };

    // Step 1: resolve the persisted user row.
    let users = UserStore::new(store);
    let user_row = users
        .find_by_telegram_id(user.id)
        .await?
        .ok_or(CheckoutError::UserNotFound(user.id))?;

    // Step 2: re-check the redemption against the just-fetched balance,
    // not the possibly-stale session value.
    if redeemed > user_row.joints {
        return Err(CheckoutError::InsufficientBalance {
            requested: redeemed,
            balance: user_row.joints,
        });
    }

    // Step 3: create the order row. The stored total is the full
    // pre-redemption amount so the line-item invariant holds.
    let orders = OrderStore::new(store);
    let order = orders
        .create(&NewOrder {
            user_id: user_row.id,
            total_amount: total,
            status: OrderStatus::Pending,
            address_id: address.id,
        })
        .await
        .map_err(CheckoutError::OrderCreate)?;
    tracing::Span::current().record("order_id", tracing::field::display(order.id));

    // Step 4: line items with price snapshots. On failure the order row
    // stays behind; the error carries its id so the log points at the orphan.
    let items: Vec<NewOrderItem> = state
        .cart
        .iter()
        .map(|line| NewOrderItem {
            order_id: order.id,
            product_id: line.product.id,
            quantity: line.quantity,
            price: line.product.price,
        })
        .collect();
    orders
        .insert_items(&items)
        .await
        .map_err(|source| CheckoutError::OrderItems {
            order_id: order.id,
            source,
        })?;

    // Step 5: conditional balance write. A miss or transport failure is
    // non-fatal: the order exists by now.
    let accrued = accrual(total);
    let new_balance = user_row.joints + accrued - redeemed;
    let balance = match users
        .update_joints_from(user_row.id, user_row.joints, new_balance)
        .await
    {
        Ok(true) => BalanceUpdate::Applied {
            joints: new_balance,
        },
        Ok(false) => {
            tracing::warn!(
                order_id = %order.id,
                expected = user_row.joints,
                "balance moved since checkout began, leaving it stale"
            );
            BalanceUpdate::Stale
        }
        Err(error) => {
            tracing::warn!(order_id = %order.id, %error, "balance write failed, leaving it stale");
            BalanceUpdate::Stale
        }
    };

    // Step 6: fire-and-forget notification. Its outcome never affects the
    // checkout result.
    let due = amount_due(total, redeemed);
    let notification = match notifier {
        Some(notifier) => {
            let summary = OrderSummary {
                lines: &state.cart,
                total,
                redeemed: (redeemed > 0).then_some(redeemed),
                amount_due: due,
                buyer: &user,
                address: &address,
            };
            match notifier.send_order(&summary).await {
                Ok(()) => NotificationStatus::Delivered,
                Err(error) => {
                    tracing::warn!(order_id = %order.id, %error, "order notification failed");
                    NotificationStatus::Failed
                }
            }
        }
        None => NotificationStatus::Disabled,
    };

    // Step 7: reconcile local state and report.
    state.apply(Transition::ClearCart);
    state.apply(Transition::SetSelectedAddress(None));
    state.apply(Transition::SetTab(Tab::Shop));
    if let BalanceUpdate::Applied { joints } = balance {
        state.apply(Transition::SetJoints(joints));
    }

    tracing::info!(order_id = %order.id, total, redeemed, accrued, "order placed");

    Ok(CheckoutReceipt {
        order_id: order.id,
        total,
        redeemed,
        amount_due: due,
        accrued,
        balance,
        notification,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accrual_rounds_down() {
        assert_eq!(accrual(130), 13);
        assert_eq!(accrual(99), 9);
        assert_eq!(accrual(150), 15);
        assert_eq!(accrual(0), 0);
    }

    #[test]
    fn test_amount_due_floors_at_zero() {
        assert_eq!(amount_due(150, 40), 110);
        assert_eq!(amount_due(150, 150), 0);
        assert_eq!(amount_due(150, 200), 0);
        assert_eq!(amount_due(150, 0), 150);
    }

    #[test]
    fn test_balance_arithmetic_scenarios() {
        // cart [{50 x2}, {20 x1}], delivery 30 -> total 150
        let total = 150;
        assert_eq!(accrual(total), 15);

        // no redemption: new balance = old + 15
        let old = 100;
        assert_eq!(old + accrual(total), 115);

        // redeem 40 of balance 100: due 110, new balance 75
        let redeemed = 40;
        assert_eq!(amount_due(total, redeemed), 110);
        assert_eq!(old + accrual(total) - redeemed, 75);
    }
}
