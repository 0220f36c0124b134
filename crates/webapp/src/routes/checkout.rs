//! Checkout handler: clamps the redemption, holds the advisory busy flag
//! for the duration, and hands the sequence to the orchestrator.

use axum::{Json, extract::State};
use serde::Deserialize;

use crate::checkout::{self, CheckoutReceipt, CheckoutRequest};
use crate::error::Result;
use crate::routes::{AppState, Identity};
use crate::state::Transition;

/// Checkout request body.
#[derive(Debug, Deserialize)]
pub struct CheckoutBody {
    pub redeem_joints: bool,
    /// Points to redeem; clamped here to `min(balance, total)` before the
    /// orchestrator re-validates against the persisted row.
    #[serde(default)]
    pub joints_to_redeem: Option<i64>,
}

/// POST /checkout
///
/// # Errors
///
/// Surfaces the collapsed checkout taxonomy; see `error`.
pub async fn checkout(
    State(state): State<AppState>,
    Identity(user): Identity,
    Json(body): Json<CheckoutBody>,
) -> Result<Json<CheckoutReceipt>> {
    let handle = state.sessions().session(user.id).await;
    let mut session_state = handle.lock().await;

    let requested = body.joints_to_redeem.unwrap_or(0).max(0);
    let clamped = requested.min(session_state.max_redeemable());

    // Advisory only: suppresses duplicate submissions from the webview, not
    // a mutual-exclusion lock across instances.
    session_state.apply(Transition::SetLoading(true));

    let result = checkout::process_order(
        &mut session_state,
        state.store(),
        state.notifier(),
        CheckoutRequest {
            redeem_joints: body.redeem_joints,
            joints_to_redeem: clamped,
        },
    )
    .await;

    session_state.apply(Transition::SetLoading(false));

    Ok(Json(result?))
}
