//! Cart edit handlers. All mutations go through state transitions; none of
//! these touch the remote store.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use lavka_core::ProductId;

use crate::error::{AppError, Result};
use crate::routes::{AppState, Identity};
use crate::session::{CartLineView, SessionSnapshot};
use crate::state::{DELIVERY_FEE, Transition};

/// Request naming one product.
#[derive(Debug, Deserialize)]
pub struct CartItemRequest {
    pub product_id: ProductId,
}

/// Request replacing one line's quantity.
#[derive(Debug, Deserialize)]
pub struct CartQuantityRequest {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// The cart as the webview renders it.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub cart_count: i64,
    pub subtotal: i64,
    pub delivery_fee: i64,
    pub total: i64,
}

/// GET /cart
pub async fn show(State(state): State<AppState>, Identity(user): Identity) -> Json<CartView> {
    let handle = state.sessions().session(user.id).await;
    let session_state = handle.lock().await;
    Json(CartView {
        lines: session_state.cart.iter().map(CartLineView::from).collect(),
        cart_count: session_state.cart_count(),
        subtotal: session_state.subtotal(),
        delivery_fee: DELIVERY_FEE,
        total: session_state.total(),
    })
}

/// POST /cart/add
///
/// Adds one unit of a catalog product: an existing line is incremented, a
/// new line is appended at the end.
///
/// # Errors
///
/// Returns `NotFound` if the product is not in the session's catalog.
pub async fn add(
    State(state): State<AppState>,
    Identity(user): Identity,
    Json(req): Json<CartItemRequest>,
) -> Result<Json<SessionSnapshot>> {
    let handle = state.sessions().session(user.id).await;
    let mut session_state = handle.lock().await;

    let product = session_state
        .products
        .iter()
        .find(|p| p.id == req.product_id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("product {}", req.product_id)))?;

    session_state.apply(Transition::AddToCart(product));
    Ok(Json(SessionSnapshot::of(&session_state)))
}

/// POST /cart/update
///
/// Replaces a line's quantity; zero or less removes the line.
pub async fn update(
    State(state): State<AppState>,
    Identity(user): Identity,
    Json(req): Json<CartQuantityRequest>,
) -> Json<SessionSnapshot> {
    let handle = state.sessions().session(user.id).await;
    let mut session_state = handle.lock().await;
    session_state.apply(Transition::SetCartQuantity(req.product_id, req.quantity));
    Json(SessionSnapshot::of(&session_state))
}

/// POST /cart/remove
///
/// Removing an absent product is a no-op.
pub async fn remove(
    State(state): State<AppState>,
    Identity(user): Identity,
    Json(req): Json<CartItemRequest>,
) -> Json<SessionSnapshot> {
    let handle = state.sessions().session(user.id).await;
    let mut session_state = handle.lock().await;
    session_state.apply(Transition::RemoveFromCart(req.product_id));
    Json(SessionSnapshot::of(&session_state))
}

/// POST /cart/clear
pub async fn clear(State(state): State<AppState>, Identity(user): Identity) -> Json<SessionSnapshot> {
    let handle = state.sessions().session(user.id).await;
    let mut session_state = handle.lock().await;
    session_state.apply(Transition::ClearCart);
    Json(SessionSnapshot::of(&session_state))
}
