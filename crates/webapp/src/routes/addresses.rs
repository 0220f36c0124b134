//! Address management handlers: list, create, select. Addresses are never
//! edited or deleted here.

use axum::{Json, extract::State};
use serde::Deserialize;

use lavka_core::AddressId;

use crate::error::{AppError, Result};
use crate::models::{Address, NewAddress};
use crate::routes::{AppState, Identity};
use crate::session::SessionSnapshot;
use crate::state::Transition;
use crate::supabase::{AddressStore, UserStore};

/// Request to create a new address.
#[derive(Debug, Deserialize)]
pub struct CreateAddressRequest {
    pub title: String,
    pub address_text: String,
    pub lat: f64,
    pub lng: f64,
}

/// Request to select the delivery address.
#[derive(Debug, Deserialize)]
pub struct SelectAddressRequest {
    pub address_id: AddressId,
}

/// GET /addresses
pub async fn list(State(state): State<AppState>, Identity(user): Identity) -> Json<Vec<Address>> {
    let handle = state.sessions().session(user.id).await;
    let session_state = handle.lock().await;
    Json(session_state.addresses.clone())
}

/// POST /addresses
///
/// Persists the address for the caller's user row (upserting the profile if
/// this session never bootstrapped) and refreshes the session's list.
///
/// # Errors
///
/// Returns a store error if any remote call fails.
pub async fn create(
    State(state): State<AppState>,
    Identity(user): Identity,
    Json(req): Json<CreateAddressRequest>,
) -> Result<Json<Address>> {
    let handle = state.sessions().session(user.id).await;
    let mut session_state = handle.lock().await;

    let users = UserStore::new(state.store());
    let row = users.upsert_profile(&user).await?;

    let addresses = AddressStore::new(state.store());
    let created = addresses
        .create(&NewAddress {
            user_id: row.id,
            title: req.title,
            address_text: req.address_text,
            lat: req.lat,
            lng: req.lng,
        })
        .await?;

    let list = addresses.list_for_user(row.id).await?;
    session_state.apply(Transition::SetAddresses(list));

    Ok(Json(created))
}

/// POST /addresses/select
///
/// # Errors
///
/// Returns `NotFound` if the id is not among the session's addresses.
pub async fn select(
    State(state): State<AppState>,
    Identity(user): Identity,
    Json(req): Json<SelectAddressRequest>,
) -> Result<Json<SessionSnapshot>> {
    let handle = state.sessions().session(user.id).await;
    let mut session_state = handle.lock().await;

    let address = session_state
        .addresses
        .iter()
        .find(|a| a.id == req.address_id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("address {}", req.address_id)))?;

    session_state.apply(Transition::SetSelectedAddress(Some(address)));
    Ok(Json(SessionSnapshot::of(&session_state)))
}
