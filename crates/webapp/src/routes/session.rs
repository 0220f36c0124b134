//! Session lifecycle handlers: bootstrap, snapshot, tab and modal flags.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::routes::{AppState, Identity};
use crate::session::{self, SessionSnapshot};
use crate::state::{Tab, Transition};
use crate::telegram::identity::HostDirectives;

/// Response from the bootstrap call: the full snapshot plus the lifecycle
/// calls the webview shim executes once at startup.
#[derive(Debug, Serialize)]
pub struct BootstrapResponse {
    pub session: SessionSnapshot,
    pub host: HostDirectives,
}

/// POST /session
///
/// Resolve identity, upsert the profile, load catalog and addresses.
///
/// # Errors
///
/// Never fails outright; remote bootstrap failures surface through the
/// snapshot's `error` field.
pub async fn bootstrap(
    State(state): State<AppState>,
    Identity(user): Identity,
) -> Result<Json<BootstrapResponse>> {
    let handle = state.sessions().session(user.id).await;
    let mut session_state = handle.lock().await;

    session::bootstrap(&mut session_state, state.store(), user).await;

    Ok(Json(BootstrapResponse {
        session: SessionSnapshot::of(&session_state),
        host: HostDirectives::default(),
    }))
}

/// GET /session
pub async fn snapshot(
    State(state): State<AppState>,
    Identity(user): Identity,
) -> Json<SessionSnapshot> {
    let handle = state.sessions().session(user.id).await;
    let session_state = handle.lock().await;
    Json(SessionSnapshot::of(&session_state))
}

/// Request to switch the active tab.
#[derive(Debug, Deserialize)]
pub struct SetTabRequest {
    pub tab: Tab,
}

/// POST /session/tab
pub async fn set_tab(
    State(state): State<AppState>,
    Identity(user): Identity,
    Json(req): Json<SetTabRequest>,
) -> Json<SessionSnapshot> {
    let handle = state.sessions().session(user.id).await;
    let mut session_state = handle.lock().await;
    session_state.apply(Transition::SetTab(req.tab));
    Json(SessionSnapshot::of(&session_state))
}

/// Request to show or hide the loyalty modal.
#[derive(Debug, Deserialize)]
pub struct SetJointsModalRequest {
    pub visible: bool,
}

/// POST /session/joints-modal
pub async fn set_joints_modal(
    State(state): State<AppState>,
    Identity(user): Identity,
    Json(req): Json<SetJointsModalRequest>,
) -> Json<SessionSnapshot> {
    let handle = state.sessions().session(user.id).await;
    let mut session_state = handle.lock().await;
    session_state.apply(Transition::SetJointsModal(req.visible));
    Json(SessionSnapshot::of(&session_state))
}
