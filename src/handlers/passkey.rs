use crate::error::{AppError, AppResult, CeremonyKind};
use crate::state::AppState;
use crate::webauthn::types::{require_username, StatusResponse, UsernameQuery, UsernameRequest};
use axum::{
    body::Bytes,
    extract::{Query, State},
    Json,
};
use serde::de::DeserializeOwned;
use webauthn_rs::prelude::*;

/// Decode a JSON request body whatever its `Content-Type`
///
/// Browsers posting with `fetch` and no explicit header send
/// `text/plain;charset=UTF-8`, so the header is not checked.
fn parse_body<T: DeserializeOwned>(body: &Bytes) -> AppResult<T> {
    serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {}", e)))
}

// Registration endpoints

/// POST /api/passkey/registerStart
pub async fn register_start(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<CreationChallengeResponse>> {
    let req: UsernameRequest = parse_body(&body)?;
    let username = require_username(Some(&req.username))?;

    let user = state.users.get_or_create(username);
    let (ccr, pending) = state.relying_party.begin_registration(&user)?;
    state.ceremonies.put(user.handle, pending);

    Ok(Json(ccr))
}

/// POST /api/passkey/registerFinish?username=<u>
///
/// The pending registration is consumed before verification, so a failed
/// attempt can't be retried against the same challenge.
pub async fn register_finish(
    State(state): State<AppState>,
    Query(query): Query<UsernameQuery>,
    body: Bytes,
) -> AppResult<Json<StatusResponse>> {
    let username = require_username(query.username.as_deref())?;
    let credential: RegisterPublicKeyCredential = parse_body(&body)?;

    let user = state.users.get_or_create(username);
    let pending = state.ceremonies.take(&user.handle, CeremonyKind::Registration)?;

    let stored = state
        .relying_party
        .finish_registration(&user, pending, &credential)?;
    user.add_credential(stored)?;

    tracing::info!(
        "Registered passkey for '{}' ({} total, user since {})",
        user.name,
        user.credential_count(),
        user.created_at
    );

    Ok(Json(StatusResponse::new("registration successful")))
}

// Authentication endpoints

/// POST /api/passkey/loginStart
pub async fn login_start(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<RequestChallengeResponse>> {
    let req: UsernameRequest = parse_body(&body)?;
    let username = require_username(Some(&req.username))?;

    let user = state.users.get_or_create(username);
    let (rcr, pending) = state.relying_party.begin_authentication(&user)?;
    state.ceremonies.put(user.handle, pending);

    Ok(Json(rcr))
}

/// POST /api/passkey/loginFinish?username=<u>
pub async fn login_finish(
    State(state): State<AppState>,
    Query(query): Query<UsernameQuery>,
    body: Bytes,
) -> AppResult<Json<StatusResponse>> {
    let username = require_username(query.username.as_deref())?;
    let credential: PublicKeyCredential = parse_body(&body)?;

    let user = state.users.get_or_create(username);
    let pending = state.ceremonies.take(&user.handle, CeremonyKind::Authentication)?;

    state
        .relying_party
        .finish_authentication(&user, pending, &credential)?;

    tracing::info!("Authenticated '{}'", user.name);

    Ok(Json(StatusResponse::new("authentication successful")))
}
