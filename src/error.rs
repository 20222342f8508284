//! # Error Handling
//!
//! Custom error types for the ceremony endpoints and their conversion into
//! HTTP responses. Responses carry a short plain-text body; details stay in
//! the logs.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;
use thiserror::Error;

/// Which WebAuthn ceremony a pending entry or a failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CeremonyKind {
    Registration,
    Authentication,
}

impl fmt::Display for CeremonyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CeremonyKind::Registration => f.write_str("registration"),
            CeremonyKind::Authentication => f.write_str("authentication"),
        }
    }
}

/// Application-wide error type
///
/// ## Status codes
/// - `BadRequest` / `SessionNotFound`: 400, nothing was mutated (or the
///   pending entry was already gone)
/// - `WebAuthn` / `Ceremony`: 500, the ceremony attempt is over and the
///   client has to begin again
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or malformed username or request body
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A finish call without a matching begin (never begun, already
    /// consumed, expired, or begun as the other ceremony kind)
    #[error("No pending {0} session for user")]
    SessionNotFound(CeremonyKind),

    /// webauthn-rs refused to build options or to verify a response:
    /// challenge/origin/RP ID mismatch, bad signature, rejected attestation
    #[error("WebAuthn error: {0}")]
    WebAuthn(#[from] webauthn_rs::prelude::WebauthnError),

    /// Verified by webauthn-rs but rejected by the relying party's own
    /// bookkeeping (duplicate credential, counter regression, no credentials)
    #[error("Ceremony rejected: {0}")]
    Ceremony(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest(_) => {
                tracing::debug!("{}", self);
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            AppError::SessionNotFound(_) => {
                tracing::warn!("{}", self);
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            AppError::WebAuthn(e) => {
                // WebAuthn errors can be complex, keep them out of the response
                tracing::error!("WebAuthn error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "WebAuthn ceremony failed".to_string())
            }
            AppError::Ceremony(reason) => {
                tracing::error!("Ceremony rejected: {}", reason);
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        (status, message).into_response()
    }
}

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;
