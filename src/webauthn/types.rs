//! # WebAuthn API Types
//!
//! Request bodies and query parameters of the ceremony endpoints. Begin calls
//! carry the username in a JSON body; finish calls carry it in the query
//! string because their body is the WebAuthn response itself.

use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Body of `registerStart` and `loginStart`
///
/// ## Example JSON
/// ```json
/// {
///   "username": "alice"
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct UsernameRequest {
    #[serde(default)]
    pub username: String,
}

/// Query string of `registerFinish` and `loginFinish`: `?username=alice`
#[derive(Debug, Deserialize)]
pub struct UsernameQuery {
    pub username: Option<String>,
}

/// Body of a successful finish call
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn new(status: &str) -> Self {
        Self {
            status: status.to_string(),
        }
    }
}

/// Trim a client-supplied username, rejecting empty ones
pub fn require_username(username: Option<&str>) -> AppResult<&str> {
    match username.map(str::trim) {
        Some(name) if !name.is_empty() => Ok(name),
        _ => Err(AppError::BadRequest("Username is required".to_string())),
    }
}
