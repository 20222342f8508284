//! # Passkey Relying-Party Server
//!
//! A minimal WebAuthn/FIDO2 relying party: four HTTP endpoints that run the
//! registration and authentication ceremonies for a username, backed by
//! in-memory user and pending-ceremony stores.
//!
//! ## Key Concepts
//! - **Ceremony**: one begin call plus one finish call
//! - **Challenge**: random bytes the authenticator signs over, one pending per user
//! - **Signature counter**: advanced on every sign-in to spot cloned authenticators

pub mod config;
pub mod error;
pub mod handlers;
pub mod state;
pub mod store;
pub mod webauthn;

use crate::config::Config;
use crate::handlers::passkey::{login_finish, login_start, register_finish, register_start};
use crate::state::AppState;
use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    routing::post,
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Build the application router
///
/// ## Routes
/// - `POST /api/passkey/registerStart`, `POST /api/passkey/registerFinish?username=`
/// - `POST /api/passkey/loginStart`, `POST /api/passkey/loginFinish?username=`
/// - everything else is served from `config.static_dir`
pub fn build_router(state: AppState, config: &Config) -> Router {
    // Any origin may call the API. A production relying party should list
    // only the configured RP origins here.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]);

    Router::new()
        .route("/api/passkey/registerStart", post(register_start))
        .route("/api/passkey/registerFinish", post(register_finish))
        .route("/api/passkey/loginStart", post(login_start))
        .route("/api/passkey/loginFinish", post(login_finish))
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
