//! # Application State
//!
//! The stores and the relying party are created once at start-up and shared
//! with every request handler. Axum clones the state per request, which only
//! clones the `Arc` pointers.
//!
//! Tests build a fresh `AppState` each, so no state leaks between them.

use crate::config::Config;
use crate::store::{CeremonyStore, UserStore};
use crate::webauthn::RelyingParty;
use anyhow::Result;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    /// Username -> user (and their passkeys)
    pub users: Arc<UserStore>,

    /// User handle -> pending registration/authentication ceremony
    pub ceremonies: Arc<CeremonyStore>,

    /// Relying party for generating and verifying ceremonies
    pub relying_party: Arc<RelyingParty>,
}

impl AppState {
    /// Initialize application state
    ///
    /// # Errors
    /// Returns an error if the relying-party configuration is invalid
    /// (e.g., an origin outside the RP ID).
    pub fn new(config: &Config) -> Result<Self> {
        let relying_party = RelyingParty::new(config)?;

        Ok(AppState {
            users: Arc::new(UserStore::new()),
            ceremonies: Arc::new(CeremonyStore::new(config.challenge_ttl)),
            relying_party: Arc::new(relying_party),
        })
    }
}
