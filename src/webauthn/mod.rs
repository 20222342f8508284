//! # WebAuthn Module
//!
//! The relying party's ceremony engine. It builds options for the browser
//! and verifies what comes back; the stores and HTTP handlers decide where
//! the resulting state lives.
//!
//! ## Submodules
//! - `types`: Request types for the API
//! - `registration`: Creating new passkey credentials
//! - `authentication`: Signing in with existing passkeys
//!
//! ## WebAuthn Flow Overview
//!
//! ### Registration (Creating a Passkey)
//! 1. `RelyingParty::begin_registration()` issues a challenge plus creation options
//! 2. The browser runs `navigator.credentials.create()` with them
//! 3. `RelyingParty::finish_registration()` verifies the attestation and
//!    hands back the credential to store
//!
//! ### Authentication (Signing In)
//! 1. `RelyingParty::begin_authentication()` issues a challenge plus the allowed credentials
//! 2. The browser runs `navigator.credentials.get()` with them
//! 3. `RelyingParty::finish_authentication()` verifies the assertion signature
//!    against the stored public key and advances the signature counter

pub mod authentication;
pub mod registration;
pub mod types;

use crate::config::Config;
use anyhow::{anyhow, Result};
use webauthn_rs::prelude::*;

/// A configured relying party: RP ID, display name and accepted origins
///
/// Holds no per-user state, so one instance is shared by every request.
pub struct RelyingParty {
    webauthn: Webauthn,
    rp_id: String,
}

impl RelyingParty {
    /// Build the relying party from configuration
    ///
    /// # Errors
    /// Fails when the configuration is inconsistent (an origin outside the
    /// RP ID, no origins at all) or webauthn-rs rejects it. The server must
    /// not start in that case.
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;

        let (first_origin, other_origins) = config
            .rp_origins
            .split_first()
            .ok_or_else(|| anyhow!("at least one relying-party origin is required"))?;

        let mut builder =
            WebauthnBuilder::new(&config.rp_id, first_origin)?.rp_name(&config.rp_name);
        for origin in other_origins {
            builder = builder.append_allowed_origin(origin);
        }

        Ok(RelyingParty {
            webauthn: builder.build()?,
            rp_id: config.rp_id.clone(),
        })
    }

    pub fn rp_id(&self) -> &str {
        &self.rp_id
    }
}
