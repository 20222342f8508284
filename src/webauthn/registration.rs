//! # Passkey Registration Logic
//!
//! ## Registration Flow
//! 1. **Begin**: Generate a challenge and creation options for the user
//! 2. **Finish**: Verify the attestation against the pending state and
//!    produce the credential to store
//!
//! Already-registered credential IDs are sent as the exclude list so the
//! same authenticator isn't enrolled twice.

use super::RelyingParty;
use crate::error::{AppError, AppResult, CeremonyKind};
use crate::store::{PendingCeremony, StoredCredential, User};
use webauthn_rs::prelude::*;

impl RelyingParty {
    /// Start a registration ceremony for `user`
    ///
    /// Returns the options for `navigator.credentials.create()` and the
    /// state to keep as the user's pending ceremony.
    pub fn begin_registration(
        &self,
        user: &User,
    ) -> AppResult<(CreationChallengeResponse, PendingCeremony)> {
        let exclude = user.credential_ids();
        let exclude = if exclude.is_empty() { None } else { Some(exclude) };

        let (ccr, reg_state) = self.webauthn.start_passkey_registration(
            user.handle,
            &user.name,
            &user.display_name,
            exclude,
        )?;

        tracing::debug!("Created registration options for '{}': {:?}", user.name, ccr);

        Ok((ccr, PendingCeremony::Registration(reg_state)))
    }

    /// Verify an attestation response against the pending registration
    ///
    /// ## What gets verified?
    /// - The challenge matches the one issued by `begin_registration`
    /// - The origin is one of the configured origins
    /// - The RP ID hash matches
    /// - The attestation statement ("none" is accepted)
    /// - The credential isn't already registered to this user
    ///
    /// Nothing is stored here; on success the caller appends the returned
    /// credential to the user.
    pub fn finish_registration(
        &self,
        user: &User,
        pending: PendingCeremony,
        credential: &RegisterPublicKeyCredential,
    ) -> AppResult<StoredCredential> {
        let PendingCeremony::Registration(reg_state) = pending else {
            return Err(AppError::SessionNotFound(CeremonyKind::Registration));
        };

        let passkey = self
            .webauthn
            .finish_passkey_registration(credential, &reg_state)?;

        if user.has_credential(passkey.cred_id()) {
            return Err(AppError::Ceremony(format!(
                "credential already registered for user '{}'",
                user.name
            )));
        }

        // AuthenticatorTransport serializes as its WebAuthn name ("usb", "internal", ...)
        let transports = credential
            .response
            .transports
            .iter()
            .flatten()
            .filter_map(|transport| serde_json::to_value(transport).ok())
            .filter_map(|value| value.as_str().map(str::to_owned))
            .collect();

        let stored = StoredCredential::new(passkey, transports);
        tracing::debug!(
            "Verified registration credential for '{}': {:?} (created {})",
            user.name,
            stored.id(),
            stored.created_at
        );

        Ok(stored)
    }
}
