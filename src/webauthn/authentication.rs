//! # Passkey Authentication Logic
//!
//! A user with registered passkeys gets request options listing them, so the
//! authenticator knows which key to use. A user with none gets discoverable
//! options with an empty allow-list; finishing that ceremony fails since
//! there is no public key to check the assertion against.

use super::RelyingParty;
use crate::error::{AppError, AppResult, CeremonyKind};
use crate::store::{PendingCeremony, User};
use webauthn_rs::prelude::*;

impl RelyingParty {
    /// Start an authentication ceremony for `user`
    pub fn begin_authentication(
        &self,
        user: &User,
    ) -> AppResult<(RequestChallengeResponse, PendingCeremony)> {
        let passkeys = user.passkeys();

        let (rcr, pending) = if passkeys.is_empty() {
            let (rcr, auth_state) = self.webauthn.start_discoverable_authentication()?;
            (rcr, PendingCeremony::Discoverable(auth_state))
        } else {
            let (rcr, auth_state) = self.webauthn.start_passkey_authentication(&passkeys)?;
            (rcr, PendingCeremony::Authentication(auth_state))
        };

        tracing::debug!("Created assertion options for '{}': {:?}", user.name, rcr);

        Ok((rcr, pending))
    }

    /// Verify an assertion against the pending authentication
    ///
    /// Checks challenge, origin, RP ID hash and the signature against the
    /// stored public key, then advances the credential's signature counter.
    /// A counter that fails to advance rejects the attempt and leaves the
    /// stored counter as it was.
    pub fn finish_authentication(
        &self,
        user: &User,
        pending: PendingCeremony,
        credential: &PublicKeyCredential,
    ) -> AppResult<AuthenticationResult> {
        let result = match pending {
            PendingCeremony::Authentication(auth_state) => self
                .webauthn
                .finish_passkey_authentication(credential, &auth_state)?,
            PendingCeremony::Discoverable(auth_state) => {
                let (user_handle, _) = self
                    .webauthn
                    .identify_discoverable_authentication(credential)?;
                if user_handle != user.handle {
                    return Err(AppError::Ceremony(format!(
                        "assertion belongs to a different user than '{}'",
                        user.name
                    )));
                }

                let keys: Vec<DiscoverableKey> =
                    user.passkeys().iter().map(DiscoverableKey::from).collect();
                if keys.is_empty() {
                    return Err(AppError::Ceremony(format!(
                        "user '{}' has no registered credentials",
                        user.name
                    )));
                }

                self.webauthn
                    .finish_discoverable_authentication(credential, auth_state, &keys)?
            }
            PendingCeremony::Registration(_) => {
                return Err(AppError::SessionNotFound(CeremonyKind::Authentication));
            }
        };

        let counter = user.record_authentication(&result)?;
        tracing::debug!(
            "Validated credential {:?} for '{}' (counter {})",
            result.cred_id(),
            user.name,
            counter
        );

        Ok(result)
    }
}
