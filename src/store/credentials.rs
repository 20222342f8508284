//! # Credential Operations
//!
//! A user's passkeys live inside the user record behind a lock. Only public
//! keys are held; private keys never leave the authenticator.

use crate::error::{AppError, AppResult};
use crate::store::models::{StoredCredential, User};
use chrono::Utc;
use webauthn_rs::prelude::*;

impl User {
    /// Snapshot of the registered credentials
    pub fn credentials(&self) -> Vec<StoredCredential> {
        self.credentials.read().clone()
    }

    pub fn credential_count(&self) -> usize {
        self.credentials.read().len()
    }

    pub fn passkeys(&self) -> Vec<Passkey> {
        self.credentials
            .read()
            .iter()
            .map(|cred| cred.passkey.clone())
            .collect()
    }

    /// IDs to exclude when registering, so an authenticator isn't enrolled twice
    pub fn credential_ids(&self) -> Vec<CredentialID> {
        self.credentials
            .read()
            .iter()
            .map(|cred| cred.id().clone())
            .collect()
    }

    pub fn has_credential(&self, credential_id: &CredentialID) -> bool {
        self.credentials
            .read()
            .iter()
            .any(|cred| cred.id() == credential_id)
    }

    /// Append a freshly registered credential
    ///
    /// Fails without changing anything if the credential ID is already
    /// registered to this user.
    pub fn add_credential(&self, credential: StoredCredential) -> AppResult<()> {
        let mut credentials = self.credentials.write();
        if credentials.iter().any(|cred| cred.id() == credential.id()) {
            return Err(AppError::Ceremony(format!(
                "credential already registered for user '{}'",
                self.name
            )));
        }
        credentials.push(credential);
        Ok(())
    }

    /// Apply a verified assertion to the credential that produced it
    ///
    /// ## Security: Signature Counter
    /// If either the stored or the presented counter is non-zero the
    /// presented one must be strictly greater. Anything else may be a cloned
    /// authenticator, so the attempt is rejected and nothing is updated.
    ///
    /// Returns the new counter value.
    pub fn record_authentication(&self, result: &AuthenticationResult) -> AppResult<u32> {
        let mut credentials = self.credentials.write();
        let credential = credentials
            .iter_mut()
            .find(|cred| cred.id() == result.cred_id())
            .ok_or_else(|| {
                AppError::Ceremony(format!(
                    "credential is not registered to user '{}'",
                    self.name
                ))
            })?;

        let presented = result.counter();
        if (presented != 0 || credential.counter != 0) && presented <= credential.counter {
            return Err(AppError::Ceremony(format!(
                "signature counter regressed ({} after {})",
                presented, credential.counter
            )));
        }

        credential.passkey.update_credential(result);
        credential.counter = presented;
        credential.last_used_at = Some(Utc::now());

        Ok(presented)
    }
}
