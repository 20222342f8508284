//! # Store Models
//!
//! Records held by the in-memory stores: users, their registered passkeys,
//! and in-flight ceremonies.

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use uuid::Uuid;
use webauthn_rs::prelude::*;

use crate::error::CeremonyKind;

/// Namespace for deriving user handles from usernames (UUIDv5)
const USER_HANDLE_NAMESPACE: Uuid = Uuid::from_u128(0x7c1e_2f0a_93b4_4d51_8a66_0e5d_c3a1_f9b2);

/// An identity participating in WebAuthn
///
/// Created on first reference to a username and kept for the lifetime of the
/// process. Credentials are only ever appended (after a successful
/// registration) or have their counter advanced (after a successful
/// authentication).
#[derive(Debug)]
pub struct User {
    /// Opaque user handle sent to authenticators as `user.id`
    pub handle: Uuid,

    /// Username, also used as the WebAuthn `user.name`
    pub name: String,

    /// Shown to the user during passkey creation
    pub display_name: String,

    pub created_at: DateTime<Utc>,

    pub(super) credentials: RwLock<Vec<StoredCredential>>,
}

impl User {
    pub fn new(name: &str) -> Self {
        Self {
            handle: Self::handle_for(name),
            name: name.to_string(),
            display_name: name.to_string(),
            created_at: Utc::now(),
            credentials: RwLock::new(Vec::new()),
        }
    }

    /// Deterministic handle for a username
    ///
    /// The same username always maps to the same handle, without the handle
    /// being the username bytes themselves.
    pub fn handle_for(name: &str) -> Uuid {
        Uuid::new_v5(&USER_HANDLE_NAMESPACE, name.as_bytes())
    }
}

/// A passkey registered to a user
///
/// The webauthn-rs `Passkey` carries the credential ID and public key; the
/// counter is tracked alongside so regressions can be detected and reported.
#[derive(Debug, Clone)]
pub struct StoredCredential {
    pub passkey: Passkey,

    /// Last signature counter seen for this credential
    pub counter: u32,

    /// Transport hints reported by the client at registration
    /// Examples: "usb", "nfc", "ble", "internal", "hybrid"
    pub transports: Vec<String>,

    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}

impl StoredCredential {
    pub fn new(passkey: Passkey, transports: Vec<String>) -> Self {
        Self {
            passkey,
            // Registration does not expose the authenticator's counter; the
            // first assertion establishes it
            counter: 0,
            transports,
            created_at: Utc::now(),
            last_used_at: None,
        }
    }

    pub fn id(&self) -> &CredentialID {
        self.passkey.cred_id()
    }
}

/// Verifier state for a begun ceremony
#[derive(Debug)]
pub enum PendingCeremony {
    Registration(PasskeyRegistration),
    Authentication(PasskeyAuthentication),
    /// Authentication begun for a user with no credentials: empty allow-list
    Discoverable(DiscoverableAuthentication),
}

impl PendingCeremony {
    pub fn kind(&self) -> CeremonyKind {
        match self {
            PendingCeremony::Registration(_) => CeremonyKind::Registration,
            PendingCeremony::Authentication(_) | PendingCeremony::Discoverable(_) => {
                CeremonyKind::Authentication
            }
        }
    }
}

/// A pending ceremony together with its lifetime
///
/// ## Challenge Lifecycle
/// 1. Begin call stores the entry (overwriting any previous one for the user)
/// 2. Finish call takes it out, whatever the verification outcome
/// 3. Entries never finished are dropped once `expires_at` passes
#[derive(Debug)]
pub struct PendingEntry {
    pub ceremony: PendingCeremony,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl PendingEntry {
    pub fn new(ceremony: PendingCeremony, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            ceremony,
            created_at: now,
            expires_at: now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}
