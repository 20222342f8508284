//! # Store Module
//!
//! In-memory state shared by every request, constructed once at start-up:
//! - `models`: Data structures (User, StoredCredential, PendingCeremony)
//! - `users`: Username -> user map
//! - `credentials`: Operations on a user's registered passkeys
//! - `ceremonies`: Pending registration/authentication ceremonies
//!
//! Nothing here is persisted; all records live for the lifetime of the process.

pub mod ceremonies;
pub mod credentials;
pub mod models;
pub mod users;

pub use ceremonies::CeremonyStore;
pub use models::{PendingCeremony, StoredCredential, User};
pub use users::UserStore;
