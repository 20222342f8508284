//! # HTTP Request Handlers
//!
//! Each handler:
//! 1. Extracts the username (JSON body for begin calls, query string for finish calls)
//! 2. Resolves or creates the user
//! 3. Calls the relying party and stores or consumes the pending ceremony
//! 4. Returns JSON, or a plain-text error via `AppError`

pub mod passkey;
