use crate::store::models::User;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Username -> user map, shared process-wide
///
/// Users are handed out as `Arc<User>` so every request for the same
/// username sees the same record.
#[derive(Debug, Default)]
pub struct UserStore {
    users: RwLock<HashMap<String, Arc<User>>>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the user for `username`, creating it on first reference
    pub fn get_or_create(&self, username: &str) -> Arc<User> {
        if let Some(user) = self.users.read().get(username) {
            return user.clone();
        }

        // Another request may have created it between the two locks; entry()
        // keeps whichever got there first
        let mut users = self.users.write();
        users
            .entry(username.to_string())
            .or_insert_with(|| {
                tracing::debug!("Creating user '{}'", username);
                Arc::new(User::new(username))
            })
            .clone()
    }

    pub fn find_by_username(&self, username: &str) -> Option<Arc<User>> {
        self.users.read().get(username).cloned()
    }

    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.read().is_empty()
    }
}
