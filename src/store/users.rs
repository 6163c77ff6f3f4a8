//! User store
//!
//! Tracks every user id the gateway has seen. Populated by dev seeding
//! and lazily the first time an id shows up in a mutating request.

use dashmap::DashMap;
use tracing::debug;

use crate::model::UserRecord;

/// In-memory user store
pub struct UserStore {
    /// Users by id
    users: DashMap<String, UserRecord>,
}

impl UserStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
        }
    }

    /// Insert or replace a user record
    pub fn upsert(&self, user: UserRecord) {
        debug!(user = %user.id, "Storing user record");
        self.users.insert(user.id.clone(), user);
    }

    /// Record an id on first sight; keeps an existing record untouched.
    ///
    /// Returns true when the id was new.
    pub fn ensure_known(&self, user_id: &str) -> bool {
        if self.users.contains_key(user_id) {
            return false;
        }
        self.upsert(UserRecord::new(user_id.to_string(), String::new()));
        true
    }

    /// Get a user by id
    pub fn get(&self, user_id: &str) -> Option<UserRecord> {
        self.users.get(user_id).map(|u| u.clone())
    }

    /// Number of known users
    pub fn count(&self) -> usize {
        self.users.len()
    }
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new()
    }
}
