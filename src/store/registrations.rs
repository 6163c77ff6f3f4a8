//! Registration store
//!
//! In-memory registration snapshots. Registrations are written once at
//! freeze confirmation and never mutated through the gateway, so the
//! store exposes no update path.

use dashmap::DashMap;
use tracing::debug;

use crate::model::Registration;

/// In-memory registration store
pub struct RegistrationStore {
    /// Registrations by id
    registrations: DashMap<String, Registration>,
}

impl RegistrationStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            registrations: DashMap::new(),
        }
    }

    /// Insert a freshly minted registration
    pub fn insert(&self, registration: Registration) {
        debug!(
            registration = %registration.id,
            project = %registration.registered_from,
            "Storing registration"
        );
        self.registrations
            .insert(registration.id.clone(), registration);
    }

    /// Get a registration by id, deleted or not
    pub fn get(&self, id: &str) -> Option<Registration> {
        self.registrations.get(id).map(|r| r.clone())
    }

    /// Get a live (non-deleted) registration by id
    pub fn get_active(&self, id: &str) -> Option<Registration> {
        self.registrations
            .get(id)
            .filter(|r| !r.is_deleted())
            .map(|r| r.clone())
    }

    /// Whether any record (live or deleted) exists under this id
    pub fn contains(&self, id: &str) -> bool {
        self.registrations.contains_key(id)
    }

    /// All live registrations, newest first
    pub fn list_active(&self) -> Vec<Registration> {
        let mut all: Vec<Registration> = self
            .registrations
            .iter()
            .filter(|r| !r.is_deleted())
            .map(|r| r.clone())
            .collect();
        all.sort_by(|a, b| b.registered_date.cmp(&a.registered_date));
        all
    }

    /// Number of live registrations
    pub fn count_active(&self) -> usize {
        self.registrations.iter().filter(|r| !r.is_deleted()).count()
    }

    /// Total records including soft-deleted ones
    pub fn count_total(&self) -> usize {
        self.registrations.len()
    }
}

impl Default for RegistrationStore {
    fn default() -> Self {
        Self::new()
    }
}
