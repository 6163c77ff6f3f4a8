//! Draft registration store
//!
//! In-memory draft records plus two secondary indexes: by initiator
//! (the user-scoped listing) and by source project (the project-scoped
//! listing). Index entries are never removed; liveness is re-checked
//! against the primary map on every read.

use dashmap::DashMap;
use tracing::debug;

use crate::model::DraftRegistration;

/// In-memory draft registration store
pub struct DraftStore {
    /// Drafts by id
    drafts: DashMap<String, DraftRegistration>,

    /// Draft ids by initiating user
    by_initiator: DashMap<String, Vec<String>>,

    /// Draft ids by source project
    by_project: DashMap<String, Vec<String>>,
}

impl DraftStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            drafts: DashMap::new(),
            by_initiator: DashMap::new(),
            by_project: DashMap::new(),
        }
    }

    /// Insert a new draft, maintaining both indexes
    pub fn insert(&self, draft: DraftRegistration) {
        debug!(
            draft = %draft.id,
            project = %draft.branched_from,
            initiator = %draft.initiator,
            "Storing draft registration"
        );
        self.by_initiator
            .entry(draft.initiator.clone())
            .or_default()
            .push(draft.id.clone());
        self.by_project
            .entry(draft.branched_from.clone())
            .or_default()
            .push(draft.id.clone());
        self.drafts.insert(draft.id.clone(), draft);
    }

    /// Get a draft by id, deleted or not
    pub fn get(&self, id: &str) -> Option<DraftRegistration> {
        self.drafts.get(id).map(|d| d.clone())
    }

    /// Get a live (non-deleted) draft by id
    pub fn get_active(&self, id: &str) -> Option<DraftRegistration> {
        self.drafts
            .get(id)
            .filter(|d| !d.is_deleted())
            .map(|d| d.clone())
    }

    /// Apply a mutation to a live draft in place.
    ///
    /// Returns false when the draft is missing or deleted. The closure
    /// runs under the shard lock, so keep it small.
    pub fn update<F>(&self, id: &str, f: F) -> bool
    where
        F: FnOnce(&mut DraftRegistration),
    {
        match self.drafts.get_mut(id) {
            Some(mut draft) if !draft.is_deleted() => {
                f(&mut draft);
                draft.metadata.touch();
                true
            }
            _ => false,
        }
    }

    /// Soft-delete a draft
    pub fn soft_delete(&self, id: &str) -> bool {
        match self.drafts.get_mut(id) {
            Some(mut draft) if !draft.is_deleted() => {
                draft.metadata.soft_delete();
                debug!(draft = %id, "Draft soft-deleted");
                true
            }
            _ => false,
        }
    }

    /// Mark a draft as consumed by a registration
    pub fn mark_registered(&self, id: &str, registration_id: &str) -> bool {
        self.update(id, |draft| {
            draft.registered_node = Some(registration_id.to_string());
        })
    }

    /// Live drafts initiated by a user, newest first
    pub fn list_by_initiator(&self, user_id: &str) -> Vec<DraftRegistration> {
        self.collect_live(self.by_initiator.get(user_id))
    }

    /// Live drafts branched from a project, newest first
    pub fn list_by_project(&self, project_id: &str) -> Vec<DraftRegistration> {
        self.collect_live(self.by_project.get(project_id))
    }

    fn collect_live(
        &self,
        ids: Option<dashmap::mapref::one::Ref<'_, String, Vec<String>>>,
    ) -> Vec<DraftRegistration> {
        let mut drafts: Vec<DraftRegistration> = match ids {
            Some(ids) => ids
                .iter()
                .filter_map(|id| self.get_active(id))
                .collect(),
            None => Vec::new(),
        };
        drafts.sort_by(|a, b| b.metadata.created_at.cmp(&a.metadata.created_at));
        drafts
    }

    /// Number of live drafts
    pub fn count_active(&self) -> usize {
        self.drafts.iter().filter(|d| !d.is_deleted()).count()
    }

    /// Total records including soft-deleted ones
    pub fn count_total(&self) -> usize {
        self.drafts.len()
    }
}

impl Default for DraftStore {
    fn default() -> Self {
        Self::new()
    }
}
