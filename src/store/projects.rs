//! Project store
//!
//! In-memory project records with concurrent access. Records are never
//! removed; deletion is a soft-delete flip and `get_active` is the
//! read path everything user-facing goes through.

use dashmap::DashMap;
use tracing::debug;

use crate::model::Project;

/// In-memory project store
pub struct ProjectStore {
    /// Projects by id
    projects: DashMap<String, Project>,
}

impl ProjectStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            projects: DashMap::new(),
        }
    }

    /// Insert a new project
    pub fn insert(&self, project: Project) {
        debug!(project = %project.id, title = %project.title, "Storing project");
        self.projects.insert(project.id.clone(), project);
    }

    /// Get a project by id, deleted or not
    pub fn get(&self, id: &str) -> Option<Project> {
        self.projects.get(id).map(|p| p.clone())
    }

    /// Get a live (non-deleted) project by id
    pub fn get_active(&self, id: &str) -> Option<Project> {
        self.projects
            .get(id)
            .filter(|p| !p.is_deleted())
            .map(|p| p.clone())
    }

    /// Whether any record (live or deleted) exists under this id
    pub fn contains(&self, id: &str) -> bool {
        self.projects.contains_key(id)
    }

    /// Apply a mutation to a live project in place.
    ///
    /// Returns false when the project is missing or deleted; the
    /// closure runs under the shard lock, so keep it small.
    pub fn update<F>(&self, id: &str, f: F) -> bool
    where
        F: FnOnce(&mut Project),
    {
        match self.projects.get_mut(id) {
            Some(mut project) if !project.is_deleted() => {
                f(&mut project);
                project.metadata.touch();
                true
            }
            _ => false,
        }
    }

    /// Soft-delete a project
    pub fn soft_delete(&self, id: &str) -> bool {
        match self.projects.get_mut(id) {
            Some(mut project) if !project.is_deleted() => {
                project.metadata.soft_delete();
                debug!(project = %id, "Project soft-deleted");
                true
            }
            _ => false,
        }
    }

    /// Number of live projects
    pub fn count_active(&self) -> usize {
        self.projects.iter().filter(|p| !p.is_deleted()).count()
    }

    /// Total records including soft-deleted ones
    pub fn count_total(&self) -> usize {
        self.projects.len()
    }
}

impl Default for ProjectStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AccessControlled, Permission};

    fn sample_project() -> Project {
        Project::new(
            "Recall under load".to_string(),
            String::new(),
            "project".to_string(),
            false,
            "u-owner".to_string(),
        )
    }

    #[test]
    fn test_insert_and_get() {
        let store = ProjectStore::new();
        let project = sample_project();
        let id = project.id.clone();
        store.insert(project);

        assert!(store.get(&id).is_some());
        assert!(store.get_active(&id).is_some());
        assert!(store.get("missing").is_none());
    }

    #[test]
    fn test_soft_delete_hides_from_active() {
        let store = ProjectStore::new();
        let project = sample_project();
        let id = project.id.clone();
        store.insert(project);

        assert!(store.soft_delete(&id));
        assert!(store.get_active(&id).is_none());
        // The record itself survives
        assert!(store.get(&id).is_some());
        assert!(store.get(&id).unwrap().is_deleted());
        // Second delete is a no-op
        assert!(!store.soft_delete(&id));
    }

    #[test]
    fn test_update_mutates_in_place() {
        let store = ProjectStore::new();
        let project = sample_project();
        let id = project.id.clone();
        store.insert(project);

        let updated = store.update(&id, |p| {
            p.set_contributor("u-writer", Permission::Write);
        });
        assert!(updated);
        assert_eq!(
            store.get(&id).unwrap().permission_of("u-writer"),
            Some(Permission::Write)
        );
    }

    #[test]
    fn test_update_refuses_deleted() {
        let store = ProjectStore::new();
        let project = sample_project();
        let id = project.id.clone();
        store.insert(project);
        store.soft_delete(&id);

        assert!(!store.update(&id, |p| p.title = "changed".to_string()));
    }

    #[test]
    fn test_counts() {
        let store = ProjectStore::new();
        let a = sample_project();
        let b = sample_project();
        let a_id = a.id.clone();
        store.insert(a);
        store.insert(b);
        store.soft_delete(&a_id);

        assert_eq!(store.count_active(), 1);
        assert_eq!(store.count_total(), 2);
    }
}
