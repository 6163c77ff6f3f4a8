//! Project record
//!
//! The working research object: owns a title, a visibility flag, and a
//! contributor table. Drafts branch from projects; registrations are
//! frozen snapshots of them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{AccessControlled, Permission};
use crate::model::Metadata;

/// A research project
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Project {
    /// Project id (uuid)
    pub id: String,

    /// Common metadata (created_at, updated_at, is_deleted)
    #[serde(default)]
    pub metadata: Metadata,

    /// Display title
    pub title: String,

    /// Free-form description
    #[serde(default)]
    pub description: String,

    /// Project category (project, hypothesis, data, analysis, other)
    #[serde(default = "default_category")]
    pub category: String,

    /// Whether the project is publicly visible
    #[serde(default)]
    pub is_public: bool,

    /// User who created the project
    pub creator: String,

    /// Contributor permissions by user id (highest level wins; the
    /// table stores the effective level directly)
    #[serde(default)]
    pub contributors: HashMap<String, Permission>,
}

fn default_category() -> String {
    "project".to_string()
}

impl Project {
    /// Create a new project. The creator is seeded as an admin
    /// contributor.
    pub fn new(title: String, description: String, category: String, is_public: bool, creator: String) -> Self {
        let mut contributors = HashMap::new();
        contributors.insert(creator.clone(), Permission::Admin);

        Self {
            id: Uuid::new_v4().to_string(),
            metadata: Metadata::new(),
            title,
            description,
            category,
            is_public,
            creator,
            contributors,
        }
    }

    /// Grant (or change) a contributor's permission level
    pub fn set_contributor(&mut self, user_id: &str, level: Permission) {
        self.contributors.insert(user_id.to_string(), level);
        self.metadata.touch();
    }

    pub fn is_deleted(&self) -> bool {
        self.metadata.is_deleted
    }
}

impl AccessControlled for Project {
    fn is_public(&self) -> bool {
        self.is_public
    }

    fn permission_of(&self, user_id: &str) -> Option<Permission> {
        self.contributors.get(user_id).copied()
    }
}
