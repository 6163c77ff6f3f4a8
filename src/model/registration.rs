//! Registration record
//!
//! An immutable snapshot of a project at freeze time. Title,
//! description, contributor table, and visibility are copied from the
//! source project when the snapshot is taken; later project edits never
//! leak in, and the gateway exposes no mutation surface for
//! registrations at all.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::auth::{AccessControlled, Permission};
use crate::model::{DraftRegistration, Metadata, Project};

/// Lifecycle state a registration is minted into.
///
/// Exactly one applies at a time; embargo and approval are mutually
/// exclusive by construction.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RegistrationState {
    /// Immediately live
    Registered,
    /// Awaiting an explicit approval decision
    PendingApproval,
    /// Withheld until the embargo end date passes
    Embargoed { end_date: DateTime<Utc> },
}

/// A frozen snapshot of a project
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Registration {
    /// Registration id (uuid)
    pub id: String,

    /// Common metadata (created_at, updated_at, is_deleted)
    #[serde(default)]
    pub metadata: Metadata,

    /// Source project the snapshot was taken from
    pub registered_from: String,

    /// Title copied from the source project at freeze time
    pub title: String,

    /// Description copied from the source project
    #[serde(default)]
    pub description: String,

    /// Category copied from the source project
    #[serde(default)]
    pub category: String,

    /// Visibility copied from the source project
    #[serde(default)]
    pub is_public: bool,

    /// Contributor table copied from the source project
    #[serde(default)]
    pub contributors: HashMap<String, Permission>,

    /// User who confirmed the freeze
    pub initiator: String,

    /// Metaschema the draft was filled out against
    pub schema_name: String,
    pub schema_version: u32,

    /// Form answers frozen from the draft
    pub registered_meta: JsonValue,

    /// Minted lifecycle state
    #[serde(flatten)]
    pub state: RegistrationState,

    /// When the freeze was confirmed
    pub registered_date: DateTime<Utc>,
}

impl Registration {
    /// Snapshot a project + draft pair into a registration.
    ///
    /// Copies the project's current presentation fields and contributor
    /// table, and the draft's schema reference and answers.
    pub fn from_snapshot(
        project: &Project,
        draft: &DraftRegistration,
        initiator: &str,
        state: RegistrationState,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            metadata: Metadata::new(),
            registered_from: project.id.clone(),
            title: project.title.clone(),
            description: project.description.clone(),
            category: project.category.clone(),
            is_public: project.is_public,
            contributors: project.contributors.clone(),
            initiator: initiator.to_string(),
            schema_name: draft.schema_name.clone(),
            schema_version: draft.schema_version,
            registered_meta: draft.registration_metadata.clone(),
            state,
            registered_date: Utc::now(),
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.metadata.is_deleted
    }
}

impl AccessControlled for Registration {
    fn is_public(&self) -> bool {
        self.is_public
    }

    fn permission_of(&self, user_id: &str) -> Option<Permission> {
        self.contributors.get(user_id).copied()
    }
}
