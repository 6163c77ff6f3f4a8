//! Draft registration record
//!
//! A mutable working copy of a registration form, branched from a
//! project. Holds the chosen metaschema by `(name, version)` value pair
//! and a free-form metadata document. Confirming a freeze consumes the
//! draft: `registered_node` points at the resulting registration and
//! the draft can never be registered again.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::model::Metadata;

/// A draft registration branched from a project
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct DraftRegistration {
    /// Draft id (uuid)
    pub id: String,

    /// Common metadata (created_at, updated_at, is_deleted)
    #[serde(default)]
    pub metadata: Metadata,

    /// Project this draft was branched from
    pub branched_from: String,

    /// User who initiated the draft
    pub initiator: String,

    /// Metaschema name this draft is filled out against
    pub schema_name: String,

    /// Metaschema version (exact; identity is the full pair)
    pub schema_version: u32,

    /// Supplied form answers, replaced wholesale on update
    #[serde(default = "empty_object")]
    pub registration_metadata: JsonValue,

    /// Registration created from this draft, once confirmed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registered_node: Option<String>,
}

fn empty_object() -> JsonValue {
    JsonValue::Object(serde_json::Map::new())
}

impl DraftRegistration {
    /// Create a new draft against a resolved schema
    pub fn new(
        branched_from: String,
        initiator: String,
        schema_name: String,
        schema_version: u32,
        registration_metadata: Option<JsonValue>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            metadata: Metadata::new(),
            branched_from,
            initiator,
            schema_name,
            schema_version,
            registration_metadata: registration_metadata.unwrap_or_else(empty_object),
            registered_node: None,
        }
    }

    /// Whether the draft has already been turned into a registration
    pub fn is_registered(&self) -> bool {
        self.registered_node.is_some()
    }

    pub fn is_deleted(&self) -> bool {
        self.metadata.is_deleted
    }

    /// The schema identity pair
    pub fn schema_pair(&self) -> (&str, u32) {
        (&self.schema_name, self.schema_version)
    }
}
