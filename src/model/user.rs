//! User record
//!
//! Identity lives with the fronting proxy; the gateway only keeps a
//! record of each user id it has seen so health reporting and
//! contributor listings have something to show.

use serde::{Deserialize, Serialize};

use crate::model::Metadata;

/// A user known to the gateway
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct UserRecord {
    /// Opaque user id, as forwarded by the proxy
    pub id: String,

    /// Common metadata (created_at, updated_at, is_deleted)
    #[serde(default)]
    pub metadata: Metadata,

    /// Display name, when one was supplied
    #[serde(default)]
    pub display_name: String,

    /// Whether the account is active
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl UserRecord {
    pub fn new(id: String, display_name: String) -> Self {
        Self {
            id,
            metadata: Metadata::new(),
            display_name,
            is_active: true,
        }
    }
}
