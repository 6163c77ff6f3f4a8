//! Common record metadata
//!
//! Every stored entity carries the same bookkeeping block: creation and
//! update timestamps plus the soft-delete marker. Nothing is ever removed
//! from a store; deletion flips `is_deleted` and every read path filters
//! on it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Common metadata embedded in every stored record
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Metadata {
    /// Whether the record is soft-deleted
    #[serde(default)]
    pub is_deleted: bool,

    /// When the record was soft-deleted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,

    /// Last modification time
    pub updated_at: DateTime<Utc>,

    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl Metadata {
    /// Create metadata for a brand-new record
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            is_deleted: false,
            deleted_at: None,
            updated_at: now,
            created_at: now,
        }
    }

    /// Bump the update timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Mark the record as deleted
    pub fn soft_delete(&mut self) {
        let now = Utc::now();
        self.is_deleted = true;
        self.deleted_at = Some(now);
        self.updated_at = now;
    }
}

impl Default for Metadata {
    fn default() -> Self {
        Self::new()
    }
}
