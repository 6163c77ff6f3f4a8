//! Permission levels and access decisions for project-scoped records
//!
//! Contributor permissions are ordered: a higher level implies every
//! lower one. Visibility (`can_view`) and editability (`can_edit`) are
//! deliberately separate questions: a public record is viewable by
//! anyone, but editing always requires an explicit contributor grant.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::auth::Actor;
use crate::types::{AmberError, Result};

/// Contributor permission levels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Permission {
    /// Can view the record even when it is private
    #[default]
    Read = 0,
    /// Can modify the record and its drafts
    Write = 1,
    /// Can manage contributors and project-scoped listings
    Admin = 2,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Permission::Read => write!(f, "read"),
            Permission::Write => write!(f, "write"),
            Permission::Admin => write!(f, "admin"),
        }
    }
}

/// Anything with a visibility flag and a contributor table.
///
/// Projects and registrations both answer access questions the same
/// way; the checks below are generic over this seam.
pub trait AccessControlled {
    /// Whether the record is publicly visible
    fn is_public(&self) -> bool;

    /// The explicit permission granted to a user, if any
    fn permission_of(&self, user_id: &str) -> Option<Permission>;
}

/// Effective permission of an actor on a record (None = no grant)
pub fn permission_for<R: AccessControlled>(actor: &Actor, record: &R) -> Option<Permission> {
    match actor.user_id() {
        Some(user_id) => record.permission_of(user_id),
        None => None,
    }
}

/// Can the actor see this record?
///
/// Public records are visible to everyone, anonymous included. Private
/// records require a contributor grant of at least `Read`.
pub fn can_view<R: AccessControlled>(actor: &Actor, record: &R) -> bool {
    if record.is_public() {
        return true;
    }
    matches!(permission_for(actor, record), Some(level) if level >= Permission::Read)
}

/// Can the actor modify this record?
///
/// Requires `Write` or higher. Visibility grants nothing here: a
/// read-only contributor can see a private record but never edit it,
/// and anonymous actors always fail.
pub fn can_edit<R: AccessControlled>(actor: &Actor, record: &R) -> bool {
    matches!(permission_for(actor, record), Some(level) if level >= Permission::Write)
}

/// Can the actor administer this record (contributors, scoped listings)?
pub fn can_admin<R: AccessControlled>(actor: &Actor, record: &R) -> bool {
    matches!(permission_for(actor, record), Some(level) if level >= Permission::Admin)
}

/// `can_view` lifted to `Result` for use with `?` in handlers
pub fn require_view<R: AccessControlled>(actor: &Actor, record: &R) -> Result<()> {
    if can_view(actor, record) {
        Ok(())
    } else {
        Err(AmberError::PermissionDenied(
            "viewing this record requires read access".to_string(),
        ))
    }
}

/// `can_edit` lifted to `Result`
pub fn require_edit<R: AccessControlled>(actor: &Actor, record: &R) -> Result<()> {
    if can_edit(actor, record) {
        Ok(())
    } else {
        Err(AmberError::PermissionDenied(
            "this operation requires write access".to_string(),
        ))
    }
}

/// `can_admin` lifted to `Result`
pub fn require_admin<R: AccessControlled>(actor: &Actor, record: &R) -> Result<()> {
    if can_admin(actor, record) {
        Ok(())
    } else {
        Err(AmberError::PermissionDenied(
            "this operation requires admin access".to_string(),
        ))
    }
}
