//! Identity and authorization for Amber
//!
//! Provides:
//! - Actor resolution from the trusted proxy header
//! - Ordered contributor permission levels
//! - Pure access checks over (actor, record) pairs

pub mod actor;
pub mod permissions;

pub use actor::{Actor, USER_ID_HEADER};
pub use permissions::{
    can_admin, can_edit, can_view, permission_for, require_admin, require_edit, require_view,
    AccessControlled, Permission,
};
