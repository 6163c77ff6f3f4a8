//! In-memory stores
//!
//! DashMap-backed record stores shared across request tasks via `Arc`.
//! All of them are soft-delete aware: records stay put forever and the
//! `*_active` read paths filter the deleted ones out.

pub mod drafts;
pub mod projects;
pub mod registrations;
pub mod users;

pub use drafts::DraftStore;
pub use projects::ProjectStore;
pub use registrations::RegistrationStore;
pub use users::UserStore;
