//! Stored entity records
//!
//! Plain data shapes shared by the stores, the registrar, and the
//! route serializers. Every record embeds the common [`Metadata`]
//! block for timestamps and soft deletion.

pub mod draft;
pub mod metadata;
pub mod project;
pub mod registration;
pub mod user;

pub use draft::DraftRegistration;
pub use metadata::Metadata;
pub use project::Project;
pub use registration::{Registration, RegistrationState};
pub use user::UserRecord;
