//! Amber - registration gateway for research projects
//!
//! "Frozen in amber" - a draft registration, once confirmed, becomes an
//! immutable snapshot of its source project.
//!
//! Amber fronts the preregistration workflow: contributors branch a
//! draft off a project, fill it against a registration schema, then
//! spend a server-minted confirmation token to freeze it into a
//! registration that can never be edited or deleted.
//!
//! ## Services
//!
//! - **Registrar**: Draft lifecycle and the two-step freeze confirmation
//! - **Schemas**: Built-in catalog of registration form schemas
//! - **Permissions**: Read/Write/Admin contributor matrix on projects
//! - **Stores**: In-memory, soft-delete-aware record stores

pub mod auth;
pub mod config;
pub mod dev;
pub mod model;
pub mod registrar;
pub mod routes;
pub mod schema;
pub mod server;
pub mod store;
pub mod types;

pub use config::Args;
pub use server::{run, AppState};
pub use types::{AmberError, Result};
