//! Shared types for Amber

pub mod error;

pub use error::{AmberError, Result};
