//! HTTP server for Amber

pub mod http;

pub use http::{run, AppState};
