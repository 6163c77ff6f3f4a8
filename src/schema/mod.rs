//! Metaschema catalog for Amber

pub mod registry;

pub use registry::{builtin_schemas, MetaSchema, SchemaKey, SchemaRegistry};
