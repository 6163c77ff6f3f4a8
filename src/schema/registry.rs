//! Metaschema registry
//!
//! In-core, read-only catalog of registration metaschemas. Seeded once
//! at startup from the builtin set and never mutated afterwards.
//! Lookup is exact-match on the full `(name, version)` pair: no fuzzy
//! matching, no latest-version fallback.

use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::types::{AmberError, Result};

/// Identity of a schema: name plus exact version
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemaKey {
    pub name: String,
    pub version: u32,
}

impl SchemaKey {
    pub fn new(name: &str, version: u32) -> Self {
        Self {
            name: name.to_string(),
            version,
        }
    }

    /// Display string for logging
    pub fn display(&self) -> String {
        format!("{} v{}", self.name, self.version)
    }
}

/// A registration metaschema.
///
/// The `schema` body is an opaque form definition (pages of questions);
/// the gateway hands it to clients verbatim and never validates filled
/// answers against it.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct MetaSchema {
    pub name: String,
    pub schema_version: u32,
    pub schema: JsonValue,
}

impl MetaSchema {
    pub fn key(&self) -> SchemaKey {
        SchemaKey::new(&self.name, self.schema_version)
    }
}

/// Registry of metaschemas with concurrent read access
pub struct SchemaRegistry {
    /// Schemas by (name, version)
    schemas: DashMap<SchemaKey, Arc<MetaSchema>>,
}

impl SchemaRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            schemas: DashMap::new(),
        }
    }

    /// Create a registry seeded with the builtin catalog
    pub fn with_builtin() -> Self {
        let registry = Self::new();
        for schema in builtin_schemas() {
            registry.insert(schema);
        }
        registry
    }

    /// Seed one schema (startup only)
    pub fn insert(&self, schema: MetaSchema) {
        let key = schema.key();
        debug!(schema = %key.display(), "Seeding metaschema");
        self.schemas.insert(key, Arc::new(schema));
    }

    /// Exact-match lookup by (name, version)
    pub fn resolve(&self, name: &str, version: u32) -> Result<Arc<MetaSchema>> {
        self.schemas
            .get(&SchemaKey::new(name, version))
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| {
                AmberError::NotFound(format!(
                    "no schema record matched '{}' version {}",
                    name, version
                ))
            })
    }

    /// Enumerate the catalog, sorted by name then version.
    ///
    /// `latest_only` collapses each name to its highest version.
    pub fn list(&self, latest_only: bool) -> Vec<Arc<MetaSchema>> {
        let mut all: Vec<Arc<MetaSchema>> = self
            .schemas
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        all.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then(a.schema_version.cmp(&b.schema_version))
        });

        if latest_only {
            // Sorted ascending by version within each name, so the last
            // entry per name is the latest.
            let mut latest: Vec<Arc<MetaSchema>> = Vec::new();
            for schema in all {
                match latest.last_mut() {
                    Some(prev) if prev.name == schema.name => *prev = schema,
                    _ => latest.push(schema),
                }
            }
            latest
        } else {
            all
        }
    }

    /// Number of seeded schemas
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

/// The builtin metaschema catalog.
///
/// Form bodies are abbreviated but structurally real: pages of
/// questions with ids, titles, and input types.
pub fn builtin_schemas() -> Vec<MetaSchema> {
    use serde_json::json;

    vec![
        MetaSchema {
            name: "Open-Ended Registration".to_string(),
            schema_version: 1,
            schema: json!({
                "title": "Open-Ended Registration",
                "pages": [{
                    "id": "page1",
                    "title": "Summary",
                    "questions": [{
                        "qid": "summary",
                        "title": "Summarize the current state of the project",
                        "type": "textarea"
                    }]
                }]
            }),
        },
        MetaSchema {
            name: "OSF-Standard Pre-Data Collection Registration".to_string(),
            schema_version: 1,
            schema: json!({
                "title": "OSF-Standard Pre-Data Collection Registration",
                "pages": [{
                    "id": "page1",
                    "title": "Data collection status",
                    "questions": [
                        {
                            "qid": "datacompletion",
                            "title": "Has data collection begun for this project?",
                            "type": "choose",
                            "options": [
                                "No, data collection has not begun",
                                "Yes, data collection is underway or complete"
                            ]
                        },
                        {
                            "qid": "looked",
                            "title": "Have you looked at the data?",
                            "type": "choose",
                            "options": ["Yes", "No"]
                        },
                        {
                            "qid": "comments",
                            "title": "Other comments",
                            "type": "textarea"
                        }
                    ]
                }]
            }),
        },
        MetaSchema {
            name: "Replication Recipe (Brandt et al., 2013): Pre-Registration".to_string(),
            schema_version: 1,
            schema: json!({
                "title": "Replication Recipe (Brandt et al., 2013): Pre-Registration",
                "pages": [
                    {
                        "id": "page1",
                        "title": "The Nature of the Effect",
                        "questions": [
                            {
                                "qid": "item1",
                                "title": "Verbal description of the effect I am trying to replicate",
                                "type": "textarea"
                            },
                            {
                                "qid": "item2",
                                "title": "It is important to replicate this effect because",
                                "type": "textarea"
                            }
                        ]
                    },
                    {
                        "id": "page2",
                        "title": "Designing the Replication Study",
                        "questions": [
                            {
                                "qid": "item9",
                                "title": "Location of the experimenter during data collection",
                                "type": "string"
                            },
                            {
                                "qid": "item11",
                                "title": "My target sample size is",
                                "type": "string"
                            }
                        ]
                    }
                ]
            }),
        },
        MetaSchema {
            name: "Replication Recipe (Brandt et al., 2013): Post-Completion".to_string(),
            schema_version: 1,
            schema: json!({
                "title": "Replication Recipe (Brandt et al., 2013): Post-Completion",
                "pages": [{
                    "id": "page1",
                    "title": "Registering the Replication Attempt",
                    "questions": [
                        {
                            "qid": "item28",
                            "title": "The finding is most appropriately described as",
                            "type": "choose",
                            "options": [
                                "a successful replication",
                                "an informative failure to replicate",
                                "a practical failure to replicate",
                                "an inconclusive replication"
                            ]
                        },
                        {
                            "qid": "item29",
                            "title": "I judge the replication to be a(n)",
                            "type": "textarea"
                        }
                    ]
                }]
            }),
        },
        MetaSchema {
            name: "Confirmatory - General".to_string(),
            schema_version: 1,
            schema: json!({
                "title": "Confirmatory - General",
                "pages": [{
                    "id": "page1",
                    "title": "Hypothesis",
                    "questions": [
                        {
                            "qid": "hypothesis",
                            "title": "State your specific, concise hypothesis",
                            "type": "textarea"
                        },
                        {
                            "qid": "dependent",
                            "title": "Identify the key dependent variable",
                            "type": "string"
                        }
                    ]
                }]
            }),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_seeded() {
        let registry = SchemaRegistry::with_builtin();
        assert_eq!(registry.len(), 5);
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_resolve_exact_match() {
        let registry = SchemaRegistry::with_builtin();
        let schema = registry
            .resolve("OSF-Standard Pre-Data Collection Registration", 1)
            .unwrap();
        assert_eq!(schema.schema_version, 1);
        assert!(schema.schema["pages"].is_array());
    }

    #[test]
    fn test_resolve_unknown_name() {
        let registry = SchemaRegistry::with_builtin();
        let err = registry.resolve("Nonexistent Schema", 1).unwrap_err();
        assert!(matches!(err, AmberError::NotFound(_)));
    }

    #[test]
    fn test_resolve_unknown_version_of_known_name() {
        let registry = SchemaRegistry::with_builtin();
        let err = registry.resolve("Open-Ended Registration", 2).unwrap_err();
        assert!(matches!(err, AmberError::NotFound(_)));
    }

    #[test]
    fn test_list_latest_collapses_versions() {
        let registry = SchemaRegistry::with_builtin();
        registry.insert(MetaSchema {
            name: "Open-Ended Registration".to_string(),
            schema_version: 2,
            schema: serde_json::json!({"pages": []}),
        });

        let all = registry.list(false);
        assert_eq!(all.len(), 6);

        let latest = registry.list(true);
        assert_eq!(latest.len(), 5);
        let open_ended = latest
            .iter()
            .find(|s| s.name == "Open-Ended Registration")
            .unwrap();
        assert_eq!(open_ended.schema_version, 2);
    }

    #[test]
    fn test_list_is_sorted_by_name() {
        let registry = SchemaRegistry::with_builtin();
        let all = registry.list(false);
        let names: Vec<&str> = all.iter().map(|s| s.name.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }
}
