//! Declarative kind configuration, loaded from JSON.
//!
//! ```json
//! {
//!   "sqlite": { "db_path": "app.db" },
//!   "entities": [
//!     { "name": "Person", "table": "people", "primary_key": ["id"], "attributes": ["id", "name"] }
//!   ],
//!   "composites": [
//!     {
//!       "name": "Membership", "table": "memberships",
//!       "primary_key": ["person_id"], "attributes": ["role"],
//!       "references": [
//!         { "name": "person", "kind": "Person", "foreign_keys": { "id": "person_id" } }
//!       ]
//!     }
//!   ]
//! }
//! ```

use crate::composite::CompositeKind;
use crate::error::Result;
use crate::kind::EntityKind;
use crate::registry::Registry;
use crate::sqlite::SqliteConfig;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrmConfig {
    #[serde(default)]
    pub sqlite: SqliteConfig,
    #[serde(default)]
    pub entities: Vec<EntityConfig>,
    #[serde(default)]
    pub composites: Vec<CompositeConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityConfig {
    pub name: String,
    pub table: String,
    pub primary_key: Vec<String>,
    pub attributes: Vec<String>,
    /// Attribute -> column, for attributes stored under another name.
    #[serde(default)]
    pub columns: BTreeMap<String, String>,
    #[serde(default)]
    pub descriptions: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeConfig {
    pub name: String,
    pub table: String,
    /// Left out, the kind asks for primary-key inference and fails to build.
    #[serde(default)]
    pub primary_key: Option<Vec<String>>,
    /// Own, non-foreign attributes.
    #[serde(default)]
    pub attributes: Vec<String>,
    pub references: Vec<ReferenceConfig>,
    #[serde(default)]
    pub columns: BTreeMap<String, String>,
    #[serde(default)]
    pub descriptions: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceConfig {
    pub name: String,
    /// Name of a registered entity kind.
    pub kind: String,
    /// Referenced primary-key attribute -> own foreign-key attribute.
    #[serde(default)]
    pub foreign_keys: BTreeMap<String, String>,
}

impl OrmConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_json_str(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }
}

impl EntityConfig {
    pub fn to_kind(&self) -> Result<EntityKind> {
        let mut builder = EntityKind::builder(&self.name, &self.table)
            .fields(&self.attributes)
            .primary_key(&self.primary_key);
        for (attribute, column) in &self.columns {
            builder = builder.column(attribute, column.clone());
        }
        if let Some(descriptions) = &self.descriptions {
            for (attribute, text) in descriptions {
                builder = builder.description(attribute, text.clone());
            }
        }
        builder.build()
    }
}

impl CompositeConfig {
    pub fn to_kind(&self, registry: &Registry) -> Result<CompositeKind> {
        let mut builder = CompositeKind::builder(&self.name, &self.table).fields(&self.attributes);
        for reference in &self.references {
            builder = builder.reference(reference.name.clone(), registry.entity(&reference.kind)?);
            for (pk, fk) in &reference.foreign_keys {
                builder = builder.foreign_key(&reference.name, pk, fk);
            }
        }
        if let Some(pk) = &self.primary_key {
            builder = builder.primary_key(pk);
        }
        for (attribute, column) in &self.columns {
            builder = builder.column(attribute, column.clone());
        }
        for (attribute, text) in &self.descriptions {
            builder = builder.description(attribute, text.clone());
        }
        builder.build()
    }
}
