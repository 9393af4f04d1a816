use crate::composite::CompositeKind;
use crate::config::OrmConfig;
use crate::error::{OrmError, Result};
use crate::kind::EntityKind;
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::debug;

/// Kinds known to one application, by name.
///
/// Passed explicitly to whatever builds or looks up kinds; there is no
/// process-wide registry.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entities: IndexMap<String, Arc<EntityKind>>,
    composites: IndexMap<String, Arc<CompositeKind>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build every kind declared in `config`. Composite references resolve
    /// against the entity kinds declared in the same config.
    pub fn from_config(config: &OrmConfig) -> Result<Self> {
        let mut registry = Self::new();
        for entity in &config.entities {
            registry.register_entity(entity.to_kind()?)?;
        }
        for composite in &config.composites {
            let kind = composite.to_kind(&registry)?;
            registry.register_composite(kind)?;
        }
        Ok(registry)
    }

    fn ensure_free(&self, name: &str) -> Result<()> {
        if self.entities.contains_key(name) || self.composites.contains_key(name) {
            return Err(OrmError::invalid_kind(name, "kind registered twice"));
        }
        Ok(())
    }

    pub fn register_entity(&mut self, kind: EntityKind) -> Result<Arc<EntityKind>> {
        self.ensure_free(kind.name())?;
        debug!(kind = kind.name(), table = kind.table_name(), "registering entity kind");
        let kind = Arc::new(kind);
        self.entities.insert(kind.name().to_string(), kind.clone());
        Ok(kind)
    }

    pub fn register_composite(&mut self, kind: CompositeKind) -> Result<Arc<CompositeKind>> {
        self.ensure_free(kind.name())?;
        debug!(
            kind = kind.name(),
            table = kind.base().table_name(),
            "registering composite kind"
        );
        let kind = Arc::new(kind);
        self.composites.insert(kind.name().to_string(), kind.clone());
        Ok(kind)
    }

    pub fn entity(&self, name: &str) -> Result<Arc<EntityKind>> {
        self.entities
            .get(name)
            .cloned()
            .ok_or_else(|| OrmError::UnknownKind(name.to_string()))
    }

    pub fn composite(&self, name: &str) -> Result<Arc<CompositeKind>> {
        self.composites
            .get(name)
            .cloned()
            .ok_or_else(|| OrmError::UnknownKind(name.to_string()))
    }

    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    pub fn composite_names(&self) -> impl Iterator<Item = &str> {
        self.composites.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entities.len() + self.composites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
