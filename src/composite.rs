//! Entities whose attribute set embeds other entities' primary keys.
//!
//! A [`CompositeKind`] wraps a plain [`EntityKind`] whose fields are the
//! flattened foreign keys of every [`Reference`] followed by the composite's
//! own fields. All clause generation goes through that base kind; this module
//! only adds flattening on construction and decomposition on decode.

use crate::clause::KeyLookup;
use crate::entity::{fold_keys, Dict, Entity, Mapped};
use crate::error::{OrmError, Result};
use crate::kind::{EntityKind, PRIVATE_PREFIX};
use crate::store::Store;
use crate::value::Value;
use indexmap::IndexMap;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tracing::{error, warn};

/// A named relationship to another kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    name: String,
    kind: Arc<EntityKind>,
    /// Referenced primary-key attribute -> own foreign-key attribute, in key order.
    foreign_keys: IndexMap<String, String>,
}

impl Reference {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &Arc<EntityKind> {
        &self.kind
    }

    pub fn foreign_key(&self, primary_key: &str) -> Option<&str> {
        self.foreign_keys.get(primary_key).map(String::as_str)
    }

    pub fn foreign_keys(&self) -> impl Iterator<Item = (&String, &String)> {
        self.foreign_keys.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeKind {
    base: Arc<EntityKind>,
    references: IndexMap<String, Reference>,
    foreign_to_primary: HashMap<String, (String, String)>,
}

impl CompositeKind {
    pub fn builder(name: impl Into<String>, table_name: impl Into<String>) -> CompositeKindBuilder {
        CompositeKindBuilder::new(name, table_name)
    }

    pub fn name(&self) -> &str {
        self.base.name()
    }

    /// The flattened kind clauses are generated from.
    pub fn base(&self) -> &Arc<EntityKind> {
        &self.base
    }

    pub fn references(&self) -> impl Iterator<Item = &Reference> {
        self.references.values()
    }

    pub fn reference(&self, name: &str) -> Option<&Reference> {
        self.references.get(name)
    }

    pub fn primary_to_foreign_key(&self, reference: &str, primary_key: &str) -> Option<&str> {
        self.references.get(reference)?.foreign_key(primary_key)
    }

    /// `(reference name, referenced primary-key attribute)` for a foreign key.
    pub fn foreign_to_primary_key(&self, foreign_key: &str) -> Option<(&str, &str)> {
        self.foreign_to_primary
            .get(foreign_key)
            .map(|(reference, pk)| (reference.as_str(), pk.as_str()))
    }

    fn require(&self, reference: &str) -> Result<&Reference> {
        self.reference(reference)
            .ok_or_else(|| OrmError::unknown_reference(self.name(), reference))
    }
}

#[derive(Debug, Clone)]
pub struct CompositeKindBuilder {
    name: String,
    table_name: String,
    references: Vec<(String, Arc<EntityKind>)>,
    foreign_keys: Vec<(String, String, String)>,
    fields: Vec<String>,
    primary_key: Option<Vec<String>>,
    columns: Vec<(String, String)>,
    descriptions: BTreeMap<String, String>,
}

impl CompositeKindBuilder {
    pub fn new(name: impl Into<String>, table_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table_name: table_name.into(),
            references: Vec::new(),
            foreign_keys: Vec::new(),
            fields: Vec::new(),
            primary_key: None,
            columns: Vec::new(),
            descriptions: BTreeMap::new(),
        }
    }

    pub fn reference(mut self, name: impl Into<String>, kind: Arc<EntityKind>) -> Self {
        self.references.push((name.into(), kind));
        self
    }

    /// Store the referenced `primary_key` attribute under `foreign_key`.
    /// Undeclared keys keep their own name.
    pub fn foreign_key(mut self, reference: &str, primary_key: &str, foreign_key: &str) -> Self {
        self.foreign_keys.push((
            reference.to_string(),
            primary_key.to_lowercase(),
            foreign_key.to_lowercase(),
        ));
        self
    }

    /// Own, non-foreign field.
    pub fn field(mut self, name: &str) -> Self {
        self.fields.push(name.to_lowercase());
        self
    }

    pub fn fields<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.fields
            .extend(names.into_iter().map(|n| n.as_ref().to_lowercase()));
        self
    }

    pub fn primary_key<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.primary_key = Some(names.into_iter().map(|n| n.as_ref().to_string()).collect());
        self
    }

    pub fn column(mut self, attribute: &str, column: impl Into<String>) -> Self {
        self.columns.push((attribute.to_string(), column.into()));
        self
    }

    pub fn description(mut self, attribute: &str, text: impl Into<String>) -> Self {
        self.descriptions.insert(attribute.to_string(), text.into());
        self
    }

    pub fn build(self) -> Result<CompositeKind> {
        let name = self.name;
        let invalid = |reason: String| OrmError::invalid_kind(name.clone(), reason);

        let mut references: IndexMap<String, Reference> = IndexMap::new();
        for (ref_name, kind) in self.references {
            if references.contains_key(&ref_name) {
                return Err(invalid(format!("reference `{ref_name}` declared twice")));
            }
            references.insert(
                ref_name.clone(),
                Reference {
                    name: ref_name,
                    kind,
                    foreign_keys: IndexMap::new(),
                },
            );
        }

        let mut declared: HashMap<(String, String), String> = HashMap::new();
        for (ref_name, pk, fk) in self.foreign_keys {
            let reference = references
                .get(&ref_name)
                .ok_or_else(|| OrmError::unknown_reference(name.clone(), ref_name.clone()))?;
            if !reference.kind.primary_key().contains(&pk) {
                return Err(invalid(format!(
                    "`{pk}` is not a primary key attribute of `{}`",
                    reference.kind.name()
                )));
            }
            if let Some(previous) = declared.insert((ref_name.clone(), pk.clone()), fk) {
                return Err(invalid(format!(
                    "foreign key for `{ref_name}.{pk}` declared twice (first as `{previous}`)"
                )));
            }
        }

        let mut foreign_to_primary: HashMap<String, (String, String)> = HashMap::new();
        let mut fields = Vec::new();
        for reference in references.values_mut() {
            for pk in reference.kind.primary_key() {
                let fk = declared
                    .remove(&(reference.name.clone(), pk.clone()))
                    .unwrap_or_else(|| pk.clone());
                if let Some((other, _)) =
                    foreign_to_primary.insert(fk.clone(), (reference.name.clone(), pk.clone()))
                {
                    return Err(invalid(format!(
                        "references `{other}` and `{}` both flatten onto `{fk}`",
                        reference.name
                    )));
                }
                reference.foreign_keys.insert(pk.clone(), fk.clone());
                fields.push(fk);
            }
        }

        for field in &self.fields {
            if foreign_to_primary.contains_key(field) {
                return Err(invalid(format!("own field `{field}` shadows a foreign key")));
            }
        }
        fields.extend(self.fields);

        let mut base = EntityKind::builder(name.clone(), self.table_name).fields(fields);
        if let Some(pk) = self.primary_key {
            base = base.primary_key(pk);
        }
        for (attribute, column) in self.columns {
            base = base.column(&attribute, column);
        }
        for (attribute, text) in self.descriptions {
            base = base.description(&attribute, text);
        }

        Ok(CompositeKind {
            base: Arc::new(base.build()?),
            references,
            foreign_to_primary,
        })
    }
}

/// A value of a [`CompositeKind`]: the flattened base entity plus the owned
/// referenced entities it was built from.
#[derive(Debug, Clone)]
pub struct CompositeEntity {
    kind: Arc<CompositeKind>,
    base: Entity,
    references: IndexMap<String, Entity>,
}

impl CompositeEntity {
    /// Flatten `references` into a new value. References left out are dummies.
    pub fn new<R, N, I, K, V>(kind: Arc<CompositeKind>, references: R, extras: I) -> Result<Self>
    where
        R: IntoIterator<Item = (N, Entity)>,
        N: Into<String>,
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut supplied = IndexMap::new();
        for (name, entity) in references {
            let name: String = name.into();
            let reference = kind.require(&name)?;
            if entity.kind().name() != reference.kind.name() {
                return Err(OrmError::KindMismatch {
                    expected: reference.kind.name().to_string(),
                    found: entity.kind().name().to_string(),
                });
            }
            supplied.insert(name, entity);
        }
        let base = Entity::new(kind.base.clone(), extras);
        Ok(Self::assemble(kind, supplied, base))
    }

    pub fn from_references<R, N>(kind: Arc<CompositeKind>, references: R) -> Result<Self>
    where
        R: IntoIterator<Item = (N, Entity)>,
        N: Into<String>,
    {
        Self::new(kind, references, Vec::<(String, Value)>::new())
    }

    pub fn dummy(kind: Arc<CompositeKind>) -> Self {
        let base = Entity::dummy(kind.base.clone());
        Self::assemble(kind, IndexMap::new(), base)
    }

    fn assemble(kind: Arc<CompositeKind>, mut supplied: IndexMap<String, Entity>, mut base: Entity) -> Self {
        let mut references = IndexMap::with_capacity(kind.references.len());
        for reference in kind.references.values() {
            let entity = supplied
                .swap_remove(&reference.name)
                .unwrap_or_else(|| Entity::dummy(reference.kind.clone()));
            for (pk, fk) in &reference.foreign_keys {
                base.set(fk, entity.value(pk).clone());
            }
            references.insert(reference.name.clone(), entity);
        }
        Self {
            kind,
            base,
            references,
        }
    }

    /// Split a flat dict into per-reference key groups and own attributes.
    ///
    /// `None` when a primary-key attribute of the composite is missing or
    /// two keys differ only in case. Groups too small to key their
    /// referenced entity do not fail: the reference comes back partially
    /// populated.
    pub fn from_dict(kind: Arc<CompositeKind>, dict: &Dict) -> Option<Self> {
        let dict = match fold_keys(&kind.base, dict, false) {
            Ok(dict) => dict,
            Err(err) => {
                error!(kind = kind.name(), %err, "converting incompatible dict");
                return None;
            }
        };
        for key in kind.base.primary_key() {
            if !dict.contains_key(key) {
                error!(kind = kind.name(), missing = %key, "converting incompatible dict");
                return None;
            }
        }

        let mut groups: IndexMap<String, Dict> = IndexMap::new();
        let mut extras = Dict::new();
        for (key, value) in dict {
            match kind.foreign_to_primary_key(&key) {
                Some((reference, pk)) => {
                    groups
                        .entry(reference.to_string())
                        .or_default()
                        .insert(pk.to_string(), value);
                }
                None => {
                    extras.insert(key, value);
                }
            }
        }

        let mut supplied = IndexMap::new();
        for (name, group) in groups {
            let Some(reference) = kind.reference(&name) else {
                continue;
            };
            let missing: Vec<&String> = reference
                .kind
                .primary_key()
                .iter()
                .filter(|pk| !group.contains_key(pk.as_str()))
                .collect();
            if !missing.is_empty() {
                warn!(
                    kind = kind.name(),
                    reference = %name,
                    ?missing,
                    "partial foreign key, referenced entity left incomplete"
                );
            }
            let entity = Entity::new(reference.kind.clone(), group);
            supplied.insert(name, entity);
        }

        let base = Entity::new(kind.base.clone(), extras);
        Some(Self::assemble(kind, supplied, base))
    }

    pub fn from_db_entry(kind: Arc<CompositeKind>, columns: &[String], row: &[Value]) -> Result<Option<Self>> {
        let dict = Entity::dict_from_db_entry(&kind.base, columns, row)?;
        Ok(Self::from_dict(kind, &dict))
    }

    pub fn composite_kind(&self) -> &Arc<CompositeKind> {
        &self.kind
    }

    /// The flattened entity.
    pub fn base(&self) -> &Entity {
        &self.base
    }

    pub fn reference(&self, name: &str) -> Option<&Entity> {
        self.references.get(name)
    }

    pub fn references(&self) -> impl Iterator<Item = (&String, &Entity)> {
        self.references.iter()
    }

    /// Look up the entity behind reference `name` using the flattened key values.
    pub fn referenced_element<S: Store + ?Sized>(&self, name: &str, store: &mut S) -> Result<Option<Entity>> {
        let reference = self.kind.require(name)?;
        let probe = Entity::new(
            reference.kind.clone(),
            reference
                .foreign_keys()
                .map(|(pk, fk)| (pk.clone(), self.base.value(fk).clone())),
        );
        let result = probe.lookup(store)?;
        match result.rows.first() {
            Some(row) => Entity::from_db_entry(reference.kind.clone(), &result.columns, row),
            None => Ok(None),
        }
    }

    /// Composite rows sharing the foreign keys of the named references.
    pub fn lookup_for_elements<S: Store + ?Sized>(&self, names: &[&str], store: &mut S) -> Result<Vec<Self>> {
        let mut keys = Vec::new();
        for name in names {
            let reference = self.kind.require(name)?;
            keys.extend(reference.foreign_keys().map(|(_, fk)| fk.clone()));
        }
        let result = self.lookup_for_keys(&keys, &KeyLookup::default(), store)?;
        let mut elements = Vec::with_capacity(result.rows.len());
        for row in &result.rows {
            match Self::from_db_entry(self.kind.clone(), &result.columns, row)? {
                Some(element) => elements.push(element),
                None => warn!(kind = self.kind.name(), "skipping undecodable row"),
            }
        }
        Ok(elements)
    }
}

impl Mapped for CompositeEntity {
    fn kind(&self) -> &EntityKind {
        &self.kind.base
    }

    fn value(&self, attribute: &str) -> &Value {
        self.base.value(attribute)
    }

    fn attributes(&self) -> Vec<String> {
        Self::dummy(self.kind.clone())
            .base
            .field_names()
            .filter(|f| !f.starts_with(PRIVATE_PREFIX))
            .map(str::to_string)
            .collect()
    }
}

impl PartialEq for CompositeEntity {
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base
    }
}

impl Eq for CompositeEntity {}

impl Hash for CompositeEntity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.base.hash(state);
    }
}

impl fmt::Display for CompositeEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.base, f)
    }
}
