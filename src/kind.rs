//! Entity kind declarations.
//!
//! An [`EntityKind`] is the per-table shape every [`Entity`](crate::Entity)
//! value carries a handle to: table name, declared fields, primary key and
//! the attribute/column name translation.

use crate::error::{OrmError, Result};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Fields starting with this prefix are held by entity values but never mapped
/// to storage columns.
pub const PRIVATE_PREFIX: &str = "_";

/// Bidirectional attribute/column name translation.
///
/// Names without an explicit entry translate to themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnNames {
    to_schema: HashMap<String, String>,
    to_class: HashMap<String, String>,
}

impl ColumnNames {
    pub fn identity() -> Self {
        Self::default()
    }

    pub fn is_identity(&self) -> bool {
        self.to_schema.is_empty()
    }

    /// Attribute name to storage column name.
    pub fn class_to_schema<'a>(&'a self, attribute: &'a str) -> &'a str {
        self.to_schema
            .get(attribute)
            .map(String::as_str)
            .unwrap_or(attribute)
    }

    /// Storage column name to attribute name.
    ///
    /// Falls back to a case-insensitive match since SQLite identifiers are
    /// case-insensitive and result columns echo the spelling of the query.
    pub fn schema_to_class<'a>(&'a self, column: &'a str) -> &'a str {
        if let Some(attribute) = self.to_class.get(column) {
            return attribute;
        }
        self.to_class
            .iter()
            .find(|(schema, _)| schema.eq_ignore_ascii_case(column))
            .map(|(_, attribute)| attribute.as_str())
            .unwrap_or(column)
    }
}

/// Shape of one mapped table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityKind {
    name: String,
    table_name: String,
    fields: Vec<String>,
    primary_key: Vec<String>,
    columns: ColumnNames,
    descriptions: Option<BTreeMap<String, String>>,
}

impl EntityKind {
    pub fn builder(name: impl Into<String>, table_name: impl Into<String>) -> EntityKindBuilder {
        EntityKindBuilder::new(name, table_name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn primary_key(&self) -> &[String] {
        &self.primary_key
    }

    /// Every declared field, private ones included.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Mapped attribute names: the fields of a dummy value minus private ones.
    pub fn attributes(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|f| !f.starts_with(PRIVATE_PREFIX))
            .cloned()
            .collect()
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f == name)
    }

    pub fn columns(&self) -> &ColumnNames {
        &self.columns
    }

    pub fn class_to_schema<'a>(&'a self, attribute: &'a str) -> &'a str {
        self.columns.class_to_schema(attribute)
    }

    pub fn schema_to_class<'a>(&'a self, column: &'a str) -> &'a str {
        self.columns.schema_to_class(column)
    }

    /// Human-readable attribute descriptions.
    pub fn descriptions(&self) -> Result<&BTreeMap<String, String>> {
        self.descriptions.as_ref().ok_or_else(|| {
            OrmError::NotImplemented(format!(
                "kind `{}` does not provide attribute descriptions",
                self.name
            ))
        })
    }
}

/// Builder for [`EntityKind`]. All names are case-normalized to lower case.
#[derive(Debug, Clone)]
pub struct EntityKindBuilder {
    name: String,
    table_name: String,
    fields: Vec<String>,
    primary_key: Option<Vec<String>>,
    columns: Vec<(String, String)>,
    descriptions: Option<BTreeMap<String, String>>,
}

impl EntityKindBuilder {
    pub fn new(name: impl Into<String>, table_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table_name: table_name.into(),
            fields: Vec::new(),
            primary_key: None,
            columns: Vec::new(),
            descriptions: None,
        }
    }

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
        self.primary_key = Some(
            names
                .into_iter()
                .map(|n| n.as_ref().to_lowercase())
                .collect(),
        );
        self
    }

    /// Store `attribute` under a differently named column.
    pub fn column(mut self, attribute: &str, column: impl Into<String>) -> Self {
        self.columns.push((attribute.to_lowercase(), column.into()));
        self
    }

    pub fn description(mut self, attribute: &str, text: impl Into<String>) -> Self {
        self.descriptions
            .get_or_insert_with(BTreeMap::new)
            .insert(attribute.to_lowercase(), text.into());
        self
    }

    pub fn build(self) -> Result<EntityKind> {
        let name = self.name;
        let invalid = |reason: String| OrmError::invalid_kind(name.clone(), reason);

        if self.table_name.is_empty() {
            return Err(invalid("table name must not be empty".into()));
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.as_str()) {
                return Err(invalid(format!("field `{field}` declared twice")));
            }
        }

        let primary_key = match self.primary_key {
            Some(pk) => pk,
            None => infer_primary_key(&name)?,
        };
        if primary_key.is_empty() {
            return Err(invalid("primary key must not be empty".into()));
        }
        for key in &primary_key {
            if !seen.contains(key.as_str()) {
                return Err(invalid(format!("primary key `{key}` is not a field")));
            }
            if key.starts_with(PRIVATE_PREFIX) {
                return Err(invalid(format!("primary key `{key}` is private")));
            }
        }

        let mut columns = ColumnNames::identity();
        for (attribute, column) in self.columns {
            if !seen.contains(attribute.as_str()) {
                return Err(invalid(format!(
                    "column mapping for unknown field `{attribute}`"
                )));
            }
            if columns.to_schema.insert(attribute.clone(), column.clone()).is_some() {
                return Err(invalid(format!("field `{attribute}` mapped twice")));
            }
            columns.to_class.insert(column, attribute);
        }

        // Translation must stay invertible: no two fields may share a column.
        let mut schema_names: HashMap<String, &str> = HashMap::new();
        for field in &self.fields {
            let column = columns.class_to_schema(field).to_lowercase();
            if let Some(other) = schema_names.insert(column.clone(), field) {
                return Err(invalid(format!(
                    "fields `{other}` and `{field}` both map to column `{column}`"
                )));
            }
        }

        if let Some(descriptions) = &self.descriptions {
            if let Some(unknown) = descriptions.keys().find(|k| !seen.contains(k.as_str())) {
                return Err(invalid(format!("description for unknown field `{unknown}`")));
            }
        }

        Ok(EntityKind {
            name,
            table_name: self.table_name,
            fields: self.fields,
            primary_key,
            columns,
            descriptions: self.descriptions,
        })
    }
}

/// Primary keys must be declared; there is no inference from data or schema.
pub fn infer_primary_key(kind: &str) -> Result<Vec<String>> {
    Err(OrmError::NotImplemented(format!(
        "automatic primary key inference for kind `{kind}`"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person() -> EntityKind {
        EntityKind::builder("Person", "people")
            .fields(["id", "Name", "_cache"])
            .primary_key(["id"])
            .column("name", "FullName")
            .build()
            .unwrap()
    }

    #[test]
    fn attributes_skip_private_fields() {
        let kind = person();
        assert_eq!(kind.fields(), ["id", "name", "_cache"]);
        assert_eq!(kind.attributes(), ["id", "name"]);
    }

    #[test]
    fn column_translation_is_an_inverse_pair() {
        let kind = person();
        assert_eq!(kind.class_to_schema("name"), "FullName");
        assert_eq!(kind.schema_to_class("FullName"), "name");
        assert_eq!(kind.schema_to_class("FULLNAME"), "name");
        assert_eq!(kind.class_to_schema("id"), "id");
        assert_eq!(kind.schema_to_class("id"), "id");
    }

    #[test]
    fn missing_primary_key_fails_loudly() {
        let err = EntityKind::builder("Thing", "things")
            .field("id")
            .build()
            .unwrap_err();
        assert!(matches!(err, OrmError::NotImplemented(_)));
    }

    #[test]
    fn rejects_inconsistent_declarations() {
        let empty_pk = EntityKind::builder("A", "a")
            .field("id")
            .primary_key(Vec::<String>::new())
            .build();
        assert!(matches!(empty_pk, Err(OrmError::InvalidKind { .. })));

        let unknown_pk = EntityKind::builder("A", "a")
            .field("id")
            .primary_key(["key"])
            .build();
        assert!(matches!(unknown_pk, Err(OrmError::InvalidKind { .. })));

        let shared_column = EntityKind::builder("A", "a")
            .fields(["id", "b"])
            .primary_key(["id"])
            .column("id", "B")
            .build();
        assert!(matches!(shared_column, Err(OrmError::InvalidKind { .. })));
    }

    #[test]
    fn descriptions_are_optional_but_loud() {
        assert!(matches!(
            person().descriptions(),
            Err(OrmError::NotImplemented(_))
        ));
        let kind = EntityKind::builder("Person", "people")
            .fields(["id"])
            .primary_key(["id"])
            .description("id", "row id")
            .build()
            .unwrap();
        assert_eq!(kind.descriptions().unwrap()["id"], "row id");
    }
}
