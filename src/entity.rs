//! Entity values and the clause/DML capability shared by plain and composite
//! entities.

use crate::clause::{
    join, with_where, Comparison, InsertClause, Junction, KeyLookup, Predicate, Projection,
    Scope, UpdateClause, WhereClause, WhereOptions,
};
use crate::error::{OrmError, Result};
use crate::kind::{EntityKind, PRIVATE_PREFIX};
use crate::store::{QueryResult, Store};
use crate::value::Value;
use indexmap::IndexMap;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tracing::{debug, error, warn};

static NULL: Value = Value::Null;

/// Attribute-name keyed values, in attribute order.
pub type Dict = IndexMap<String, Value>;

/// Attribute derivation, clause generation and DML against a [`Store`].
///
/// Everything except the three accessors is provided; implementors only
/// expose their kind, their values and their mapped attribute names.
pub trait Mapped {
    fn kind(&self) -> &EntityKind;

    /// Current value of `attribute`; `Null` for unknown names.
    fn value(&self, attribute: &str) -> &Value;

    /// Mapped attribute names, derived from a dummy value of the same kind.
    fn attributes(&self) -> Vec<String>;

    fn to_dict(&self) -> Dict {
        self.attributes()
            .into_iter()
            .map(|k| {
                let v = self.value(&k).clone();
                (k, v)
            })
            .collect()
    }

    /// Values of `keys`, in order, ready to bind.
    fn bind(&self, keys: &[String]) -> Vec<Value> {
        keys.iter().map(|k| self.value(k).clone()).collect()
    }

    fn where_clause_keys(&self, scope: Scope, only_keys: Option<&[String]>) -> Vec<String> {
        let keys = match scope {
            Scope::Strict => self.attributes(),
            Scope::NonStrict => self.kind().primary_key().to_vec(),
        };
        match only_keys {
            Some(only) => keys
                .into_iter()
                .filter(|k| only.iter().any(|o| o.eq_ignore_ascii_case(k)))
                .collect(),
            None => keys,
        }
    }

    fn where_clause(&self, options: &WhereOptions) -> WhereClause {
        let kind = self.kind();
        let class_keys = self.where_clause_keys(options.scope, options.only_keys.as_deref());
        let predicates: Vec<Predicate> = class_keys
            .iter()
            .map(|k| Predicate::new(kind.class_to_schema(k), self.value(k), options.comparison))
            .collect();
        let keys = class_keys
            .iter()
            .zip(&predicates)
            .filter(|(_, p)| p.bound)
            .map(|(k, _)| k.clone())
            .collect();
        WhereClause {
            keys,
            clause: join(&predicates, options.junction),
        }
    }

    fn select_clause(&self, projection: &Projection) -> String {
        match projection {
            Projection::Attributes(keys) if !keys.is_empty() => keys
                .iter()
                .map(|k| self.kind().class_to_schema(&k.to_lowercase()).to_string())
                .collect::<Vec<_>>()
                .join(", "),
            _ => "*".to_string(),
        }
    }

    /// Columns and placeholders for every present attribute.
    fn insert_clause(&self) -> InsertClause {
        let kind = self.kind();
        let keys: Vec<String> = self
            .attributes()
            .into_iter()
            .filter(|k| self.value(k).is_present())
            .collect();
        let columns = keys
            .iter()
            .map(|k| kind.class_to_schema(k))
            .collect::<Vec<_>>()
            .join(", ");
        let values = vec!["?"; keys.len()].join(", ");
        InsertClause {
            keys,
            columns,
            values,
        }
    }

    /// SET covers every attribute so fields can be cleared to NULL; WHERE
    /// matches this value's present attributes and NULL-matches absent ones.
    fn update_clause(&self) -> UpdateClause {
        let kind = self.kind();
        let set_keys = self.attributes();
        let set = set_keys
            .iter()
            .map(|k| format!("{}=?", kind.class_to_schema(k)))
            .collect::<Vec<_>>()
            .join(", ");
        let predicates: Vec<Predicate> = set_keys
            .iter()
            .map(|k| Predicate::new(kind.class_to_schema(k), self.value(k), Comparison::Exact))
            .collect();
        let where_keys = set_keys
            .iter()
            .zip(&predicates)
            .filter(|(_, p)| p.bound)
            .map(|(k, _)| k.clone())
            .collect();
        let statement = with_where(
            format!("UPDATE {} SET {}", kind.table_name(), set),
            &join(&predicates, Junction::And),
        );
        UpdateClause {
            set_keys,
            where_keys,
            statement,
        }
    }

    /// Deletes are built from [`Mapped::where_clause`]; see [`Mapped::delete`].
    fn delete_clause(&self) -> Result<String> {
        Err(OrmError::Unsupported(
            "delete_clause: use where_clause instead".to_string(),
        ))
    }

    fn select<S>(&self, options: &WhereOptions, projection: &Projection, store: &mut S) -> Result<QueryResult>
    where
        S: Store + ?Sized,
    {
        let kind = self.kind();
        let clause = self.where_clause(options);
        let statement = with_where(
            format!("SELECT {} FROM {}", self.select_clause(projection), kind.table_name()),
            &clause.clause,
        );
        let params = self.bind(&clause.keys);
        debug!(kind = kind.name(), %statement, params = params.len(), "select");
        store.execute(&statement, &params)
    }

    /// Rows matching the primary key. Zero, one or more rows may come back.
    fn lookup<S: Store + ?Sized>(&self, store: &mut S) -> Result<QueryResult> {
        self.select(&WhereOptions::new(), &Projection::All, store)
    }

    /// Rows matching every mapped attribute.
    fn lookup_exactly<S: Store + ?Sized>(&self, store: &mut S) -> Result<QueryResult> {
        self.select(&WhereOptions::strict(), &Projection::All, store)
    }

    /// Rows matching just `only_keys`. Keys the kind does not map filter
    /// nothing and are reported.
    fn lookup_for_keys<S>(&self, only_keys: &[String], lookup: &KeyLookup, store: &mut S) -> Result<QueryResult>
    where
        S: Store + ?Sized,
    {
        let attributes = self.attributes();
        let unknown: Vec<&String> = only_keys
            .iter()
            .filter(|k| !attributes.iter().any(|a| a.eq_ignore_ascii_case(k)))
            .collect();
        if !unknown.is_empty() {
            warn!(kind = self.kind().name(), ?unknown, "lookup keys not mapped by kind");
        }
        let options = WhereOptions::strict()
            .with_only_keys(only_keys.iter().cloned())
            .with_junction(lookup.junction)
            .with_comparison(lookup.comparison);
        let projection = if lookup.all_columns {
            Projection::All
        } else {
            Projection::Attributes(only_keys.to_vec())
        };
        self.select(&options, &projection, store)
    }

    fn insert<S: Store + ?Sized>(&self, store: &mut S) -> Result<QueryResult> {
        let kind = self.kind();
        let clause = self.insert_clause();
        let statement = if clause.keys.is_empty() {
            format!("INSERT INTO {} DEFAULT VALUES", kind.table_name())
        } else {
            format!(
                "INSERT INTO {} ({}) VALUES ({})",
                kind.table_name(),
                clause.columns,
                clause.values
            )
        };
        let params = self.bind(&clause.keys);
        debug!(kind = kind.name(), %statement, params = params.len(), "insert");
        let result = store.execute(&statement, &params)?;
        self.commit(store)?;
        Ok(result)
    }

    /// Overwrite every row matching `self` with the values of `new`.
    ///
    /// A primary key that does not pin down a single row updates them all.
    fn update<M, S>(&self, new: &M, store: &mut S) -> Result<QueryResult>
    where
        M: Mapped + ?Sized,
        S: Store + ?Sized,
    {
        let kind = self.kind();
        if new.kind().name() != kind.name() || new.kind().table_name() != kind.table_name() {
            return Err(OrmError::KindMismatch {
                expected: kind.name().to_string(),
                found: new.kind().name().to_string(),
            });
        }
        let clause = self.update_clause();
        let mut params = new.bind(&clause.set_keys);
        params.extend(self.bind(&clause.where_keys));
        debug!(kind = kind.name(), statement = %clause.statement, ?params, "update");
        let result = store.execute(&clause.statement, &params)?;
        self.commit(store)?;
        Ok(result)
    }

    /// Remove every row matching the primary-key values of `self`.
    fn delete<S: Store + ?Sized>(&self, store: &mut S) -> Result<QueryResult> {
        let kind = self.kind();
        let clause = self.where_clause(&WhereOptions::new());
        let statement = with_where(format!("DELETE FROM {}", kind.table_name()), &clause.clause);
        let params = self.bind(&clause.keys);
        debug!(kind = kind.name(), %statement, params = params.len(), "delete");
        let result = store.execute(&statement, &params)?;
        self.commit(store)?;
        Ok(result)
    }

    fn remove<S: Store + ?Sized>(&self, store: &mut S) -> Result<QueryResult> {
        self.delete(store)
    }

    fn commit<S: Store + ?Sized>(&self, store: &mut S) -> Result<()> {
        store.commit()
    }
}

/// Incoming keys case-folded onto attribute names.
///
/// Two keys landing on the same attribute is a [`OrmError::KeyCollision`]
/// rather than a silent overwrite; the first value stays.
pub(crate) struct FoldedKeys<'k> {
    kind: &'k EntityKind,
    dict: Dict,
    origin: HashMap<String, String>,
}

impl<'k> FoldedKeys<'k> {
    pub(crate) fn new(kind: &'k EntityKind) -> Self {
        Self {
            kind,
            dict: Dict::new(),
            origin: HashMap::new(),
        }
    }

    /// Record `value` under `attribute`, lower-cased; `key` is the name it arrived as.
    pub(crate) fn insert(&mut self, key: &str, attribute: &str, value: Value) -> Result<()> {
        let attribute = attribute.to_lowercase();
        if let Some(first) = self.origin.get(&attribute) {
            return Err(OrmError::KeyCollision {
                kind: self.kind.name().to_string(),
                attribute,
                first: first.clone(),
                second: key.to_string(),
            });
        }
        self.origin.insert(attribute.clone(), key.to_string());
        self.dict.insert(attribute, value);
        Ok(())
    }

    pub(crate) fn into_dict(self) -> Dict {
        self.dict
    }
}

/// Fold every key of `dict`, translating column names first when `from_columns`.
pub(crate) fn fold_keys(kind: &EntityKind, dict: &Dict, from_columns: bool) -> Result<Dict> {
    let mut folded = FoldedKeys::new(kind);
    for (key, value) in dict {
        let attribute = if from_columns {
            kind.schema_to_class(key)
        } else {
            key.as_str()
        };
        folded.insert(key, attribute, value.clone())?;
    }
    Ok(folded.into_dict())
}

/// A record of one [`EntityKind`].
#[derive(Debug, Clone)]
pub struct Entity {
    kind: Arc<EntityKind>,
    values: IndexMap<String, Value>,
}

impl Entity {
    /// Build a value from named fields. Names outside the kind are reported
    /// and ignored; missing fields are `Null`. Names differing only in case
    /// are reported and the first one is kept.
    pub fn new<I, K, V>(kind: Arc<EntityKind>, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut folded = FoldedKeys::new(&kind);
        for (name, value) in values {
            let name: String = name.into();
            if let Err(err) = folded.insert(&name, &name, value.into()) {
                error!(kind = kind.name(), %err, "conflicting keys in constructor");
            }
        }
        let dict = folded.into_dict();

        let mut entity = Self::dummy(kind);
        let mut superfluous = Vec::new();
        for (name, value) in dict {
            match entity.values.get_mut(&name) {
                Some(slot) => *slot = value,
                None => superfluous.push(name),
            }
        }
        if !superfluous.is_empty() {
            warn!(
                kind = entity.kind.name(),
                table = entity.kind.table_name(),
                ?superfluous,
                "superfluous parameters in constructor"
            );
        }
        entity
    }

    /// All fields `Null`.
    pub fn dummy(kind: Arc<EntityKind>) -> Self {
        let values = kind
            .fields()
            .iter()
            .map(|f| (f.clone(), Value::Null))
            .collect();
        Self { kind, values }
    }

    /// `None` when a primary-key attribute is missing from `dict`, or when two
    /// keys differ only in case.
    pub fn from_dict(kind: Arc<EntityKind>, dict: &Dict) -> Option<Self> {
        let dict = match fold_keys(&kind, dict, false) {
            Ok(dict) => dict,
            Err(err) => {
                error!(kind = kind.name(), %err, "converting incompatible dict");
                return None;
            }
        };
        for key in kind.primary_key() {
            if !dict.contains_key(key) {
                error!(kind = kind.name(), missing = %key, "converting incompatible dict");
                return None;
            }
        }
        Some(Self::new(kind, dict))
    }

    /// Like [`Entity::from_dict`] for a dict keyed by column names.
    pub fn from_db_dict(kind: Arc<EntityKind>, dict: &Dict) -> Result<Option<Self>> {
        let dict = fold_keys(&kind, dict, true)?;
        Ok(Self::from_dict(kind, &dict))
    }

    /// Zip translated, lower-cased column names with a row.
    pub fn dict_from_db_entry(kind: &EntityKind, columns: &[String], row: &[Value]) -> Result<Dict> {
        let mut folded = FoldedKeys::new(kind);
        for (column, value) in columns.iter().zip(row) {
            folded.insert(column, kind.schema_to_class(column), value.clone())?;
        }
        Ok(folded.into_dict())
    }

    pub fn from_db_entry(kind: Arc<EntityKind>, columns: &[String], row: &[Value]) -> Result<Option<Self>> {
        let dict = Self::dict_from_db_entry(&kind, columns, row)?;
        Ok(Self::from_dict(kind, &dict))
    }

    pub fn kind_handle(&self) -> &Arc<EntityKind> {
        &self.kind
    }

    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.values.get(attribute)
    }

    /// Every field name held by this value, private ones included.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub(crate) fn set(&mut self, attribute: &str, value: Value) {
        if let Some(slot) = self.values.get_mut(attribute) {
            *slot = value;
        }
    }
}

impl Mapped for Entity {
    fn kind(&self) -> &EntityKind {
        &self.kind
    }

    fn value(&self, attribute: &str) -> &Value {
        self.values.get(attribute).unwrap_or(&NULL)
    }

    fn attributes(&self) -> Vec<String> {
        Self::dummy(self.kind.clone())
            .field_names()
            .filter(|f| !f.starts_with(PRIVATE_PREFIX))
            .map(str::to_string)
            .collect()
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.kind.name() == other.kind.name()
            && self
                .kind
                .primary_key()
                .iter()
                .all(|k| self.value(k) == other.value(k))
    }
}

impl Eq for Entity {}

impl Hash for Entity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let sum = self.kind.primary_key().iter().fold(0u64, |acc, k| {
            let mut hasher = DefaultHasher::new();
            self.value(k).hash(&mut hasher);
            acc.wrapping_add(hasher.finish())
        });
        state.write_u64(sum);
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pk = self.kind.primary_key();
        let components: Vec<String> = pk
            .iter()
            .map(|k| format!("{k}: {}", self.value(k)))
            .chain(
                self.kind
                    .attributes()
                    .into_iter()
                    .filter(|k| !pk.contains(k) && self.value(k).is_present())
                    .map(|k| format!("{k}: {}", self.value(&k))),
            )
            .collect();
        write!(f, "{}({})", self.kind.name(), components.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::RecordingStore;
    use std::collections::HashSet;

    fn person_kind() -> Arc<EntityKind> {
        Arc::new(
            EntityKind::builder("Person", "people")
                .fields(["id", "name", "age"])
                .primary_key(["id"])
                .build()
                .unwrap(),
        )
    }

    fn ann() -> Entity {
        Entity::new(
            person_kind(),
            [("id", Value::from(1)), ("name", Value::from("Ann"))],
        )
    }

    #[test]
    fn to_dict_keeps_nulls() {
        let dict = ann().to_dict();
        assert_eq!(dict.len(), 3);
        assert_eq!(dict["id"], Value::Integer(1));
        assert_eq!(dict["name"], Value::from("Ann"));
        assert_eq!(dict["age"], Value::Null);
    }

    #[test]
    fn from_dict_requires_primary_key() {
        let mut dict = Dict::new();
        dict.insert("name".into(), Value::from("Ann"));
        assert!(Entity::from_dict(person_kind(), &dict).is_none());

        let round_trip = Entity::from_dict(person_kind(), &ann().to_dict()).unwrap();
        assert_eq!(round_trip, ann());
        assert_eq!(round_trip.to_dict(), ann().to_dict());
    }

    #[test]
    fn superfluous_fields_are_ignored() {
        let e = Entity::new(person_kind(), [("id", 3), ("shoe_size", 44)]);
        assert_eq!(e.get("shoe_size"), None);
        assert_eq!(e.value("id"), &Value::Integer(3));
    }

    #[test]
    fn identity_is_primary_key_only() {
        let a = ann();
        let b = Entity::new(person_kind(), [("id", Value::from(1)), ("age", Value::from(30))]);
        let c = Entity::new(person_kind(), [("id", 2)]);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(Entity::dummy(person_kind()), Entity::dummy(person_kind()));

        let set: HashSet<Entity> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn display_lists_key_then_present_attributes() {
        assert_eq!(ann().to_string(), "Person(id: 1, name: Ann)");
        assert_eq!(Entity::dummy(person_kind()).to_string(), "Person(id: NULL)");
    }

    #[test]
    fn insert_clause_keeps_falsy_values() {
        let e = Entity::new(
            person_kind(),
            [("id", Value::from(0)), ("name", Value::from(""))],
        );
        let clause = e.insert_clause();
        assert_eq!(clause.keys, ["id", "name"]);
        assert_eq!(clause.columns, "id, name");
        assert_eq!(clause.values, "?, ?");
    }

    #[test]
    fn where_clause_modes() {
        let e = ann();
        let strict = e.where_clause(&WhereOptions::strict());
        assert_eq!(strict.clause, "id=? AND name=? AND age IS NULL");
        assert_eq!(strict.keys, ["id", "name"]);

        let fuzzy_or = e.where_clause(
            &WhereOptions::strict()
                .with_junction(Junction::Or)
                .with_comparison(Comparison::Fuzzy),
        );
        assert_eq!(fuzzy_or.clause, "id LIKE ? OR name LIKE ? OR age IS NULL");

        let only = e.where_clause(&WhereOptions::strict().with_only_keys(["name"]));
        assert_eq!(only.clause, "name=?");

        let non_strict = e.where_clause(&WhereOptions::new());
        assert_eq!(non_strict.clause, "id=?");
    }

    #[test]
    fn select_clause_projection() {
        let e = ann();
        assert_eq!(e.select_clause(&Projection::All), "*");
        assert_eq!(
            e.select_clause(&Projection::Attributes(vec!["id".into(), "name".into()])),
            "id, name"
        );
    }

    #[test]
    fn delete_clause_is_unsupported() {
        assert!(matches!(ann().delete_clause(), Err(OrmError::Unsupported(_))));
    }

    #[test]
    fn update_binds_new_values_then_current_present_values() {
        let old = ann();
        let new = Entity::new(
            person_kind(),
            [("id", Value::from(1)), ("age", Value::from(31))],
        );
        let mut store = RecordingStore::default();
        old.update(&new, &mut store).unwrap();

        let (statement, params) = &store.statements[0];
        assert_eq!(
            statement,
            "UPDATE people SET id=?, name=?, age=? WHERE id=? AND name=? AND age IS NULL"
        );
        assert_eq!(
            params,
            &[
                Value::Integer(1),
                Value::Null,
                Value::Integer(31),
                Value::Integer(1),
                Value::from("Ann"),
            ]
        );
        assert_eq!(store.commits, 1);
    }

    #[test]
    fn delete_uses_primary_key_predicate() {
        let mut store = RecordingStore::default();
        Entity::dummy(person_kind()).delete(&mut store).unwrap();
        assert_eq!(store.statements[0].0, "DELETE FROM people WHERE id IS NULL");
        assert!(store.statements[0].1.is_empty());
        assert_eq!(store.commits, 1);
    }

    #[test]
    fn insert_of_all_null_value_uses_default_values() {
        let mut store = RecordingStore::default();
        Entity::dummy(person_kind()).insert(&mut store).unwrap();
        assert_eq!(store.statements[0].0, "INSERT INTO people DEFAULT VALUES");
    }

    #[test]
    fn update_rejects_other_kinds() {
        let other = Arc::new(
            EntityKind::builder("Group", "groups")
                .fields(["id"])
                .primary_key(["id"])
                .build()
                .unwrap(),
        );
        let mut store = RecordingStore::default();
        let err = ann()
            .update(&Entity::new(other, [("id", 1)]), &mut store)
            .unwrap_err();
        assert!(matches!(err, OrmError::KindMismatch { .. }));
        assert!(store.statements.is_empty());
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn lookup_for_unmapped_keys_warns() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let mut store = RecordingStore::default();
        tracing::subscriber::with_default(subscriber, || {
            ann()
                .lookup_for_keys(&["nmae".to_string()], &KeyLookup::default(), &mut store)
                .unwrap();
        });

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("WARN"));
        assert!(output.contains("nmae"));
        // nothing left to filter on
        assert_eq!(store.statements[0].0, "SELECT * FROM people");
    }

    fn translated_kind() -> Arc<EntityKind> {
        Arc::new(
            EntityKind::builder("Person", "people")
                .fields(["id", "name"])
                .primary_key(["id"])
                .column("name", "FullName")
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn db_dict_decoding_translates_columns() {
        let mut dict = Dict::new();
        dict.insert("ID".into(), Value::Integer(5));
        dict.insert("FullName".into(), Value::from("Bo"));
        let e = Entity::from_db_dict(translated_kind(), &dict).unwrap().unwrap();
        assert_eq!(e.value("id"), &Value::Integer(5));
        assert_eq!(e.value("name"), &Value::from("Bo"));

        let mut keyless = Dict::new();
        keyless.insert("FullName".into(), Value::from("Bo"));
        assert!(Entity::from_db_dict(translated_kind(), &keyless).unwrap().is_none());
    }

    #[test]
    fn case_colliding_keys_are_loud() {
        let mut dict = Dict::new();
        dict.insert("id".into(), Value::Integer(1));
        dict.insert("Name".into(), Value::from("first"));
        dict.insert("NAME".into(), Value::from("second"));

        let err = Entity::from_db_dict(person_kind(), &dict).unwrap_err();
        assert!(matches!(
            err,
            OrmError::KeyCollision { ref attribute, ref first, ref second, .. }
                if attribute == "name" && first == "Name" && second == "NAME"
        ));
        assert!(Entity::from_dict(person_kind(), &dict).is_none());

        let e = Entity::new(person_kind(), [("Name", "first"), ("NAME", "second")]);
        assert_eq!(e.value("name"), &Value::from("first"));
    }

    #[test]
    fn db_entry_decoding_translates_and_lowercases() {
        let kind = Arc::new(
            EntityKind::builder("Person", "people")
                .fields(["id", "name"])
                .primary_key(["id"])
                .column("name", "FullName")
                .build()
                .unwrap(),
        );
        let columns = vec!["ID".to_string(), "FullName".to_string()];
        let row = vec![Value::Integer(5), Value::from("Bo")];
        let e = Entity::from_db_entry(kind.clone(), &columns, &row)
            .unwrap()
            .unwrap();
        assert_eq!(e.value("id"), &Value::Integer(5));
        assert_eq!(e.value("name"), &Value::from("Bo"));

        let colliding = vec!["Name".to_string(), "NAME".to_string()];
        let err = Entity::from_db_entry(kind, &colliding, &row).unwrap_err();
        assert!(matches!(err, OrmError::KeyCollision { .. }));
    }
}
