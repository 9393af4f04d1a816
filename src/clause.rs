//! Parameterized clause fragments built from an entity's current values.

use crate::value::Value;

/// Which attributes a predicate considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    /// Every mapped attribute.
    Strict,
    /// Primary-key attributes only.
    #[default]
    NonStrict,
}

/// How individual predicates are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Junction {
    #[default]
    And,
    Or,
}

impl Junction {
    fn separator(self) -> &'static str {
        match self {
            Junction::And => " AND ",
            Junction::Or => " OR ",
        }
    }
}

/// Comparison used for present values. Absent values always render `IS NULL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Comparison {
    #[default]
    Exact,
    Fuzzy,
}

/// Column list of a select.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Projection {
    #[default]
    All,
    /// Attribute names, translated to columns when rendered.
    Attributes(Vec<String>),
}

/// Options for [`Mapped::where_clause`](crate::Mapped::where_clause).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WhereOptions {
    pub scope: Scope,
    pub only_keys: Option<Vec<String>>,
    pub junction: Junction,
    pub comparison: Comparison,
}

impl WhereOptions {
    /// Non-strict, conjunctive, exact.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict() -> Self {
        Self::new().with_scope(Scope::Strict)
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_only_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.only_keys = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_junction(mut self, junction: Junction) -> Self {
        self.junction = junction;
        self
    }

    pub fn with_comparison(mut self, comparison: Comparison) -> Self {
        self.comparison = comparison;
        self
    }
}

/// Options for [`Mapped::lookup_for_keys`](crate::Mapped::lookup_for_keys).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyLookup {
    pub junction: Junction,
    pub comparison: Comparison,
    /// Project every column instead of just the looked-up keys.
    pub all_columns: bool,
}

impl Default for KeyLookup {
    fn default() -> Self {
        Self {
            junction: Junction::And,
            comparison: Comparison::Exact,
            all_columns: true,
        }
    }
}

/// A rendered predicate plus the attributes whose values bind its `?`s, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhereClause {
    pub keys: Vec<String>,
    pub clause: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertClause {
    pub keys: Vec<String>,
    pub columns: String,
    pub values: String,
}

/// A full UPDATE statement.
///
/// `set_keys` bind from the replacement value, `where_keys` from the current one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateClause {
    pub set_keys: Vec<String>,
    pub where_keys: Vec<String>,
    pub statement: String,
}

/// One `column=?` / `column LIKE ?` / `column IS NULL` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Predicate {
    pub bound: bool,
    pub text: String,
}

impl Predicate {
    pub fn new(column: &str, value: &Value, comparison: Comparison) -> Self {
        if value.is_null() {
            return Self {
                bound: false,
                text: format!("{column} IS NULL"),
            };
        }
        let text = match comparison {
            Comparison::Exact => format!("{column}=?"),
            Comparison::Fuzzy => format!("{column} LIKE ?"),
        };
        Self { bound: true, text }
    }
}

pub(crate) fn join(predicates: &[Predicate], junction: Junction) -> String {
    predicates
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join(junction.separator())
}

/// Append ` WHERE <clause>` unless the clause is empty.
pub(crate) fn with_where(statement: String, clause: &str) -> String {
    if clause.is_empty() {
        statement
    } else {
        format!("{statement} WHERE {clause}")
    }
}
