use crate::error::Result;
use crate::value::Value;

/// Columns and rows returned by one statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    /// Rows changed by a mutating statement; zero for queries.
    pub rows_affected: usize,
}

impl QueryResult {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Statement execution handle the mapping layer runs against.
///
/// At most one statement is in flight per handle; callers sharing a handle
/// serialize externally.
pub trait Store {
    /// Run `statement`, binding `params` to its positional `?` placeholders.
    fn execute(&mut self, statement: &str, params: &[Value]) -> Result<QueryResult>;

    fn commit(&mut self) -> Result<()>;
}
