//! SQLite-backed [`Store`] and startup schema discovery.

use crate::error::Result;
use crate::kind::EntityKind;
use crate::registry::Registry;
use crate::store::{QueryResult, Store};
use crate::value::Value;
use rusqlite::{params_from_iter, Connection};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

pub const IN_MEMORY: &str = ":memory:";

/// SQLite store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqliteConfig {
    /// Path to the SQLite database file, or `:memory:`
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

fn default_db_path() -> String {
    IN_MEMORY.to_string()
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

impl SqliteConfig {
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }
}

/// [`Store`] over a single rusqlite connection.
///
/// Mutating statements open a transaction when none is active; [`Store::commit`]
/// commits it. Uncommitted work is rolled back when the store is dropped.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(config: &SqliteConfig) -> Result<Self> {
        let conn = if config.db_path == IN_MEMORY {
            Connection::open_in_memory()?
        } else {
            Connection::open(&config.db_path)?
        };
        info!(db_path = %config.db_path, "opened sqlite store");
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::open(&SqliteConfig::default())
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn into_connection(self) -> Connection {
        self.conn
    }
}

impl Store for SqliteStore {
    #[instrument(level = "debug", skip(self, params), fields(params = params.len()), err)]
    fn execute(&mut self, statement: &str, params: &[Value]) -> Result<QueryResult> {
        let mut stmt = self.conn.prepare(statement)?;
        if !stmt.readonly() && self.conn.is_autocommit() {
            self.conn.execute_batch("BEGIN")?;
        }

        if stmt.column_count() == 0 {
            let rows_affected = stmt.execute(params_from_iter(params.iter()))?;
            return Ok(QueryResult {
                rows_affected,
                ..QueryResult::default()
            });
        }

        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();
        let mut rows = stmt.query(params_from_iter(params.iter()))?;
        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(width);
            for i in 0..width {
                values.push(row.get::<_, Value>(i)?);
            }
            result.push(values);
        }
        debug!(rows = result.len(), "query returned");
        Ok(QueryResult {
            columns,
            rows: result,
            rows_affected: 0,
        })
    }

    fn commit(&mut self) -> Result<()> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("COMMIT")?;
        }
        Ok(())
    }
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// User tables of the database, by name.
pub fn tables(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(names)
}

/// Column names of `table` and the primary-key columns in key order.
pub fn columns(conn: &Connection, table: &str) -> Result<(Vec<String>, Vec<String>)> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quote_identifier(table)))?;
    let info = stmt
        .query_map([], |row| Ok((row.get::<_, String>(1)?, row.get::<_, i64>(5)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut primary_key: Vec<(i64, String)> = info
        .iter()
        .filter(|(_, pk)| *pk > 0)
        .map(|(name, pk)| (*pk, name.clone()))
        .collect();
    primary_key.sort();

    let columns = info.into_iter().map(|(name, _)| name).collect();
    Ok((columns, primary_key.into_iter().map(|(_, name)| name).collect()))
}

/// Register one plain kind per user table.
///
/// Column names that are not lower case are kept as column translations.
/// Tables without a primary key are skipped. Returns the number of kinds
/// registered.
pub fn discover(store: &SqliteStore, registry: &mut Registry) -> Result<usize> {
    let conn = store.connection();
    let mut registered = 0;
    for table in tables(conn)? {
        let (cols, primary_key) = columns(conn, &table)?;
        if primary_key.is_empty() {
            warn!(%table, "skipping table without primary key");
            continue;
        }

        let mut builder = EntityKind::builder(table.clone(), table.clone());
        for column in &cols {
            let attribute = column.to_lowercase();
            builder = builder.field(&attribute);
            if attribute != *column {
                builder = builder.column(&attribute, column.clone());
            }
        }
        let kind = builder.primary_key(primary_key).build()?;
        debug!(%table, columns = ?cols, "discovered table");
        registry.register_entity(kind)?;
        registered += 1;
    }
    info!(registered, "schema discovery finished");
    Ok(registered)
}
