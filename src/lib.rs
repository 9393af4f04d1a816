//! Entity-to-table mapping over SQLite for the Runar ecosystem.
//!
//! # Intention
//!
//! - Map entity values to rows of named tables and generate the parameterized
//!   SELECT/INSERT/UPDATE/DELETE statements for them.
//! - Support composite entities that flatten other entities' primary keys
//!   into their own attributes, and rebuild those entities on decode.
//!
//! # Architectural Boundaries
//!
//! - Statement execution goes through the [`Store`] trait; [`SqliteStore`] is
//!   the rusqlite-backed implementation.
//! - No DDL, migrations or joins beyond single foreign-key flattening.
//!
//! # Example
//!
//! ```
//! use rust_sqlite_orm::{Entity, EntityKind, Mapped, SqliteStore, Value};
//! use std::sync::Arc;
//!
//! # fn main() -> rust_sqlite_orm::Result<()> {
//! let mut store = SqliteStore::open_in_memory()?;
//! store
//!     .connection()
//!     .execute_batch("CREATE TABLE people (id INTEGER PRIMARY KEY, name TEXT)")?;
//!
//! let person = Arc::new(
//!     EntityKind::builder("Person", "people")
//!         .fields(["id", "name"])
//!         .primary_key(["id"])
//!         .build()?,
//! );
//! let ann = Entity::new(person.clone(), [("id", Value::from(1)), ("name", Value::from("Ann"))]);
//! ann.insert(&mut store)?;
//!
//! let found = ann.lookup(&mut store)?;
//! let decoded = Entity::from_db_entry(person, &found.columns, &found.rows[0])?;
//! assert_eq!(decoded.unwrap().to_dict(), ann.to_dict());
//! # Ok(())
//! # }
//! ```

pub mod clause;
pub mod composite;
pub mod config;
pub mod entity;
pub mod error;
pub mod kind;
pub mod logging;
pub mod registry;
pub mod sqlite;
pub mod store;
pub mod value;

pub use clause::{Comparison, Junction, KeyLookup, Projection, Scope, WhereOptions};
pub use composite::{CompositeEntity, CompositeKind, Reference};
pub use config::OrmConfig;
pub use entity::{Dict, Entity, Mapped};
pub use error::{OrmError, Result};
pub use kind::{ColumnNames, EntityKind, PRIVATE_PREFIX};
pub use registry::Registry;
pub use sqlite::{SqliteConfig, SqliteStore};
pub use store::{QueryResult, Store};
pub use value::Value;
