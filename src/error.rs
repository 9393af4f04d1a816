//! Error model for the mapping layer.

use thiserror::Error;

/// Result type used across the crate.
pub type Result<T> = std::result::Result<T, OrmError>;

#[derive(Debug, Error)]
pub enum OrmError {
    /// Error raised by the underlying store, passed through unchanged.
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    /// Operation that must not be used (e.g. building a raw delete clause).
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// Capability the kind does not provide.
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// A kind declaration is inconsistent.
    #[error("invalid kind `{kind}`: {reason}")]
    InvalidKind { kind: String, reason: String },

    #[error("unknown kind `{0}`")]
    UnknownKind(String),

    #[error("kind `{kind}` has no reference named `{reference}`")]
    UnknownReference { kind: String, reference: String },

    /// An entity of one kind was handed to an operation expecting another.
    #[error("expected an entity of kind `{expected}`, got `{found}`")]
    KindMismatch { expected: String, found: String },

    /// Two storage columns normalize to the same attribute name.
    #[error("columns `{first}` and `{second}` of `{kind}` both map to attribute `{attribute}`")]
    KeyCollision {
        kind: String,
        attribute: String,
        first: String,
        second: String,
    },

    /// Kind configuration that does not parse.
    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

impl OrmError {
    pub fn invalid_kind(kind: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidKind {
            kind: kind.into(),
            reason: reason.into(),
        }
    }

    pub fn unknown_reference(kind: impl Into<String>, reference: impl Into<String>) -> Self {
        Self::UnknownReference {
            kind: kind.into(),
            reference: reference.into(),
        }
    }
}
