use thiserror::Error;

/// Errors that can occur when interacting with the document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A write would give two documents the same value for a unique key.
    #[error("Unique constraint {constraint} violated in collection {collection}")]
    UniqueViolation {
        collection: &'static str,
        constraint: String,
    },

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Returns the violated constraint name, if this is a unique violation.
    pub fn violated_constraint(&self) -> Option<&str> {
        match self {
            StoreError::UniqueViolation { constraint, .. } => Some(constraint),
            _ => None,
        }
    }
}

/// Result type for document store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
