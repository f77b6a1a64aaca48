//! Domain error types.

use document_store::StoreError;
use thiserror::Error;

use crate::validation::FieldErrors;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Input failed shape or range constraints.
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// A referenced record does not exist.
    #[error("{entity} not found")]
    NotFound { entity: &'static str, id: String },

    /// The write would break an invariant, e.g. a second active cart.
    #[error("{0}")]
    Conflict(String),

    /// An error occurred in the document store.
    #[error("Document store error: {0}")]
    Store(StoreError),

    /// The password could not be hashed.
    #[error("Password hashing failed: {0}")]
    PasswordHash(String),
}

impl DomainError {
    /// Builds a not-found error for `entity` with the unresolved `id`.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Maps a violation of `constraint` to a conflict carrying `message`.
    ///
    /// Every other store error converts as usual.
    pub fn conflict_on(
        constraint: &'static str,
        message: &'static str,
    ) -> impl Fn(StoreError) -> Self {
        move |e| match e.violated_constraint() {
            Some(violated) if violated == constraint => Self::Conflict(message.to_string()),
            _ => Self::from(e),
        }
    }

    /// Returns true if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true if this is a conflict error.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

impl From<StoreError> for DomainError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::UniqueViolation {
                collection,
                constraint,
            } => DomainError::Conflict(format!("Duplicate {collection} record ({constraint})")),
            other => DomainError::Store(other),
        }
    }
}

impl From<FieldErrors> for DomainError {
    fn from(errors: FieldErrors) -> Self {
        DomainError::Validation(errors)
    }
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        DomainError::Validation(FieldErrors::from(errors))
    }
}
