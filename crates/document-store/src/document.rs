use common::RecordId;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// A record that can be persisted in a [`DocumentStore`](crate::DocumentStore).
///
/// Documents are stored as JSON bodies inside a named collection and are
/// addressed by their [`RecordId`].
pub trait Document: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Name of the collection holding documents of this type.
    const COLLECTION: &'static str;

    /// Returns the document's identity.
    fn id(&self) -> &RecordId;

    /// Keys that must be unique within the collection.
    ///
    /// A key only participates while it is returned, so a document can scope
    /// a constraint to part of its lifecycle by omitting the key outside it.
    fn unique_keys(&self) -> Vec<UniqueKey> {
        Vec::new()
    }
}

/// A value that must not be shared by two documents under the same constraint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UniqueKey {
    /// Constraint name, reported back on violation.
    pub constraint: &'static str,
    /// The constrained value.
    pub value: String,
}

impl UniqueKey {
    /// Creates a unique key for a constraint.
    pub fn new(constraint: &'static str, value: impl Into<String>) -> Self {
        Self {
            constraint,
            value: value.into(),
        }
    }
}
