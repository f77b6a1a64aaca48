use async_trait::async_trait;
use common::RecordId;

use crate::{Document, Filter, Result};

/// Core trait for document store implementations.
///
/// A document store persists [`Document`]s grouped by collection and enforces
/// their unique keys atomically with each write. All implementations must be
/// thread-safe (Send + Sync).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Retrieves every document of the collection matching `filter`.
    async fn find<D: Document>(&self, filter: Filter) -> Result<Vec<D>>;

    /// Retrieves a document by identity.
    ///
    /// Returns None if no such document exists.
    async fn find_by_id<D: Document>(&self, id: &RecordId) -> Result<Option<D>>;

    /// Retrieves the documents whose identities are listed.
    ///
    /// Unknown ids are skipped; results follow insertion order.
    async fn find_by_ids<D: Document>(&self, ids: &[RecordId]) -> Result<Vec<D>>;

    /// Inserts a new document.
    ///
    /// Fails with `UniqueViolation` if the id or any unique key is taken.
    async fn insert<D: Document>(&self, document: &D) -> Result<()>;

    /// Replaces an existing document with the same identity.
    ///
    /// Returns false if the document does not exist. Unique keys are
    /// re-evaluated against the new body.
    async fn replace<D: Document>(&self, document: &D) -> Result<bool>;

    /// Deletes a document by identity, returning it.
    ///
    /// Returns None if no such document exists.
    async fn delete<D: Document>(&self, id: &RecordId) -> Result<Option<D>>;
}

/// Extension trait providing convenience methods for document stores.
#[async_trait]
pub trait DocumentStoreExt: DocumentStore {
    /// Retrieves the first document matching `filter`.
    async fn find_one<D: Document>(&self, filter: Filter) -> Result<Option<D>> {
        Ok(self.find::<D>(filter.limit(1)).await?.into_iter().next())
    }

    /// Checks whether any document matches `filter`.
    async fn exists<D: Document>(&self, filter: Filter) -> Result<bool> {
        Ok(self.find_one::<D>(filter).await?.is_some())
    }

    /// Lists every document of a collection.
    async fn find_all<D: Document>(&self) -> Result<Vec<D>> {
        self.find::<D>(Filter::new()).await
    }
}

// Blanket implementation for all DocumentStore implementations
impl<T: DocumentStore + ?Sized> DocumentStoreExt for T {}
