//! Document persistence for the storefront backend.
//!
//! Provides the [`DocumentStore`] trait with an in-memory implementation for
//! tests and local runs, and a PostgreSQL implementation storing JSONB bodies.

pub mod document;
pub mod error;
pub mod filter;
pub mod memory;
pub mod postgres;
pub mod store;

pub use common::RecordId;
pub use document::{Document, UniqueKey};
pub use error::{Result, StoreError};
pub use filter::{Filter, SortOrder};
pub use memory::InMemoryDocumentStore;
pub use postgres::PostgresDocumentStore;
pub use store::{DocumentStore, DocumentStoreExt};
