//! Shared types for the storefront workspace.

mod types;

pub use types::{InvalidRecordId, RECORD_ID_LEN, RecordId};
