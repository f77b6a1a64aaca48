//! Lookups that resolve record references or fail with not-found.

use std::collections::HashMap;

use common::RecordId;
use document_store::DocumentStore;

use crate::error::DomainError;
use crate::product::Product;
use crate::user::User;

/// Loads the user `id` refers to.
pub(crate) async fn require_user<S: DocumentStore>(
    store: &S,
    id: &RecordId,
) -> Result<User, DomainError> {
    store
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::not_found("User", id))
}

/// Loads every referenced product, keyed by id.
///
/// Fails on the first id that does not resolve.
pub(crate) async fn require_products<'a, S, I>(
    store: &S,
    ids: I,
) -> Result<HashMap<RecordId, Product>, DomainError>
where
    S: DocumentStore,
    I: IntoIterator<Item = &'a RecordId>,
{
    let mut wanted: Vec<RecordId> = ids.into_iter().cloned().collect();
    wanted.sort();
    wanted.dedup();

    if wanted.is_empty() {
        return Ok(HashMap::new());
    }

    let found: HashMap<RecordId, Product> = store
        .find_by_ids::<Product>(&wanted)
        .await?
        .into_iter()
        .map(|p| (p.id.clone(), p))
        .collect();

    if let Some(missing) = wanted.iter().find(|id| !found.contains_key(*id)) {
        return Err(DomainError::not_found("Product", missing));
    }
    Ok(found)
}
