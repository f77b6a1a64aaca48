use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::RecordId;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::{
    Document, Filter, Result, SortOrder, StoreError, UniqueKey, store::DocumentStore,
};

struct Entry {
    seq: u64,
    body: Value,
}

type KeySlot = (&'static str, &'static str, String);

#[derive(Default)]
struct State {
    next_seq: u64,
    collections: HashMap<&'static str, HashMap<RecordId, Entry>>,
    unique_keys: HashMap<KeySlot, RecordId>,
}

impl State {
    fn check_keys(
        &self,
        collection: &'static str,
        owner: &RecordId,
        keys: &[UniqueKey],
    ) -> Result<()> {
        for key in keys {
            let slot = (collection, key.constraint, key.value.clone());
            if let Some(holder) = self.unique_keys.get(&slot)
                && holder != owner
            {
                metrics::counter!("document_store_unique_violations_total").increment(1);
                return Err(StoreError::UniqueViolation {
                    collection,
                    constraint: key.constraint.to_string(),
                });
            }
        }
        Ok(())
    }

    fn release_keys(&mut self, collection: &'static str, owner: &RecordId) {
        self.unique_keys
            .retain(|(c, _, _), holder| *c != collection || holder != owner);
    }

    fn claim_keys(&mut self, collection: &'static str, owner: &RecordId, keys: Vec<UniqueKey>) {
        for key in keys {
            self.unique_keys
                .insert((collection, key.constraint, key.value), owner.clone());
        }
    }
}

/// In-memory document store implementation.
///
/// Unique keys are checked and claimed under the same write lock as the
/// document itself, so concurrent writers cannot both claim a key.
#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryDocumentStore {
    /// Creates a new empty in-memory document store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of documents stored in a collection.
    pub async fn count(&self, collection: &str) -> usize {
        self.state
            .read()
            .await
            .collections
            .get(collection)
            .map_or(0, HashMap::len)
    }
}

fn decode_sorted<D: Document>(mut entries: Vec<&Entry>, order: SortOrder) -> Result<Vec<D>> {
    match order {
        SortOrder::OldestFirst => entries.sort_by_key(|e| e.seq),
        SortOrder::NewestFirst => entries.sort_by_key(|e| std::cmp::Reverse(e.seq)),
    }
    entries
        .into_iter()
        .map(|e| serde_json::from_value(e.body.clone()).map_err(StoreError::from))
        .collect()
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn find<D: Document>(&self, filter: Filter) -> Result<Vec<D>> {
        let state = self.state.read().await;
        let Some(collection) = state.collections.get(D::COLLECTION) else {
            return Ok(Vec::new());
        };

        let matching: Vec<_> = collection
            .values()
            .filter(|e| filter.matches(&e.body))
            .collect();

        let mut documents = decode_sorted(matching, filter.order)?;
        if let Some(limit) = filter.limit {
            documents.truncate(limit);
        }
        Ok(documents)
    }

    async fn find_by_id<D: Document>(&self, id: &RecordId) -> Result<Option<D>> {
        let state = self.state.read().await;
        state
            .collections
            .get(D::COLLECTION)
            .and_then(|c| c.get(id))
            .map(|e| serde_json::from_value(e.body.clone()))
            .transpose()
            .map_err(StoreError::from)
    }

    async fn find_by_ids<D: Document>(&self, ids: &[RecordId]) -> Result<Vec<D>> {
        let state = self.state.read().await;
        let Some(collection) = state.collections.get(D::COLLECTION) else {
            return Ok(Vec::new());
        };

        let mut found: Vec<_> = ids.iter().filter_map(|id| collection.get(id)).collect();
        found.sort_by_key(|e| e.seq);
        found.dedup_by_key(|e| e.seq);
        decode_sorted(found, SortOrder::OldestFirst)
    }

    async fn insert<D: Document>(&self, document: &D) -> Result<()> {
        let body = serde_json::to_value(document)?;
        let id = document.id().clone();
        let keys = document.unique_keys();

        let mut state = self.state.write().await;

        let exists = state
            .collections
            .get(D::COLLECTION)
            .is_some_and(|c| c.contains_key(&id));
        if exists {
            return Err(StoreError::UniqueViolation {
                collection: D::COLLECTION,
                constraint: "documents_pkey".to_string(),
            });
        }
        state.check_keys(D::COLLECTION, &id, &keys)?;

        state.next_seq += 1;
        let seq = state.next_seq;
        state.claim_keys(D::COLLECTION, &id, keys);
        state
            .collections
            .entry(D::COLLECTION)
            .or_default()
            .insert(id, Entry { seq, body });

        Ok(())
    }

    async fn replace<D: Document>(&self, document: &D) -> Result<bool> {
        let body = serde_json::to_value(document)?;
        let id = document.id();
        let keys = document.unique_keys();

        let mut state = self.state.write().await;

        let exists = state
            .collections
            .get(D::COLLECTION)
            .is_some_and(|c| c.contains_key(id));
        if !exists {
            return Ok(false);
        }
        state.check_keys(D::COLLECTION, id, &keys)?;

        state.release_keys(D::COLLECTION, id);
        state.claim_keys(D::COLLECTION, id, keys);
        if let Some(entry) = state
            .collections
            .get_mut(D::COLLECTION)
            .and_then(|c| c.get_mut(id))
        {
            entry.body = body;
        }

        Ok(true)
    }

    async fn delete<D: Document>(&self, id: &RecordId) -> Result<Option<D>> {
        let mut state = self.state.write().await;

        let removed = state
            .collections
            .get_mut(D::COLLECTION)
            .and_then(|c| c.remove(id));

        match removed {
            Some(entry) => {
                state.release_keys(D::COLLECTION, id);
                Ok(Some(serde_json::from_value(entry.body)?))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;
    use crate::store::DocumentStoreExt;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Ticket {
        id: RecordId,
        owner: String,
        open: bool,
        tags: Vec<String>,
    }

    impl Ticket {
        fn new(owner: &str, open: bool) -> Self {
            Self {
                id: RecordId::new(),
                owner: owner.to_string(),
                open,
                tags: Vec::new(),
            }
        }
    }

    impl Document for Ticket {
        const COLLECTION: &'static str = "tickets";

        fn id(&self) -> &RecordId {
            &self.id
        }

        fn unique_keys(&self) -> Vec<UniqueKey> {
            if self.open {
                vec![UniqueKey::new("tickets_one_open_per_owner", &self.owner)]
            } else {
                Vec::new()
            }
        }
    }

    #[tokio::test]
    async fn insert_and_find_by_id() {
        let store = InMemoryDocumentStore::new();
        let ticket = Ticket::new("alice", true);

        store.insert(&ticket).await.unwrap();

        let found: Option<Ticket> = store.find_by_id(&ticket.id).await.unwrap();
        assert_eq!(found, Some(ticket));
        assert_eq!(store.count("tickets").await, 1);
    }

    #[tokio::test]
    async fn find_by_id_missing_returns_none() {
        let store = InMemoryDocumentStore::new();
        let found: Option<Ticket> = store.find_by_id(&RecordId::new()).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn duplicate_id_is_rejected() {
        let store = InMemoryDocumentStore::new();
        let ticket = Ticket::new("alice", false);
        store.insert(&ticket).await.unwrap();

        let result = store.insert(&ticket).await;
        assert!(matches!(result, Err(StoreError::UniqueViolation { .. })));
    }

    #[tokio::test]
    async fn unique_key_rejects_second_holder() {
        let store = InMemoryDocumentStore::new();
        store.insert(&Ticket::new("alice", true)).await.unwrap();

        let err = store.insert(&Ticket::new("alice", true)).await.unwrap_err();
        assert_eq!(err.violated_constraint(), Some("tickets_one_open_per_owner"));

        // Out-of-scope documents do not claim the key
        store.insert(&Ticket::new("alice", false)).await.unwrap();
        assert_eq!(store.count("tickets").await, 2);
    }

    #[tokio::test]
    async fn replace_releases_keys_leaving_scope() {
        let store = InMemoryDocumentStore::new();
        let mut first = Ticket::new("alice", true);
        store.insert(&first).await.unwrap();

        first.open = false;
        assert!(store.replace(&first).await.unwrap());

        store.insert(&Ticket::new("alice", true)).await.unwrap();
    }

    #[tokio::test]
    async fn replace_checks_keys_entering_scope() {
        let store = InMemoryDocumentStore::new();
        store.insert(&Ticket::new("alice", true)).await.unwrap();
        let mut closed = Ticket::new("alice", false);
        store.insert(&closed).await.unwrap();

        closed.open = true;
        let result = store.replace(&closed).await;
        assert!(matches!(result, Err(StoreError::UniqueViolation { .. })));

        let stored: Ticket = store.find_by_id(&closed.id).await.unwrap().unwrap();
        assert!(!stored.open);
    }

    #[tokio::test]
    async fn replace_missing_returns_false() {
        let store = InMemoryDocumentStore::new();
        let ticket = Ticket::new("alice", true);
        assert!(!store.replace(&ticket).await.unwrap());
    }

    #[tokio::test]
    async fn delete_returns_document_and_releases_keys() {
        let store = InMemoryDocumentStore::new();
        let ticket = Ticket::new("alice", true);
        store.insert(&ticket).await.unwrap();

        let deleted: Option<Ticket> = store.delete(&ticket.id).await.unwrap();
        assert_eq!(deleted, Some(ticket.clone()));

        let again: Option<Ticket> = store.delete(&ticket.id).await.unwrap();
        assert!(again.is_none());

        store.insert(&Ticket::new("alice", true)).await.unwrap();
    }

    #[tokio::test]
    async fn find_filters_and_orders() {
        let store = InMemoryDocumentStore::new();
        let a = Ticket::new("alice", false);
        let b = Ticket::new("bob", false);
        let c = Ticket::new("alice", true);
        for t in [&a, &b, &c] {
            store.insert(t).await.unwrap();
        }

        let alice: Vec<Ticket> = store.find(Filter::new().eq("owner", "alice")).await.unwrap();
        assert_eq!(alice, vec![a.clone(), c.clone()]);

        let newest: Vec<Ticket> = store
            .find(Filter::new().eq("owner", "alice").newest_first())
            .await
            .unwrap();
        assert_eq!(newest, vec![c.clone(), a.clone()]);

        let one: Option<Ticket> = store.find_one(Filter::new().eq("open", true)).await.unwrap();
        assert_eq!(one, Some(c));
    }

    #[tokio::test]
    async fn find_has_element() {
        let store = InMemoryDocumentStore::new();
        let mut tagged = Ticket::new("alice", false);
        tagged.tags = vec!["urgent".to_string()];
        store.insert(&tagged).await.unwrap();
        store.insert(&Ticket::new("bob", false)).await.unwrap();

        assert!(
            store
                .exists::<Ticket>(Filter::new().has_element("tags", "urgent"))
                .await
                .unwrap()
        );
        assert!(
            !store
                .exists::<Ticket>(Filter::new().has_element("tags", "later"))
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn find_by_ids_skips_unknown() {
        let store = InMemoryDocumentStore::new();
        let a = Ticket::new("alice", false);
        let b = Ticket::new("bob", false);
        store.insert(&a).await.unwrap();
        store.insert(&b).await.unwrap();

        let found: Vec<Ticket> = store
            .find_by_ids(&[b.id.clone(), RecordId::new(), a.id.clone()])
            .await
            .unwrap();
        assert_eq!(found, vec![a, b]);
    }

    #[tokio::test]
    async fn concurrent_inserts_claim_key_once() {
        let store = InMemoryDocumentStore::new();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.insert(&Ticket::new("alice", true)).await })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                successes += 1;
            }
        }
        assert_eq!(successes, 1);

        let open: Vec<Ticket> = store.find(Filter::new().eq("open", true)).await.unwrap();
        assert_eq!(open.len(), 1);
    }
}
