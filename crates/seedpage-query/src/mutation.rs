//! Write path: mirrors entity changes into the index store and tells
//! listeners that their listings are stale.
//!
//! Writes are visible to the next query as soon as they return. The channel
//! only notifies; pushing fresh pages to idle clients is left to whoever
//! subscribes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

use seedpage_core::error::{Error, Result};
use seedpage_core::traits::IndexStore;
use seedpage_core::types::{Document, DocumentId, Generation, NewDocument};

const CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvalidationKind {
    Created,
    Updated,
    Deleted,
    Reindexed,
    /// A batch of upserts landed in one generation; `id` is `None`.
    Batch,
}

/// Published after every successful write. `generation` is the first store
/// generation that contains the write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invalidation {
    pub kind: InvalidationKind,
    pub id: Option<DocumentId>,
    pub generation: Generation,
}

pub struct MutationService<S: IndexStore> {
    store: Arc<S>,
    next_id: AtomicU64,
    // Serialises read-check-write sequences so an update cannot resurrect a
    // document deleted between its existence check and its upsert.
    write_guard: Mutex<()>,
    events: broadcast::Sender<Invalidation>,
}

impl<S: IndexStore> MutationService<S> {
    /// Ids handed out by `create` continue after the largest id in `store`.
    pub fn new(store: Arc<S>) -> Result<Self> {
        let next_id = store.max_id()?.map_or(1, |max| max + 1);
        let (events, _) = broadcast::channel(CHANNEL_CAPACITY);
        Ok(Self { store, next_id: AtomicU64::new(next_id), write_guard: Mutex::new(()), events })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Invalidation> {
        self.events.subscribe()
    }

    pub fn create(&self, new: NewDocument) -> Result<Document> {
        let _guard = self.lock()?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let document = Document::new(id, new.name).promoted(new.promoted);
        let generation = self.store.upsert(&document)?;
        self.publish(InvalidationKind::Created, Some(id), generation);
        Ok(document)
    }

    /// Mirror a document whose id was assigned by the system of record.
    /// Later `create` calls never reuse its id.
    pub fn upsert(&self, document: Document) -> Result<Document> {
        let _guard = self.lock()?;
        let kind = if self.store.get(document.id)?.is_some() { InvalidationKind::Updated } else { InvalidationKind::Created };
        let document = Document { score: None, ..document };
        let generation = self.store.upsert(&document)?;
        self.next_id.fetch_max(document.id.saturating_add(1), Ordering::SeqCst);
        self.publish(kind, Some(document.id), generation);
        Ok(document)
    }

    /// Mirror a batch of documents in one store write with one invalidation.
    /// Within the batch a later occurrence of an id wins.
    pub fn upsert_many(&self, documents: &[Document]) -> Result<Generation> {
        let _guard = self.lock()?;
        let batch: Vec<Document> = documents.iter().map(|d| Document { score: None, ..d.clone() }).collect();
        let generation = self.store.upsert_many(&batch)?;
        if let Some(max) = batch.iter().map(|d| d.id).max() {
            self.next_id.fetch_max(max.saturating_add(1), Ordering::SeqCst);
        }
        self.publish(InvalidationKind::Batch, None, generation);
        Ok(generation)
    }

    /// Replace an existing document. Fails with `NotFound` for unknown ids.
    pub fn update(&self, document: Document) -> Result<Document> {
        let _guard = self.lock()?;
        self.require(document.id)?;
        let document = Document { score: None, ..document };
        let generation = self.store.upsert(&document)?;
        self.publish(InvalidationKind::Updated, Some(document.id), generation);
        Ok(document)
    }

    pub fn set_promoted(&self, id: DocumentId, promoted: bool) -> Result<Document> {
        let _guard = self.lock()?;
        let document = self.require(id)?.promoted(promoted);
        let generation = self.store.upsert(&document)?;
        self.publish(InvalidationKind::Updated, Some(id), generation);
        Ok(document)
    }

    /// The promote action of the listing UI.
    pub fn toggle_promoted(&self, id: DocumentId) -> Result<Document> {
        let _guard = self.lock()?;
        let current = self.require(id)?;
        let document = Document { promoted: !current.promoted, ..current };
        let generation = self.store.upsert(&document)?;
        self.publish(InvalidationKind::Updated, Some(id), generation);
        Ok(document)
    }

    /// Idempotent: deleting an unknown id succeeds.
    pub fn delete(&self, id: DocumentId) -> Result<()> {
        let _guard = self.lock()?;
        let generation = self.store.delete(id)?;
        self.publish(InvalidationKind::Deleted, Some(id), generation);
        Ok(())
    }

    /// Rebuild the store from the system of record in one commit.
    pub fn reindex(&self, documents: &[Document]) -> Result<Generation> {
        let _guard = self.lock()?;
        let generation = self.store.replace_all(documents)?;
        if let Some(max) = documents.iter().map(|d| d.id).max() {
            self.next_id.fetch_max(max + 1, Ordering::SeqCst);
        }
        self.publish(InvalidationKind::Reindexed, None, generation);
        Ok(generation)
    }

    fn require(&self, id: DocumentId) -> Result<Document> {
        self.store.get(id)?.ok_or(Error::NotFound(id))
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>> {
        self.write_guard.lock().map_err(|_| Error::unavailable("mutation lock poisoned"))
    }

    fn publish(&self, kind: InvalidationKind, id: Option<DocumentId>, generation: Generation) {
        let event = Invalidation { kind, id, generation };
        debug!(?kind, ?id, generation, subscribers = self.events.receiver_count(), "publishing invalidation");
        // Err only means nobody is subscribed.
        let _ = self.events.send(event);
    }
}
