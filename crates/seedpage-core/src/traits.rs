use crate::error::Result;
use crate::types::{Candidates, Document, DocumentId, FieldFilter, Generation};

/// System of record for search over the browsed entity.
///
/// Writes are serialised and visible to every read that starts after they
/// return. Reads never block writes for longer than a snapshot acquisition.
/// Failures surface as `Error::StoreUnavailable`, never as empty results.
pub trait IndexStore: Send + Sync {
    /// Insert or replace by id. Returns the generation that contains the write.
    fn upsert(&self, document: &Document) -> Result<Generation>;

    /// Insert or replace a batch by id. Stores that can should apply the
    /// whole batch in one write; the default upserts one at a time.
    fn upsert_many(&self, documents: &[Document]) -> Result<Generation> {
        let mut generation = None;
        for document in documents { generation = Some(self.upsert(document)?); }
        match generation {
            Some(generation) => Ok(generation),
            None => self.match_documents(None).map(|c| c.generation),
        }
    }

    /// Remove by id. Removing an unknown id is a no-op.
    fn delete(&self, id: DocumentId) -> Result<Generation>;

    fn get(&self, id: DocumentId) -> Result<Option<Document>>;

    /// All documents matching `query` and `filter`, read from one snapshot.
    /// A `None` query matches everything.
    fn match_filtered(&self, query: Option<&str>, filter: FieldFilter) -> Result<Candidates>;

    fn match_documents(&self, query: Option<&str>) -> Result<Candidates> {
        self.match_filtered(query, FieldFilter::default())
    }

    /// Atomically replace the whole content of the store.
    fn replace_all(&self, documents: &[Document]) -> Result<Generation>;

    fn max_id(&self) -> Result<Option<DocumentId>>;
}
