use std::sync::Arc;

use tracing::debug;

use seedpage_core::config::PagingSettings;
use seedpage_core::error::{Error, Result};
use seedpage_core::traits::IndexStore;
use seedpage_core::types::{Candidates, Document, DocumentId, PageRequest, PageResult};
use seedpage_rank::{RankKey, Ranker};

use crate::cursor::{Cursor, CursorPage, CursorRequest};
use crate::links::{build_links, LinkContext};

/// Seeded-random pagination over an injected index store.
///
/// For a fixed seed every listing is sorted by `(rank(seed, id), id)`, a
/// strict total order, so pages of the same seed tile the candidate set
/// exactly. The count, the order and the page slice all come from one store
/// snapshot. No lock is held across a call.
pub struct QueryEngine<S: IndexStore> {
    store: Arc<S>,
    max_size: u64,
}

impl<S: IndexStore> QueryEngine<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_paging(store, &PagingSettings::default())
    }

    pub fn with_paging(store: Arc<S>, paging: &PagingSettings) -> Self {
        Self { store, max_size: paging.max_size }
    }

    pub fn store(&self) -> &Arc<S> { &self.store }

    pub fn query(&self, request: &PageRequest) -> Result<PageResult> {
        let size = self.checked_size(request.size)?;
        let page = u64::try_from(request.page)
            .map_err(|_| Error::InvalidPageRequest(format!("page must not be negative, got {}", request.page)))?;
        let seed = checked_seed(request.seed.as_deref())?;

        let candidates = self.store.match_filtered(request.text_query(), request.filter())?;
        let generation = candidates.generation;
        let ranked = rank_all(&Ranker::new(seed), candidates);
        let total_count = ranked.len() as u64;

        let start = usize::try_from(page.saturating_mul(size)).unwrap_or(usize::MAX);
        let items: Vec<Document> = ranked
            .into_iter()
            .skip(start)
            .take(size as usize)
            .map(|(key, doc)| doc.with_score(key.rank()))
            .collect();

        let ctx = LinkContext { query: request.query.as_deref(), promoted: request.promoted, seed };
        let links = build_links(&ctx, page, size, total_count);
        debug!(page, size, total_count, returned = items.len(), generation, "served page");
        Ok(PageResult { items, total_count, links, generation })
    }

    /// Keyset variant of `query`: the page after `request.after`, or the
    /// first page when absent.
    pub fn query_after(&self, request: &CursorRequest) -> Result<CursorPage> {
        let size = self.checked_size(request.size)?;
        let seed = checked_seed(request.seed.as_deref())?;
        let after = request.after.as_deref().map(Cursor::decode).transpose()?;

        let candidates = self.store.match_filtered(request.text_query(), request.filter())?;
        let generation = candidates.generation;
        let ranked = rank_all(&Ranker::new(seed), candidates);
        let total_count = ranked.len() as u64;

        let start = after.map_or(0, |cursor| ranked.partition_point(|(key, _)| *key <= cursor.key()));
        let end = start.saturating_add(size as usize).min(ranked.len());
        let next_cursor = (end < ranked.len() && end > start).then(|| Cursor::new(ranked[end - 1].0).encode());
        let items: Vec<Document> = ranked
            .into_iter()
            .skip(start)
            .take(end - start)
            .map(|(key, doc)| doc.with_score(key.rank()))
            .collect();

        debug!(size, total_count, returned = items.len(), generation, "served cursor page");
        Ok(CursorPage { items, total_count, next_cursor, generation })
    }

    pub fn get(&self, id: DocumentId) -> Result<Document> {
        self.store.get(id)?.ok_or(Error::NotFound(id))
    }

    fn checked_size(&self, size: i64) -> Result<u64> {
        match u64::try_from(size) {
            Ok(size) if size > 0 && size <= self.max_size => Ok(size),
            _ => Err(Error::InvalidPageRequest(format!("size must be in 1..={}, got {}", self.max_size, size))),
        }
    }
}

fn checked_seed(seed: Option<&str>) -> Result<&str> {
    seed.filter(|s| !s.is_empty()).ok_or(Error::MissingSeed)
}

/// Candidates paired with their sort keys, in ascending key order.
fn rank_all(ranker: &Ranker, candidates: Candidates) -> Vec<(RankKey, Document)> {
    let mut ranked: Vec<(RankKey, Document)> = candidates.documents.into_iter().map(|d| (ranker.key(d.id), d)).collect();
    ranked.sort_unstable_by_key(|(key, _)| *key);
    ranked
}
