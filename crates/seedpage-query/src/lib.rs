//! seedpage-query
//!
//! Seeded-random pagination (`engine`), its navigation metadata (`links`,
//! `cursor`) and the write path that keeps listings fresh (`mutation`).

pub mod cursor;
pub mod engine;
pub mod links;
pub mod mutation;

use std::sync::Arc;

use seedpage_core::config::PagingSettings;
use seedpage_core::error::Result;
use seedpage_core::traits::IndexStore;

pub use cursor::{Cursor, CursorPage, CursorRequest};
pub use engine::QueryEngine;
pub use links::{link_header, pagination_headers, LINK_HEADER, TOTAL_COUNT_HEADER};
pub use mutation::{Invalidation, InvalidationKind, MutationService};

/// Read and write paths sharing one injected store.
pub struct Catalog<S: IndexStore> {
    engine: QueryEngine<S>,
    mutations: MutationService<S>,
}

impl<S: IndexStore> Catalog<S> {
    pub fn new(store: Arc<S>, paging: &PagingSettings) -> Result<Self> {
        let mutations = MutationService::new(Arc::clone(&store))?;
        Ok(Self { engine: QueryEngine::with_paging(store, paging), mutations })
    }

    pub fn engine(&self) -> &QueryEngine<S> { &self.engine }

    pub fn mutations(&self) -> &MutationService<S> { &self.mutations }
}
