//! seedpage-text
//!
//! Tantivy-backed index store for the browsed entity. See `store` for the
//! consistency model and `query` for how text queries are matched.

pub mod query;
pub mod store;
pub mod tantivy_utils;

pub use store::{TantivyStore, DEFAULT_WRITER_HEAP_BYTES};
