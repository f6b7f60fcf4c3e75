#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod config;
pub mod error;
pub mod ingest;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use traits::IndexStore;
pub use types::{
    Candidates, Document, DocumentId, FieldFilter, Generation, NewDocument, PageLinks, PageRef,
    PageRequest, PageResult,
};
