//! Domain types shared by the index store, the ranking function and the
//! query engine.

use serde::{Deserialize, Serialize};

pub type DocumentId = u64;

/// Version token of an index snapshot. Grows with every committed write.
pub type Generation = u64;

/// A record of the browsed entity as mirrored into the index store.
///
/// - `id`: immutable once assigned, unique within a store
/// - `name`: the searchable text field
/// - `promoted`: flag toggled by the promote action, filterable exactly
/// - `score`: transient; never persisted by the store, filled with the
///   seeded rank on query results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub name: String,
    #[serde(default)]
    pub promoted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl Document {
    pub fn new(id: DocumentId, name: impl Into<String>) -> Self {
        Self { id, name: name.into(), promoted: false, score: None }
    }

    pub fn promoted(mut self, promoted: bool) -> Self {
        self.promoted = promoted;
        self
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }
}

/// Payload of a create request. The id is assigned on write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDocument {
    pub name: String,
    #[serde(default)]
    pub promoted: bool,
}

impl NewDocument {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), promoted: false }
    }
}

/// Exact field filters applied on top of the text match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promoted: Option<bool>,
}

impl FieldFilter {
    pub fn is_empty(&self) -> bool {
        self.promoted.is_none()
    }
}

/// Candidate set read from a single store snapshot.
#[derive(Debug, Clone, Default)]
pub struct Candidates {
    pub generation: Generation,
    pub documents: Vec<Document>,
}

impl Candidates {
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// A list or search request as received from the UI layer.
///
/// `page` and `size` are signed so malformed input can be represented and
/// rejected instead of wrapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promoted: Option<bool>,
    pub page: i64,
    pub size: i64,
    #[serde(default)]
    pub seed: Option<String>,
}

impl PageRequest {
    pub fn list(page: i64, size: i64, seed: impl Into<String>) -> Self {
        Self { query: None, promoted: None, page, size, seed: Some(seed.into()) }
    }

    pub fn search(query: impl Into<String>, page: i64, size: i64, seed: impl Into<String>) -> Self {
        Self { query: Some(query.into()), ..Self::list(page, size, seed) }
    }

    pub fn with_promoted(mut self, promoted: bool) -> Self {
        self.promoted = Some(promoted);
        self
    }

    /// The text query with blank input normalised to "list all".
    pub fn text_query(&self) -> Option<&str> {
        self.query.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }

    pub fn filter(&self) -> FieldFilter {
        FieldFilter { promoted: self.promoted }
    }
}

/// Points at one page of a listing and carries everything needed to request
/// it again with the same ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRef {
    pub page: u64,
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promoted: Option<bool>,
    pub seed: String,
}

impl PageRef {
    pub fn to_request(&self) -> PageRequest {
        PageRequest {
            query: self.query.clone(),
            promoted: self.promoted,
            // Pages beyond i64::MAX cannot be produced from a valid request.
            page: i64::try_from(self.page).unwrap_or(i64::MAX),
            size: i64::try_from(self.size).unwrap_or(i64::MAX),
            seed: Some(self.seed.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLinks {
    pub first: PageRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<PageRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<PageRef>,
    pub last: PageRef,
}

/// One page of a seeded listing.
///
/// `total_count` and `items` always come from the snapshot identified by
/// `generation`. An empty `items` means zero matches on that page, never a
/// failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
    pub items: Vec<Document>,
    pub total_count: u64,
    pub links: PageLinks,
    pub generation: Generation,
}

impl PageResult {
    pub fn ids(&self) -> Vec<DocumentId> {
        self.items.iter().map(|d| d.id).collect()
    }
}
