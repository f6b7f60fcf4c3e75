use serde::{Deserialize, Serialize};

use seedpage_core::error::{Error, Result};
use seedpage_core::types::{Document, FieldFilter, Generation};
use seedpage_rank::RankKey;

/// Opaque continuation token: the sort key of the last item served.
///
/// Only meaningful together with the seed, query and filter it was issued
/// for. Resuming strictly after a key means documents inserted or deleted
/// between requests never cause a surviving document to be skipped or
/// served twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor(RankKey);

impl Cursor {
    pub fn new(key: RankKey) -> Self { Self(key) }

    pub fn key(&self) -> RankKey { self.0 }

    pub fn encode(&self) -> String {
        format!("{:014x}.{:x}", self.0.bits(), self.0.id())
    }

    pub fn decode(token: &str) -> Result<Self> {
        let invalid = || Error::InvalidPageRequest(format!("malformed cursor '{}'", token));
        let (bits, id) = token.split_once('.').ok_or_else(invalid)?;
        let bits = u64::from_str_radix(bits, 16).map_err(|_| invalid())?;
        let id = u64::from_str_radix(id, 16).map_err(|_| invalid())?;
        RankKey::from_parts(bits, id).map(Self).ok_or_else(invalid)
    }
}

/// Keyset-paginated listing request. `after` is the `next_cursor` of the
/// previous page, absent for the first page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promoted: Option<bool>,
    pub size: i64,
    #[serde(default)]
    pub seed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
}

impl CursorRequest {
    pub fn first(query: Option<&str>, size: i64, seed: impl Into<String>) -> Self {
        Self { query: query.map(str::to_string), promoted: None, size, seed: Some(seed.into()), after: None }
    }

    /// The request for the page following one that returned `next_cursor`.
    pub fn resume(&self, next_cursor: &str) -> Self {
        Self { after: Some(next_cursor.to_string()), ..self.clone() }
    }

    pub fn text_query(&self) -> Option<&str> {
        self.query.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }

    pub fn filter(&self) -> FieldFilter {
        FieldFilter { promoted: self.promoted }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CursorPage {
    pub items: Vec<Document>,
    pub total_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
    pub generation: Generation,
}
