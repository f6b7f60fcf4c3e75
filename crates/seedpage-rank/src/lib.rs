//! seedpage-rank
//!
//! Seeded pseudo-random ranking. `rank(seed, id)` is a pure function of its
//! inputs: xxHash64 over the seed bytes gives a per-seed hash seed, xxHash64
//! over the little-endian id bytes (seeded with it) gives 64 bits, and the top
//! 53 bits scaled by 2^-53 give a rank in `[0, 1)` that is exact in an `f64`.
//! Only raw bytes are hashed, so ranks agree across processes and builds.

use rand::distributions::Alphanumeric;
use rand::Rng;
use std::hash::Hasher;
use twox_hash::XxHash64;

use seedpage_core::types::{Document, DocumentId};

const RANK_BITS: u32 = 53;
const RANK_SCALE: f64 = (1u64 << RANK_BITS) as f64;
const SEED_LEN: usize = 16;

/// Total sort key of a document for one seed: rank first, id on ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RankKey {
    bits: u64,
    id: DocumentId,
}

impl RankKey {
    /// Rebuild a key from its parts, e.g. when decoding a cursor. `bits` must
    /// fit in the rank width.
    pub fn from_parts(bits: u64, id: DocumentId) -> Option<Self> {
        (bits >> RANK_BITS == 0).then_some(Self { bits, id })
    }

    pub fn bits(&self) -> u64 { self.bits }

    pub fn id(&self) -> DocumentId { self.id }

    pub fn rank(&self) -> f64 { self.bits as f64 / RANK_SCALE }
}

/// Ranks documents for one seed. The seed is hashed once on construction.
#[derive(Debug, Clone, Copy)]
pub struct Ranker {
    seed_key: u64,
}

impl Ranker {
    pub fn new(seed: &str) -> Self {
        let mut hasher = XxHash64::with_seed(0);
        hasher.write(seed.as_bytes());
        Self { seed_key: hasher.finish() }
    }

    pub fn key(&self, id: DocumentId) -> RankKey {
        let mut hasher = XxHash64::with_seed(self.seed_key);
        hasher.write(&id.to_le_bytes());
        RankKey { bits: hasher.finish() >> (64 - RANK_BITS), id }
    }

    pub fn rank(&self, id: DocumentId) -> f64 { self.key(id).rank() }

    /// Order documents by `(rank, id)` ascending.
    pub fn sort(&self, documents: &mut [Document]) {
        documents.sort_by_cached_key(|d| self.key(d.id));
    }
}

pub fn rank(seed: &str, id: DocumentId) -> f64 { Ranker::new(seed).rank(id) }

/// A fresh seed for a listing session that did not bring its own.
pub fn mint_seed() -> String {
    rand::thread_rng().sample_iter(&Alphanumeric).take(SEED_LEN).map(char::from).collect()
}
