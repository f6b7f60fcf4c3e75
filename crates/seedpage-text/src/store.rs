use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use tantivy::collector::{DocSetCollector, TopDocs};
use tantivy::directory::MmapDirectory;
use tantivy::schema::Value;
use tantivy::{doc, Index, IndexReader, IndexWriter, ReloadPolicy, Searcher, TantivyDocument, TantivyError, Term};
use tracing::{debug, warn};

use seedpage_core::config::IndexSettings;
use seedpage_core::error::{Error, Result};
use seedpage_core::traits::IndexStore;
use seedpage_core::types::{Candidates, Document, DocumentId, FieldFilter, Generation};

use crate::query::{build_match_query, id_query};
use crate::tantivy_utils::{build_schema, register_tokenizer, Fields};

pub const DEFAULT_WRITER_HEAP_BYTES: usize = 50_000_000;

/// Tantivy-backed `IndexStore` with read-after-write semantics.
///
/// Every write commits and reloads the reader before the writer lock is
/// released, so any read that starts after a write returns observes it.
/// Reads work on one `Searcher`, an immutable point-in-time snapshot, and
/// never take the writer lock.
pub struct TantivyStore {
	index: Index,
	reader: IndexReader,
	writer: Mutex<IndexWriter>,
	fields: Fields,
	closed: AtomicBool,
	/// Set when a commit landed but the reader could not be reloaded.
	stale: AtomicBool,
}

impl TantivyStore {
	pub fn in_memory() -> Result<Self> {
		Self::with_index(Index::create_in_ram(build_schema()), DEFAULT_WRITER_HEAP_BYTES)
	}

	/// Open the index under `index_dir`, creating it if absent.
	pub fn open(index_dir: &Path, writer_heap_bytes: usize) -> Result<Self> {
		std::fs::create_dir_all(index_dir).map_err(Error::unavailable)?;
		let dir = MmapDirectory::open(index_dir).map_err(Error::unavailable)?;
		let index = Index::open_or_create(dir, build_schema()).map_err(Error::unavailable)?;
		Self::with_index(index, writer_heap_bytes)
	}

	/// On-disk store when `index.dir` is configured, in-memory otherwise.
	pub fn from_settings(settings: &IndexSettings, base: &Path) -> Result<Self> {
		match settings.resolved_dir(base) {
			Some(dir) => Self::open(&dir, settings.writer_heap_bytes),
			None => Self::with_index(Index::create_in_ram(build_schema()), settings.writer_heap_bytes),
		}
	}

	fn with_index(index: Index, writer_heap_bytes: usize) -> Result<Self> {
		register_tokenizer(&index);
		let fields = Fields::resolve(&index.schema()).map_err(Error::unavailable)?;
		let writer: IndexWriter = index.writer_with_num_threads(1, writer_heap_bytes).map_err(Error::unavailable)?;
		let reader: IndexReader = index
			.reader_builder()
			.reload_policy(ReloadPolicy::Manual)
			.try_into()
			.map_err(|e: TantivyError| Error::unavailable(e))?;
		Ok(Self { index, reader, writer: Mutex::new(writer), fields, closed: AtomicBool::new(false), stale: AtomicBool::new(false) })
	}

	/// Mark the store unavailable. Every later operation fails with
	/// `Error::StoreUnavailable`; the index itself is left intact.
	pub fn close(&self) {
		self.closed.store(true, Ordering::SeqCst);
	}

	pub fn is_closed(&self) -> bool {
		self.closed.load(Ordering::SeqCst)
	}

	/// Number of live documents.
	pub fn len(&self) -> Result<u64> {
		Ok(self.snapshot()?.num_docs())
	}

	pub fn is_empty(&self) -> Result<bool> {
		Ok(self.len()? == 0)
	}

	pub fn generation(&self) -> Result<Generation> {
		Ok(self.snapshot()?.generation().generation_id())
	}

	fn snapshot(&self) -> Result<Searcher> {
		self.ensure_open()?;
		if self.stale.swap(false, Ordering::SeqCst) {
			if let Err(e) = self.reader.reload() {
				self.stale.store(true, Ordering::SeqCst);
				return Err(Error::unavailable(e));
			}
		}
		Ok(self.reader.searcher())
	}

	fn ensure_open(&self) -> Result<()> {
		if self.is_closed() { return Err(Error::unavailable("index store is closed")); }
		Ok(())
	}

	fn lock_writer(&self) -> Result<MutexGuard<'_, IndexWriter>> {
		self.writer.lock().map_err(|_| Error::unavailable("index writer lock poisoned"))
	}

	/// Apply `op` and commit as one unit. A failed operation or commit is
	/// rolled back so no half-applied delete survives into a later commit.
	/// Once the commit succeeds the write is durable and reported as such; a
	/// failed reload is deferred to the next snapshot.
	fn write<F>(&self, op: &'static str, apply: F) -> Result<Generation>
	where
		F: FnOnce(&mut IndexWriter, &Fields) -> tantivy::Result<()>,
	{
		self.ensure_open()?;
		let mut writer = self.lock_writer()?;
		let outcome = apply(&mut *writer, &self.fields).and_then(|()| writer.commit().map(|_| ()));
		if let Err(e) = outcome {
			warn!(op, error = %e, "index write failed, rolling back");
			if let Err(rollback) = writer.rollback() { warn!(op, error = %rollback, "rollback failed"); }
			return Err(Error::unavailable(e));
		}
		if let Err(e) = self.reader.reload() {
			warn!(op, error = %e, "reader reload failed after commit, deferring");
			self.stale.store(true, Ordering::SeqCst);
		}
		Ok(self.reader.searcher().generation().generation_id())
	}

	fn to_tantivy(&self, document: &Document) -> TantivyDocument {
		doc!(
			self.fields.id => document.id,
			self.fields.name => document.name.as_str(),
			self.fields.promoted => document.promoted,
		)
	}

	fn from_tantivy(&self, doc: &TantivyDocument) -> Result<Document> {
		let id = doc.get_first(self.fields.id).and_then(|v| v.as_u64())
			.ok_or_else(|| Error::unavailable("stored document has no id"))?;
		let name = doc.get_first(self.fields.name).and_then(|v| v.as_str()).unwrap_or_default();
		let promoted = doc.get_first(self.fields.promoted).and_then(|v| v.as_bool()).unwrap_or(false);
		Ok(Document::new(id, name).promoted(promoted))
	}
}

impl IndexStore for TantivyStore {
	fn upsert(&self, document: &Document) -> Result<Generation> {
		let doc = self.to_tantivy(document);
		let generation = self.write("upsert", |writer, fields| {
			writer.delete_term(Term::from_field_u64(fields.id, document.id));
			writer.add_document(doc).map(|_| ())
		})?;
		debug!(id = document.id, generation, "upserted document");
		Ok(generation)
	}

	fn upsert_many(&self, documents: &[Document]) -> Result<Generation> {
		let batch: Vec<(DocumentId, TantivyDocument)> = documents.iter().map(|d| (d.id, self.to_tantivy(d))).collect();
		let generation = self.write("upsert_many", |writer, fields| {
			for (id, doc) in batch {
				writer.delete_term(Term::from_field_u64(fields.id, id));
				writer.add_document(doc)?;
			}
			Ok(())
		})?;
		debug!(count = documents.len(), generation, "upserted batch");
		Ok(generation)
	}

	fn delete(&self, id: DocumentId) -> Result<Generation> {
		let generation = self.write("delete", |writer, fields| {
			writer.delete_term(Term::from_field_u64(fields.id, id));
			Ok(())
		})?;
		debug!(id, generation, "deleted document");
		Ok(generation)
	}

	fn get(&self, id: DocumentId) -> Result<Option<Document>> {
		let searcher = self.snapshot()?;
		let top = searcher.search(&id_query(&self.fields, id), &TopDocs::with_limit(1)).map_err(Error::unavailable)?;
		match top.first() {
			Some((_, addr)) => {
				let doc: TantivyDocument = searcher.doc(*addr).map_err(Error::unavailable)?;
				self.from_tantivy(&doc).map(Some)
			}
			None => Ok(None),
		}
	}

	fn match_filtered(&self, query: Option<&str>, filter: FieldFilter) -> Result<Candidates> {
		let searcher = self.snapshot()?;
		let q = build_match_query(&self.index, &self.fields, query, filter).map_err(Error::unavailable)?;
		let addresses = searcher.search(&*q, &DocSetCollector).map_err(Error::unavailable)?;
		let mut documents = Vec::with_capacity(addresses.len());
		for addr in addresses {
			let doc: TantivyDocument = searcher.doc(addr).map_err(Error::unavailable)?;
			documents.push(self.from_tantivy(&doc)?);
		}
		documents.sort_by_key(|d| d.id);
		let generation = searcher.generation().generation_id();
		debug!(query = query.unwrap_or(""), total = documents.len(), generation, "matched documents");
		Ok(Candidates { generation, documents })
	}

	fn replace_all(&self, documents: &[Document]) -> Result<Generation> {
		let batch: Vec<TantivyDocument> = documents.iter().map(|d| self.to_tantivy(d)).collect();
		let generation = self.write("replace_all", |writer, _| {
			writer.delete_all_documents()?;
			for doc in batch { writer.add_document(doc)?; }
			Ok(())
		})?;
		debug!(count = documents.len(), generation, "replaced all documents");
		Ok(generation)
	}

	fn max_id(&self) -> Result<Option<DocumentId>> {
		Ok(self.match_documents(None)?.documents.last().map(|d| d.id))
	}
}
