//! Reads documents to mirror into the index store from JSON sources.
//!
//! A `.json` file holds an array of documents; a `.jsonl` file holds one
//! document per line. Directories are walked recursively in path order.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::types::{Document, DocumentId};

#[derive(Default)]
pub struct DocumentLoader;

impl DocumentLoader {
    pub fn new() -> Self { Self }

    /// Load every document under `path`, a file or a directory.
    ///
    /// Later occurrences of an id replace earlier ones so the result is a
    /// valid upsert batch.
    pub fn load_path(&self, path: &Path) -> Result<Vec<Document>> {
        let files = if path.is_dir() { self.list_source_files(path) } else { vec![path.to_path_buf()] };
        let mut by_id: HashMap<DocumentId, usize> = HashMap::new();
        let mut documents: Vec<Document> = Vec::new();
        for file_path in &files {
            let loaded = self.load_file(file_path)?;
            debug!(file = %file_path.display(), count = loaded.len(), "loaded documents");
            for mut doc in loaded {
                doc.score = None;
                match by_id.get(&doc.id) {
                    Some(&slot) => documents[slot] = doc,
                    None => {
                        by_id.insert(doc.id, documents.len());
                        documents.push(doc);
                    }
                }
            }
        }
        Ok(documents)
    }

    pub fn load_file(&self, file_path: &Path) -> Result<Vec<Document>> {
        let content = fs::read_to_string(file_path)
            .with_context(|| format!("reading {}", file_path.display()))?;
        if file_path.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            content
                .lines()
                .enumerate()
                .filter(|(_, line)| !line.trim().is_empty())
                .map(|(n, line)| {
                    serde_json::from_str::<Document>(line)
                        .with_context(|| format!("{}:{}: invalid document", file_path.display(), n + 1))
                })
                .collect()
        } else {
            serde_json::from_str::<Vec<Document>>(&content).with_context(|| format!("{}: expected a JSON array of documents", file_path.display()))
        }
    }

    fn list_source_files(&self, root: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for entry in walkdir::WalkDir::new(root).into_iter().filter_map(|e| e.ok()).filter(|e| e.file_type().is_file()) {
            let path = entry.path();
            if matches!(path.extension().and_then(|s| s.to_str()), Some("json" | "jsonl")) { files.push(path.to_path_buf()); }
        }
        files.sort(); files
    }
}
