use std::env;
use std::path::{Path, PathBuf};

use seedpage_core::ingest::DocumentLoader;
use seedpage_core::traits::IndexStore;

// Rebuild an on-disk index from JSON documents without touching other crates.
// Usage:
//   cargo run -p seedpage-text --example index -- [--dir ../dev_data/docs] [--index ../dev_data/indexes/seedpage]
// Notes:
//   - Replaces the whole content of the target index in one commit.
//   - Defaults resolve relative to the workspace root so you can run from anywhere.

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let mut data_dir: Option<PathBuf> = None;
    let mut index_dir: Option<PathBuf> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--dir" => {
                if i + 1 >= args.len() { eprintln!("--dir requires a path"); std::process::exit(2); }
                data_dir = Some(PathBuf::from(&args[i + 1]));
                i += 2; continue;
            }
            "--index" => {
                if i + 1 >= args.len() { eprintln!("--index requires a path"); std::process::exit(2); }
                index_dir = Some(PathBuf::from(&args[i + 1]));
                i += 2; continue;
            }
            s if s.starts_with('-') => {
                eprintln!("Unknown flag: {}", s); std::process::exit(2);
            }
            _ => { i += 1; }
        }
    }

    let ws_root = Path::new(env!("CARGO_MANIFEST_DIR")).ancestors().nth(2).unwrap_or(Path::new("."));
    let data_dir = data_dir
        .or_else(|| env::var("SEEDPAGE_DATA_DIR").ok().map(PathBuf::from))
        .unwrap_or_else(|| ws_root.join("dev_data/docs"));
    let index_dir = index_dir
        .or_else(|| env::var("SEEDPAGE_INDEX_DIR").ok().map(PathBuf::from))
        .unwrap_or_else(|| ws_root.join("dev_data/indexes/seedpage"));

    println!("Data dir : {}", data_dir.display());
    println!("Index dir: {}", index_dir.display());

    let documents = DocumentLoader::new().load_path(&data_dir)?;
    let store = seedpage_text::TantivyStore::open(&index_dir, seedpage_text::DEFAULT_WRITER_HEAP_BYTES)?;
    let generation = store.replace_all(&documents)?;
    println!("Done. Indexed {} documents (generation {}).", documents.len(), generation);
    Ok(())
}
