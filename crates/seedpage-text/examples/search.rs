use std::env;
use std::path::{Path, PathBuf};

use seedpage_core::traits::IndexStore;
use seedpage_core::types::FieldFilter;

// Print the raw candidate set of a query, in id order, before any ranking.
// Usage:
//   cargo run -p seedpage-text --example search -- [query] [--index DIR] [--promoted]

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let mut query: Option<String> = None;
    let mut index_dir: Option<PathBuf> = None;
    let mut filter = FieldFilter::default();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--index" => {
                if i + 1 >= args.len() { eprintln!("--index requires a path"); std::process::exit(2); }
                index_dir = Some(PathBuf::from(&args[i + 1]));
                i += 2; continue;
            }
            "--promoted" => { filter.promoted = Some(true); }
            s if s.starts_with('-') => { eprintln!("Unknown flag: {}", s); std::process::exit(2); }
            s => { query = Some(s.to_string()); }
        }
        i += 1;
    }

    let ws_root = Path::new(env!("CARGO_MANIFEST_DIR")).ancestors().nth(2).unwrap_or(Path::new("."));
    let index_dir = index_dir.unwrap_or_else(|| ws_root.join("dev_data/indexes/seedpage"));
    let store = seedpage_text::TantivyStore::open(&index_dir, seedpage_text::DEFAULT_WRITER_HEAP_BYTES)?;
    let candidates = store.match_filtered(query.as_deref(), filter)?;
    println!("generation {} · {} matches", candidates.generation, candidates.len());
    for doc in &candidates.documents {
        println!("{:>6}  {}{}", doc.id, doc.name, if doc.promoted { "  ★" } else { "" });
    }
    Ok(())
}
