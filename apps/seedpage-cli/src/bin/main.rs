use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use seedpage_core::config::Config;
use seedpage_core::ingest::DocumentLoader;
use seedpage_core::types::{Document, NewDocument, PageRequest};
use seedpage_query::{link_header, Catalog, TOTAL_COUNT_HEADER};
use seedpage_text::TantivyStore;

/// Documents per index commit during `ingest`.
const INGEST_BATCH: usize = 1_000;

const USAGE: &str = "Usage: seedpage <command> [args...]

Commands:
  seed                                 print a fresh listing seed
  ingest <file|dir>                    upsert documents from .json/.jsonl
  reindex <file|dir>                   replace the index content
  list [page] [size] [seed]            seeded listing of all documents
  search <query> [page] [size] [seed]  seeded listing of matching documents
  get <id>
  create <name> [--promoted]
  promote <id>                         toggle the promoted flag
  delete <id>";

fn parse_args() -> (String, Vec<String>) {
    let mut args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() { eprintln!("{}", USAGE); std::process::exit(1); }
    let cmd = args.remove(0);
    (cmd, args)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let mut settings = config.settings()?;
    let (cmd, args) = parse_args();
    if cmd == "seed" { println!("{}", seedpage_rank::mint_seed()); return Ok(()); }

    if settings.index.dir.is_none() { settings.index.dir = Some("dev_data/indexes/seedpage".to_string()); }
    let store = Arc::new(TantivyStore::from_settings(&settings.index, Path::new("."))?);
    let catalog = Catalog::new(store, &settings.paging)?;
    let default_size = i64::try_from(settings.paging.default_size)?;

    match cmd.as_str() {
        "ingest" | "reindex" => {
            let path = PathBuf::from(required(&args, 0, "<file|dir>"));
            let documents = DocumentLoader::new().load_path(&path)?;
            if cmd == "reindex" {
                let generation = catalog.mutations().reindex(&documents)?;
                info!(count = documents.len(), generation, "reindexed");
            } else {
                ingest(&catalog, &documents)?;
            }
            eprintln!("✅ {} complete ({} documents)", cmd, documents.len());
        }
        "list" | "search" => {
            let (query, rest) = if cmd == "search" { (Some(required(&args, 0, "<query>").to_string()), &args[1..]) } else { (None, &args[..]) };
            let page: i64 = rest.first().map(|p| p.parse()).transpose()?.unwrap_or(0);
            let size: i64 = rest.get(1).map(|s| s.parse()).transpose()?.unwrap_or(default_size);
            let seed = rest.get(2).cloned().unwrap_or_else(seedpage_rank::mint_seed);
            let request = PageRequest { query, promoted: None, page, size, seed: Some(seed) };
            let result = catalog.engine().query(&request)?;
            let base = if cmd == "search" { "/api/_search/documents" } else { "/api/documents" };
            eprintln!("{}: {}", TOTAL_COUNT_HEADER, result.total_count);
            eprintln!("Link: {}", link_header(base, &result.links));
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        "get" => {
            let doc = catalog.engine().get(parse_id(&args)?)?;
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        "create" => {
            let name = required(&args, 0, "<name>").to_string();
            let promoted = args.iter().any(|a| a == "--promoted");
            let doc = catalog.mutations().create(NewDocument { name, promoted })?;
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        "promote" => {
            let doc = catalog.mutations().toggle_promoted(parse_id(&args)?)?;
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        "delete" => {
            let id = parse_id(&args)?;
            catalog.mutations().delete(id)?;
            println!("{}", json!({ "deleted": id }));
        }
        _ => { eprintln!("Unknown command: {}\n\n{}", cmd, USAGE); std::process::exit(1); }
    }
    Ok(())
}

fn ingest(catalog: &Catalog<TantivyStore>, documents: &[Document]) -> anyhow::Result<()> {
    let pb = ProgressBar::new(documents.len() as u64);
    pb.set_style(ProgressStyle::default_bar().template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} documents ({percent}%)")?.progress_chars("#>-"));
    for batch in documents.chunks(INGEST_BATCH) {
        catalog.mutations().upsert_many(batch)?;
        pb.inc(batch.len() as u64);
    }
    pb.finish_and_clear();
    Ok(())
}

fn required<'a>(args: &'a [String], index: usize, what: &str) -> &'a str {
    match args.get(index) {
        Some(arg) => arg,
        None => { eprintln!("Missing {}\n\n{}", what, USAGE); std::process::exit(1) }
    }
}

fn parse_id(args: &[String]) -> anyhow::Result<u64> {
    Ok(required(args, 0, "<id>").parse()?)
}
