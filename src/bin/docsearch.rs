//! docsearch: index and search text documents under homomorphic encryption
//!
//! Keys and encrypted documents live in a local store directory. The first
//! command run against an empty store generates the key set.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};
use eyre::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use fhe_doc_search::scheme::keys::KEY_NAMES;
use fhe_doc_search::search::document::join_pages;
use fhe_doc_search::store::{DocumentCache, KeyStore, LocalFileStore};
use fhe_doc_search::{
    total_matches, DocumentSource, SchemeParams, SearchOptions, SearchSession, TextDocument,
};

#[derive(Parser)]
#[command(name = "docsearch")]
#[command(about = "Encrypted keyword search over text documents")]
#[command(version)]
struct Args {
    /// Store directory for keys and encrypted documents
    #[arg(long, default_value = "docsearch_data")]
    store: PathBuf,

    /// Parameter preset
    #[arg(long, value_enum, default_value_t = Preset::Bfv4096)]
    preset: Preset,

    /// JSON file with search options
    #[arg(long)]
    options: Option<PathBuf>,

    /// Print machine-readable JSON instead of text
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum Preset {
    Bfv4096,
    Bfv8192,
}

impl Preset {
    fn params(self) -> SchemeParams {
        match self {
            Preset::Bfv4096 => SchemeParams::bfv_4096(),
            Preset::Bfv8192 => SchemeParams::bfv_8192(),
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Encrypt a text file into the document cache
    Index {
        /// UTF-8 text file; form feeds separate pages
        file: PathBuf,
    },
    /// Search an indexed file
    Search {
        /// The file that was indexed
        file: PathBuf,
        /// Query words
        query: String,
    },
    /// Manage the key set
    Keys {
        #[command(subcommand)]
        command: KeysCommand,
    },
}

#[derive(Subcommand)]
enum KeysCommand {
    /// Generate a fresh key set; cached documents are discarded
    Reset,
    /// Show the stored key set
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();
    let options = load_options(args.options.as_deref()).await?;

    let store = LocalFileStore::new(&args.store)
        .await
        .with_context(|| format!("Failed to open store at {}", args.store.display()))?;

    info!("Store: {}", args.store.display());
    let start = Instant::now();
    let fresh = matches!(
        args.command,
        Command::Keys {
            command: KeysCommand::Reset
        }
    );
    let mut session = if fresh {
        SearchSession::open_fresh(args.preset.params(), store, options).await
    } else {
        SearchSession::open(args.preset.params(), store, options).await
    }
    .with_context(|| "Failed to initialize scheme context")?;
    info!("Context ready in {:.2?}", start.elapsed());

    match args.command {
        Command::Index { file } => index(&mut session, &file, args.json).await?,
        Command::Search { file, query } => search(&mut session, &file, &query, args.json).await?,
        Command::Keys { command } => match command {
            KeysCommand::Reset => {
                println!(
                    "New key id: {}",
                    hex::encode(session.context().key_id()?)
                );
            }
            KeysCommand::Info => key_info(&session, args.json).await?,
        },
    }

    session.close();
    Ok(())
}

async fn load_options(path: Option<&Path>) -> Result<SearchOptions> {
    match path {
        None => Ok(SearchOptions::default()),
        Some(path) => {
            let raw = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read options file {}", path.display()))?;
            serde_json::from_str(&raw).with_context(|| "Failed to parse search options")
        }
    }
}

fn progress_bar() -> Result<ProgressBar> {
    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

async fn index(session: &mut SearchSession<LocalFileStore>, file: &Path, json: bool) -> Result<()> {
    let doc = TextDocument::from_path(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    info!("Indexing {} ({} pages)", doc.name(), doc.page_count());

    let pb = progress_bar()?;
    let outcome = session
        .index_document(&doc, &mut |p| pb.set_position(p as u64))
        .await?;
    pb.finish_and_clear();

    let document = &outcome.document;
    if json {
        let report = serde_json::json!({
            "fingerprint": document.fingerprint,
            "from_cache": outcome.from_cache,
            "tokens": document.token_count,
            "batches": document.batch_count(),
            "metrics": session.metrics(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!();
        println!("=== Indexed ===");
        println!("Document: {}", doc.name());
        println!("Fingerprint: {}", document.fingerprint);
        println!("Tokens: {}", document.token_count);
        println!("Batches: {}", document.batch_count());
        if outcome.from_cache {
            println!("Served from cache");
        } else {
            println!("Encryption time: {:.1} ms", session.metrics().encryption_time_ms);
        }
    }
    Ok(())
}

async fn search(
    session: &mut SearchSession<LocalFileStore>,
    file: &Path,
    query: &str,
    json: bool,
) -> Result<()> {
    let doc = TextDocument::from_path(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let text = join_pages(&doc.extract_pages().await?);

    let pb = progress_bar()?;
    let results = session
        .search(&doc.fingerprint(), query, Some(&text), &mut |p| {
            pb.set_position(p as u64)
        })
        .await
        .with_context(|| format!("Search in {} failed (index it first?)", doc.name()))?;
    pb.finish_and_clear();

    if json {
        let report = serde_json::json!({
            "query": query,
            "total_matches": total_matches(&results),
            "results": results,
            "metrics": session.metrics(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    println!("=== Results for {:?} ===", query);
    for r in &results {
        println!(
            "[{}] batch {}: {} match(es) at {:?}",
            r.token, r.batch_index, r.match_count, r.positions
        );
        for s in &r.snippets {
            println!("    ... {} ...", s);
        }
    }
    println!("Total matches: {}", total_matches(&results));
    println!("Search time: {:.1} ms", session.metrics().search_time_ms);
    Ok(())
}

async fn key_info(session: &SearchSession<LocalFileStore>, json: bool) -> Result<()> {
    let ctx = session.context();
    let params = ctx.params()?;
    let stored = session.store().names().await?;
    let documents = session.store().fingerprints().await?;
    let key_id = hex::encode(ctx.key_id()?);

    if json {
        let report = serde_json::json!({
            "key_id": key_id,
            "ring_dim": params.ring_dim,
            "coeff_modulus_bits": params.coeff_modulus_bits(),
            "plain_modulus": params.t,
            "stored_keys": stored,
            "cached_documents": documents.len(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Key id: {}", key_id);
    println!("Ring dimension: {}", params.ring_dim);
    println!("Coefficient modulus: {} bits", params.coeff_modulus_bits());
    println!("Plain modulus: {}", params.t);
    for name in KEY_NAMES {
        let present = stored.iter().any(|s| s == name);
        println!("  {:<12} {}", name, if present { "present" } else { "missing" });
    }
    println!("Cached documents: {}", documents.len());
    Ok(())
}
