//! `osf-query` — Loads a knowledge-base document and ranks its instances
//! against a query term.
//!
//! The query is a JSON term (`{"sort", "features", "const_value"}`), given
//! inline or as `@path`. Match settings come from the document's `config`
//! block; any flag given on the command line overrides it. Similarity
//! derivation, when the document asks for it, scores sort descriptions by
//! cosine similarity of their embeddings (from the document's `embeddings`
//! block or `--embeddings`), falling back to lexical overlap when no
//! embeddings are given.
//!
//! **Usage:**
//! ```
//! osf-query --kb <file> --query <json|@file> [--embeddings <file>]
//!           [--threshold <t>] [--root-policy <p>] [--tnorm <n>] [--json]
//! ```
//!
//! Set `RUST_LOG=fuzzy_osf=debug` to trace closure and ranking.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use fuzzy_osf::{parse_term, KnowledgeBaseDocument, RootPolicy, TNorm};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Rank knowledge-base instances against a query term.
#[derive(Parser)]
#[command(name = "osf-query", about = "Rank knowledge-base instances against a query term")]
struct Args {
    /// Knowledge-base document (JSON).
    #[arg(long)]
    kb: PathBuf,

    /// Query term as JSON, or `@path` to read it from a file.
    #[arg(long)]
    query: String,

    /// Description embeddings as a JSON object `{description: [f64]}`.
    #[arg(long)]
    embeddings: Option<PathBuf>,

    /// Drop results below this degree.
    #[arg(long)]
    threshold: Option<f64>,

    /// `symmetric-max` or `query-to-instance`.
    #[arg(long)]
    root_policy: Option<RootPolicy>,

    /// `minimum`, `product` or `lukasiewicz`.
    #[arg(long)]
    tnorm: Option<TNorm>,

    /// Print results as a JSON array instead of a table.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let doc_text = read(&args.kb)?;
    let mut doc = KnowledgeBaseDocument::from_json(&doc_text)
        .with_context(|| format!("Failed to parse {}", args.kb.display()))?;
    if let Some(path) = &args.embeddings {
        let vectors: BTreeMap<String, Vec<f64>> = serde_json::from_str(&read(path)?)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        doc.embeddings.extend(vectors);
    }
    let (kb, mut config) = doc
        .build()
        .with_context(|| format!("Invalid knowledge base in {}", args.kb.display()))?;

    if let Some(threshold) = args.threshold {
        config.threshold = threshold;
    }
    if let Some(policy) = args.root_policy {
        config.root_policy = policy;
    }
    if let Some(tnorm) = args.tnorm {
        config.tnorm = tnorm;
    }

    let query_text = match args.query.strip_prefix('@') {
        Some(path) => read(Path::new(path))?,
        None => args.query.clone(),
    };
    let query = parse_term(&query_text).context("Failed to parse query term")?;
    tracing::info!(%query, sorts = kb.lattice().len(), instances = kb.len(), "running query");

    let results = kb.query(&query, &config);

    if args.json {
        let out = serde_json::to_string_pretty(&results).context("Failed to serialize results")?;
        println!("{out}");
        return Ok(());
    }

    println!(
        "{} of {} instances match {} (threshold {}, {}, {})",
        results.len(),
        kb.len(),
        query,
        config.threshold,
        config.root_policy,
        config.tnorm,
    );
    for m in &results {
        println!("  {:<20} {:>6.3}  {}", m.name, m.degree, m.term);
    }
    Ok(())
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}
