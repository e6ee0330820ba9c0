//! `osf-graph` — Projects a knowledge-base document's sort lattice into a
//! node/edge graph for visualization.
//!
//! **Outputs:**
//! - `{"nodes": [{id, group}], "edges": [{source, target, kind, weight}]}`
//!   on stdout, or in `<out>` when given.
//!
//! **Usage:**
//! ```
//! osf-graph --kb <file> [--embeddings <file>] [--threshold <t>] [--out <path>]
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use fuzzy_osf::{EdgeKind, KnowledgeBaseDocument};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Export the sort lattice of a knowledge base as graph JSON.
#[derive(Parser)]
#[command(name = "osf-graph", about = "Export a sort lattice as graph JSON")]
struct Args {
    /// Knowledge-base document (JSON).
    #[arg(long)]
    kb: PathBuf,

    /// Description embeddings as a JSON object `{description: [f64]}`,
    /// used when the document asks for derived similarities.
    #[arg(long)]
    embeddings: Option<PathBuf>,

    /// Similarity edges below this degree are left out.
    #[arg(long, default_value_t = 0.0)]
    threshold: f64,

    /// Output file. Defaults to stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let text = fs::read_to_string(&args.kb)
        .with_context(|| format!("Failed to read {}", args.kb.display()))?;
    let mut doc = KnowledgeBaseDocument::from_json(&text)
        .with_context(|| format!("Failed to parse {}", args.kb.display()))?;
    if let Some(path) = &args.embeddings {
        let vectors_text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let vectors: BTreeMap<String, Vec<f64>> = serde_json::from_str(&vectors_text)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        doc.embeddings.extend(vectors);
    }
    let (kb, _) = doc
        .build()
        .with_context(|| format!("Invalid knowledge base in {}", args.kb.display()))?;

    let graph = kb.export_graph(args.threshold);
    let similarities = graph
        .edges
        .iter()
        .filter(|e| e.kind == EdgeKind::Similarity)
        .count();
    tracing::info!(
        nodes = graph.nodes.len(),
        subsumptions = graph.edges.len() - similarities,
        similarities,
        "exported lattice"
    );

    let json = serde_json::to_string_pretty(&graph).context("Failed to serialize graph")?;
    match &args.out {
        Some(path) => {
            fs::write(path, &json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("  Written: {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
