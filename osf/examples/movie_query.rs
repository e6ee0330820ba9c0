//! Loads a small movie knowledge base from JSON and ranks it against a few
//! queries under each root policy.
//!
//! Run with: `cargo run --example movie_query -p fuzzy-osf`

use fuzzy_osf::{parse_term, KnowledgeBaseDocument, RootPolicy};

const DOCUMENT: &str = r#"{
    "sorts": [
        {"name": "movie", "description": "A form of visual storytelling intended for entertainment."},
        {"name": "horror", "description": "A film genre intended to frighten or shock the audience."},
        {"name": "thriller", "description": "A movie genre focusing on tension, uncertainty, and excitement."}
    ],
    "subsumptions": [
        {"sub": "slasher", "sup": "horror"},
        {"sub": "horror", "sup": "movie"},
        {"sub": "thriller", "sup": "movie"}
    ],
    "similarities": [
        {"a": "horror", "b": "thriller", "degree": 0.6}
    ],
    "instances": [
        {"name": "memento", "term": {"sort": "thriller", "features": {"title": "Memento"}}},
        {"name": "psycho", "term": {"sort": "slasher", "features": {"title": "Psycho"}}},
        {"name": "halloween", "term": {"sort": "thriller", "features": {"title": "Halloween", "year": 1979}}}
    ],
    "config": {"threshold": 0.1}
}"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let doc = KnowledgeBaseDocument::from_json(DOCUMENT)?;
    let (kb, config) = doc.build()?;

    println!("Sorts: {}", kb.lattice().sorts().join(", "));
    println!("Instances: {}", kb.len());
    println!();

    let queries = [
        r#"{"sort": "thriller"}"#,
        r#"{"sort": "horror", "features": {"title": "Psycho"}}"#,
        r#"{"sort": "movie", "features": {"year": 1979}}"#,
    ];

    for text in queries {
        let query = parse_term(text)?;
        for policy in [RootPolicy::SymmetricMax, RootPolicy::QueryToInstance] {
            let results = kb.query(&query, &config.with_root_policy(policy));
            println!("{query}  [{policy}]");
            if results.is_empty() {
                println!("  (no matches)");
            }
            for m in &results {
                println!("  {:<10} {:.2}  {}", m.name, m.degree, m.term);
            }
        }
        println!();
    }

    let graph = kb.export_graph(0.0);
    println!("Graph JSON ({} nodes, {} edges):", graph.nodes.len(), graph.edges.len());
    println!("{}", serde_json::to_string_pretty(&graph)?);
    Ok(())
}
