//! Fuzzy matching over order-sorted feature (OSF) terms.
//!
//! The `fuzzy-osf` crate stores typed, feature-structured facts under a sort
//! hierarchy and answers queries with a *degree of match* in `[0, 1]`
//! instead of a yes/no answer. Crisp subsumption (`slasher ⊑ horror`) and
//! fuzzy similarity (`horror ~ thriller @ 0.6`) edges are closed into a dense
//! degree matrix once, after which every query is a read-only scan.
//!
//! # Entry Point
//!
//! ```
//! use fuzzy_osf::{KnowledgeBaseBuilder, MatchConfig, Term};
//!
//! let mut kb = KnowledgeBaseBuilder::new();
//! kb.add_subsumption("slasher", "horror")?;
//! kb.add_subsumption("horror", "movie")?;
//! kb.add_similarity("horror", "thriller", 0.6)?;
//! kb.add_instance("psycho", Term::node("slasher", [("title", "Psycho".into())]))?;
//! let kb = kb.freeze();
//!
//! let ranked = kb.query(&Term::sort("thriller"), &MatchConfig::default());
//! assert_eq!(ranked[0].name, "psycho");
//! assert!((ranked[0].degree - 0.6).abs() < 1e-9);
//! # Ok::<(), fuzzy_osf::KnowledgeBaseError>(())
//! ```
//!
//! # Layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`lattice`] | Sorts plus asserted subsumption / similarity edges |
//! | [`closure`] | Max-min transitive closure into a [`DegreeMatrix`] |
//! | [`term`] | The OSF term tree and its text rendering |
//! | [`unify`] | Fuzzy unification, root policies, t-norms |
//! | [`query`] | Threshold filter and degree-descending ranking |
//! | [`kb`] | Build-then-freeze knowledge base |
//! | [`similarity`] | Pluggable description-similarity providers |
//! | [`export`] | Node/edge projection of the lattice for visualization |
//! | [`serializer`] | JSON adapter for terms, documents, and results |

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod closure;
pub mod config;
pub mod error;
pub mod export;
pub mod kb;
pub mod lattice;
pub mod query;
#[cfg(feature = "serde")]
pub mod serializer;
pub mod similarity;
pub mod term;
pub mod unify;

pub use closure::{compute_closure, DegreeFn, DegreeMatrix};
pub use config::MatchConfig;
pub use error::{KnowledgeBaseError, LatticeError, ProviderError};
#[cfg(feature = "serde")]
pub use error::{DocumentError, TermError};
pub use export::{export_graph, EdgeKind, GraphData, GraphEdge, GraphNode};
pub use kb::{KnowledgeBase, KnowledgeBaseBuilder};
pub use lattice::SortLattice;
pub use query::{run_query, run_query_with, QueryMatch};
#[cfg(feature = "serde")]
pub use serializer::json::{parse_term, KnowledgeBaseDocument};
pub use similarity::{
    derive_similarities, CosineEmbeddings, DerivationOutcome, LexicalOverlap, SimilarityProvider,
};
pub use term::{Scalar, Term, Value};
pub use unify::{unify, Aggregator, RootPolicy, TNorm, Unification, Unifier};
