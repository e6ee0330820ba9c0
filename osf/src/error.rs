//! Error types for knowledge-base construction and the external adapters.
//!
//! Ordinary "no match" outcomes are never errors; they are reported as a
//! failed [`Unification`](crate::Unification) with degree `0.0`. The types
//! here cover malformed construction input only.

use thiserror::Error;

/// Rejected sort-lattice mutation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LatticeError {
    /// A sort name was empty.
    #[error("sort names must be non-empty")]
    EmptySortName,

    /// A similarity degree was NaN or outside `(0, 1]`.
    #[error("similarity degree {degree} between `{a}` and `{b}` is outside (0, 1]")]
    DegreeOutOfRange {
        /// First sort of the rejected edge.
        a: String,
        /// Second sort of the rejected edge.
        b: String,
        /// The offending degree.
        degree: f64,
    },
}

/// Rejected knowledge-base mutation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KnowledgeBaseError {
    /// An instance name was reused for a different term.
    #[error("instance `{0}` is already defined with a different term")]
    DuplicateInstance(String),

    /// An instance name was empty.
    #[error("instance names must be non-empty")]
    EmptyInstanceName,

    /// The underlying lattice rejected an edge or sort.
    #[error(transparent)]
    Lattice(#[from] LatticeError),
}

/// Failure of a [`SimilarityProvider`](crate::SimilarityProvider) call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    /// No embedding vector is known for the given description.
    #[error("no embedding for description `{0}`")]
    MissingEmbedding(String),

    /// Two embedding vectors have different lengths.
    #[error("embedding dimensions differ ({left} vs {right})")]
    DimensionMismatch {
        /// Length of the first vector.
        left: usize,
        /// Length of the second vector.
        right: usize,
    },

    /// A provider-specific failure, e.g. a model backend that is unavailable.
    #[error("similarity backend failed: {0}")]
    Backend(String),
}

/// Malformed OSF term in external input.
#[cfg(feature = "serde")]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TermError {
    /// The `sort` field was empty.
    #[error("term is missing a sort")]
    MissingSort,

    /// A term carried both a constant value and features.
    #[error("constant `{sort}` cannot carry features")]
    ConstantWithFeatures {
        /// Sort of the offending term.
        sort: String,
    },
}

/// Failure loading a knowledge-base document or query through the JSON adapter.
#[cfg(feature = "serde")]
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The input was not valid JSON for the expected shape.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A term inside the document was malformed.
    #[error(transparent)]
    Term(#[from] TermError),

    /// The document described an inconsistent knowledge base.
    #[error(transparent)]
    KnowledgeBase(#[from] KnowledgeBaseError),

    /// The document's similarity block was rejected by the lattice.
    #[error(transparent)]
    Lattice(#[from] LatticeError),
}
