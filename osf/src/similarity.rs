//! Similarity derived from natural-language sort descriptions.
//!
//! The closure engine only needs a degree per sort pair; where that number
//! comes from is pluggable through [`SimilarityProvider`]. Two providers ship
//! with the crate:
//!
//! - [`CosineEmbeddings`] consumes vectors precomputed by an external
//!   text-embedding model and scores pairs by cosine similarity.
//! - [`LexicalOverlap`] is an offline fallback scoring pairs by the Jaccard
//!   overlap of their content words.
//!
//! [`derive_similarities`] calls the provider once per unordered pair of
//! described sorts, as a single batch during construction. A provider error
//! discards the whole batch; the lattice is then frozen with its explicitly
//! asserted edges only, and the query path never sees the failure.

use std::collections::{BTreeSet, HashMap};

use crate::error::{LatticeError, ProviderError};
use crate::lattice::SortLattice;

/// Scores how alike two sort descriptions are.
pub trait SimilarityProvider {
    /// Degree in `[0, 1]`; values outside are clamped by the caller.
    ///
    /// # Errors
    ///
    /// Returns a [`ProviderError`] when the backend cannot score the pair.
    fn similarity(&self, a: &str, b: &str) -> Result<f64, ProviderError>;
}

/// Cosine similarity over precomputed description embeddings.
#[derive(Debug, Clone, Default)]
pub struct CosineEmbeddings {
    vectors: HashMap<String, Vec<f64>>,
}

impl CosineEmbeddings {
    /// An empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the embedding of `description`.
    pub fn insert(&mut self, description: impl Into<String>, vector: Vec<f64>) {
        self.vectors.insert(description.into(), vector);
    }

    fn vector(&self, description: &str) -> Result<&[f64], ProviderError> {
        self.vectors
            .get(description)
            .map(Vec::as_slice)
            .ok_or_else(|| ProviderError::MissingEmbedding(description.to_owned()))
    }
}

impl FromIterator<(String, Vec<f64>)> for CosineEmbeddings {
    fn from_iter<I: IntoIterator<Item = (String, Vec<f64>)>>(iter: I) -> Self {
        Self {
            vectors: iter.into_iter().collect(),
        }
    }
}

impl SimilarityProvider for CosineEmbeddings {
    fn similarity(&self, a: &str, b: &str) -> Result<f64, ProviderError> {
        let (u, v) = (self.vector(a)?, self.vector(b)?);
        if u.len() != v.len() {
            return Err(ProviderError::DimensionMismatch {
                left: u.len(),
                right: v.len(),
            });
        }
        let dot: f64 = u.iter().zip(v).map(|(x, y)| x * y).sum();
        let norm = |w: &[f64]| w.iter().map(|x| x * x).sum::<f64>().sqrt();
        let denom = norm(u) * norm(v);
        if denom == 0.0 {
            return Ok(0.0);
        }
        Ok((dot / denom).clamp(0.0, 1.0))
    }
}

/// Jaccard overlap of lowercase content words.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalOverlap;

const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "as", "at", "by", "for", "from", "in", "intended", "is", "of", "on", "or",
    "the", "to", "who", "whose", "with",
];

impl LexicalOverlap {
    fn words(text: &str) -> BTreeSet<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_lowercase)
            .filter(|w| !STOP_WORDS.contains(&w.as_str()))
            .collect()
    }
}

impl SimilarityProvider for LexicalOverlap {
    fn similarity(&self, a: &str, b: &str) -> Result<f64, ProviderError> {
        let (wa, wb) = (Self::words(a), Self::words(b));
        let union = wa.union(&wb).count();
        if union == 0 {
            return Ok(0.0);
        }
        let shared = wa.intersection(&wb).count();
        Ok(shared as f64 / union as f64)
    }
}

/// Result of a [`derive_similarities`] batch.
#[derive(Debug, Clone, PartialEq)]
pub enum DerivationOutcome {
    /// The batch succeeded; `edges` similarity assertions were added.
    Derived {
        /// Number of undirected similarity edges added.
        edges: usize,
    },
    /// The provider failed; no edges were added.
    Fallback {
        /// The provider's error.
        error: ProviderError,
    },
}

/// Scores every unordered pair of described sorts in `lattice` with
/// `provider` and asserts a similarity edge for each score `≥ min_degree`.
///
/// Scores are clamped to `[0, 1]`; zero and NaN scores never become edges.
/// The provider is called for every pair before anything is added, so a
/// failure leaves the lattice untouched.
///
/// # Errors
///
/// Provider failures are reported through [`DerivationOutcome::Fallback`],
/// not as an error. The `Err` case is a lattice rejection, which cannot
/// happen for clamped non-zero degrees and is propagated for completeness.
pub fn derive_similarities<P>(
    lattice: &mut SortLattice,
    provider: &P,
    min_degree: f64,
) -> Result<DerivationOutcome, LatticeError>
where
    P: SimilarityProvider + ?Sized,
{
    let described: Vec<(String, String)> = lattice
        .described_sorts()
        .map(|(s, d)| (s.to_owned(), d.to_owned()))
        .collect();

    let mut scored = Vec::new();
    for (i, (sa, da)) in described.iter().enumerate() {
        for (sb, db) in &described[i + 1..] {
            match provider.similarity(da, db) {
                Ok(d) => scored.push((sa, sb, d)),
                Err(error) => {
                    tracing::warn!(%error, a = %sa, b = %sb, "similarity provider failed, keeping asserted edges only");
                    return Ok(DerivationOutcome::Fallback { error });
                }
            }
        }
    }

    let mut edges = 0;
    for (a, b, d) in scored {
        if d.is_nan() {
            continue;
        }
        let d = d.clamp(0.0, 1.0);
        if d > 0.0 && d >= min_degree {
            lattice.add_similarity(a, b, d)?;
            edges += 1;
        }
    }
    tracing::debug!(sorts = described.len(), edges, min_degree, "derived similarities");
    Ok(DerivationOutcome::Derived { edges })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    impl SimilarityProvider for Failing {
        fn similarity(&self, _: &str, _: &str) -> Result<f64, ProviderError> {
            Err(ProviderError::Backend("model offline".into()))
        }
    }

    fn described() -> SortLattice {
        let mut l = SortLattice::new();
        l.add_sort_with_description("horror", "A film genre intended to frighten or shock the audience.")
            .unwrap();
        l.add_sort_with_description("thriller", "A movie genre focusing on tension and excitement.")
            .unwrap();
        l.add_sort_with_description("teacher", "A person whose job is to teach students.")
            .unwrap();
        l
    }

    #[test]
    fn cosine_of_parallel_and_orthogonal_vectors() {
        let mut e = CosineEmbeddings::new();
        e.insert("x", vec![1.0, 0.0]);
        e.insert("2x", vec![2.0, 0.0]);
        e.insert("y", vec![0.0, 3.0]);
        e.insert("-x", vec![-1.0, 0.0]);
        assert!((e.similarity("x", "2x").unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(e.similarity("x", "y").unwrap(), 0.0);
        assert_eq!(e.similarity("x", "-x").unwrap(), 0.0);
    }

    #[test]
    fn cosine_reports_missing_and_mismatched_vectors() {
        let e: CosineEmbeddings = [("a".to_owned(), vec![1.0]), ("b".to_owned(), vec![1.0, 2.0])]
            .into_iter()
            .collect();
        assert_eq!(
            e.similarity("a", "zzz"),
            Err(ProviderError::MissingEmbedding("zzz".into()))
        );
        assert_eq!(
            e.similarity("a", "b"),
            Err(ProviderError::DimensionMismatch { left: 1, right: 2 })
        );
    }

    #[test]
    fn lexical_overlap_is_jaccard_over_content_words() {
        let p = LexicalOverlap;
        assert_eq!(p.similarity("A horror film", "the horror film").unwrap(), 1.0);
        assert_eq!(p.similarity("horror film", "horror movie").unwrap(), 1.0 / 3.0);
        assert_eq!(p.similarity("", "").unwrap(), 0.0);
    }

    #[test]
    fn derivation_adds_edges_above_min_degree() {
        let mut l = described();
        let outcome = derive_similarities(&mut l, &LexicalOverlap, 0.1).unwrap();
        // horror and thriller share "genre"; teacher shares nothing.
        assert_eq!(outcome, DerivationOutcome::Derived { edges: 1 });
        assert!(l.asserted_degree("horror", "thriller") > 0.0);
        assert_eq!(l.asserted_degree("horror", "teacher"), 0.0);
    }

    #[test]
    fn provider_failure_leaves_lattice_untouched() {
        let mut l = described();
        let outcome = derive_similarities(&mut l, &Failing, 0.0).unwrap();
        assert!(matches!(outcome, DerivationOutcome::Fallback { .. }));
        assert_eq!(l.similarities().count(), 0);
    }
}
