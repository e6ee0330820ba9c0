//! JSON adapter.
//!
//! Terms use the shape `{"sort", "features", "const_value"}`. A feature
//! value is either a JSON scalar (string, integer, float, boolean) or a
//! nested term object; `null` feature values are dropped. A term with a
//! non-null `const_value` is a constant leaf and must not carry features.
//!
//! A knowledge-base document bundles the lattice, the instances, an optional
//! similarity-derivation block with optional description embeddings, and an
//! optional [`MatchConfig`]:
//!
//! ```json
//! {
//!   "sorts": [{ "name": "horror", "description": "A frightening film." }],
//!   "subsumptions": [{ "sub": "slasher", "sup": "horror" }],
//!   "similarities": [{ "a": "horror", "b": "thriller", "degree": 0.6 }],
//!   "instances": [{ "name": "psycho", "term": { "sort": "slasher" } }],
//!   "derive": { "min_degree": 0.2 },
//!   "embeddings": { "A frightening film.": [0.12, 0.98] },
//!   "config": { "threshold": 0.1 }
//! }
//! ```
//!
//! [`KnowledgeBaseDocument::build`] derives through [`CosineEmbeddings`] when
//! the document carries embeddings and through [`LexicalOverlap`] otherwise.

use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::config::MatchConfig;
use crate::error::{DocumentError, TermError};
use crate::kb::{KnowledgeBase, KnowledgeBaseBuilder};
use crate::lattice::SortLattice;
use crate::query::QueryMatch;
use crate::similarity::{
    derive_similarities, CosineEmbeddings, DerivationOutcome, LexicalOverlap, SimilarityProvider,
};
use crate::term::{Scalar, Term, Value};

/// Wire form of a [`Term`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermRepr {
    /// The term's sort.
    pub sort: String,
    /// Feature name → value; `null` values are ignored.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub features: BTreeMap<String, Option<Value>>,
    /// Constant value, for constant leaves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub const_value: Option<Scalar>,
}

impl TryFrom<TermRepr> for Term {
    type Error = TermError;

    fn try_from(repr: TermRepr) -> Result<Self, Self::Error> {
        if repr.sort.is_empty() {
            return Err(TermError::MissingSort);
        }
        let features: BTreeMap<String, Value> = repr
            .features
            .into_iter()
            .filter_map(|(k, v)| v.map(|v| (k, v)))
            .collect();
        match repr.const_value {
            Some(_) if !features.is_empty() => {
                Err(TermError::ConstantWithFeatures { sort: repr.sort })
            }
            Some(value) => Ok(Term::Constant {
                sort: repr.sort,
                value,
            }),
            None => Ok(Term::Node {
                sort: repr.sort,
                features,
            }),
        }
    }
}

impl From<Term> for TermRepr {
    fn from(term: Term) -> Self {
        match term {
            Term::Node { sort, features } => TermRepr {
                sort,
                features: features.into_iter().map(|(k, v)| (k, Some(v))).collect(),
                const_value: None,
            },
            Term::Constant { sort, value } => TermRepr {
                sort,
                features: BTreeMap::new(),
                const_value: Some(value),
            },
        }
    }
}

/// Objects are nested terms, everything else is a scalar.
impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        if raw.is_object() {
            Term::deserialize(raw)
                .map(Value::Term)
                .map_err(D::Error::custom)
        } else {
            Scalar::deserialize(raw)
                .map(Value::Scalar)
                .map_err(D::Error::custom)
        }
    }
}

/// Parses a single term.
///
/// # Errors
///
/// Returns [`DocumentError::Term`] when the top-level term is malformed, and
/// [`DocumentError::Json`] for malformed JSON or a malformed nested term.
pub fn parse_term(json: &str) -> Result<Term, DocumentError> {
    let repr: TermRepr = serde_json::from_str(json)?;
    Ok(Term::try_from(repr)?)
}

/// Results serialize as `{name, degree, unifier}` with the merged term
/// rendered as text.
impl Serialize for QueryMatch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("QueryMatch", 3)?;
        s.serialize_field("name", &self.name)?;
        s.serialize_field("degree", &self.degree)?;
        s.serialize_field("unifier", &self.term.to_string())?;
        s.end()
    }
}

/// A sort declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortDecl {
    /// Sort name.
    pub name: String,
    /// Natural-language description used for similarity derivation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A crisp `sub ⊑ sup` assertion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubsumptionDecl {
    /// The more specific sort.
    pub sub: String,
    /// The more general sort.
    pub sup: String,
}

/// A symmetric similarity assertion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityDecl {
    /// First sort.
    pub a: String,
    /// Second sort.
    pub b: String,
    /// Degree in `(0, 1]`.
    pub degree: f64,
}

/// A named instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceDecl {
    /// Instance name.
    pub name: String,
    /// Instance term.
    pub term: Term,
}

/// Settings for description-based similarity derivation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeriveDecl {
    /// Derived scores below this are discarded.
    #[serde(default = "default_min_degree")]
    pub min_degree: f64,
}

fn default_min_degree() -> f64 {
    0.1
}

/// A complete knowledge base as JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeBaseDocument {
    /// Sort declarations. Sorts mentioned only in edges are added implicitly.
    #[serde(default)]
    pub sorts: Vec<SortDecl>,
    /// Subsumption edges.
    #[serde(default)]
    pub subsumptions: Vec<SubsumptionDecl>,
    /// Similarity edges.
    #[serde(default)]
    pub similarities: Vec<SimilarityDecl>,
    /// Named instances in ranking tie-break order.
    #[serde(default)]
    pub instances: Vec<InstanceDecl>,
    /// When present, similarity is also derived from sort descriptions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derive: Option<DeriveDecl>,
    /// Description → embedding vector, produced by an external model.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub embeddings: BTreeMap<String, Vec<f64>>,
    /// Default match settings for this knowledge base.
    #[serde(default)]
    pub config: MatchConfig,
}

impl KnowledgeBaseDocument {
    /// Parses a document.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Json`] if the input is not a valid document.
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Replays the document into a builder. Similarity derivation, if
    /// requested, runs with `provider` after all explicit edges are added.
    /// The document's own `embeddings` block is ignored here; see
    /// [`KnowledgeBaseDocument::build`].
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Lattice`] for empty sort names or degrees
    /// outside `(0, 1]`, and [`DocumentError::KnowledgeBase`] for invalid or
    /// conflicting instances.
    pub fn into_builder<P>(self, provider: &P) -> Result<KnowledgeBaseBuilder, DocumentError>
    where
        P: SimilarityProvider + ?Sized,
    {
        let mut lattice = SortLattice::new();
        for sort in &self.sorts {
            match &sort.description {
                Some(d) => lattice.add_sort_with_description(&sort.name, d)?,
                None => lattice.add_sort(&sort.name)?,
            };
        }
        for edge in &self.subsumptions {
            lattice.add_subsumption(&edge.sub, &edge.sup)?;
        }
        for edge in &self.similarities {
            lattice.add_similarity(&edge.a, &edge.b, edge.degree)?;
        }
        if let Some(derive) = self.derive {
            if let DerivationOutcome::Fallback { error } =
                derive_similarities(&mut lattice, provider, derive.min_degree)?
            {
                tracing::warn!(%error, "derived similarities unavailable");
            }
        }

        let mut builder = KnowledgeBaseBuilder::from_lattice(lattice);
        for instance in self.instances {
            builder.add_instance(&instance.name, instance.term)?;
        }
        Ok(builder)
    }

    /// Builds and freezes the knowledge base, returning it with the
    /// document's match settings.
    ///
    /// # Errors
    ///
    /// See [`KnowledgeBaseDocument::into_builder`].
    pub fn into_knowledge_base<P>(
        self,
        provider: &P,
    ) -> Result<(KnowledgeBase, MatchConfig), DocumentError>
    where
        P: SimilarityProvider + ?Sized,
    {
        let config = self.config;
        Ok((self.into_builder(provider)?.freeze(), config))
    }

    /// Builds and freezes the knowledge base with the document's own
    /// provider: [`CosineEmbeddings`] over the `embeddings` block when it is
    /// present, [`LexicalOverlap`] otherwise.
    ///
    /// # Errors
    ///
    /// See [`KnowledgeBaseDocument::into_builder`].
    pub fn build(mut self) -> Result<(KnowledgeBase, MatchConfig), DocumentError> {
        let embeddings = std::mem::take(&mut self.embeddings);
        if embeddings.is_empty() {
            return self.into_knowledge_base(&LexicalOverlap);
        }
        tracing::debug!(vectors = embeddings.len(), "deriving through embeddings");
        let provider: CosineEmbeddings = embeddings.into_iter().collect();
        self.into_knowledge_base(&provider)
    }
}
