//! Build-then-freeze knowledge base.
//!
//! [`KnowledgeBaseBuilder`] collects sorts, edges, and named instance terms.
//! [`KnowledgeBaseBuilder::freeze`] consumes it, computes the closed
//! [`DegreeMatrix`] once, and returns an immutable [`KnowledgeBase`]. No
//! mutation is possible after freezing, so a frozen knowledge base can be
//! shared across threads and queried concurrently without locks.

use std::collections::HashMap;

use crate::closure::{compute_closure, DegreeFn, DegreeMatrix};
use crate::config::MatchConfig;
use crate::error::KnowledgeBaseError;
use crate::export::{export_graph, GraphData};
use crate::lattice::SortLattice;
use crate::query::{run_query_with, QueryMatch};
use crate::term::Term;
use crate::unify::{Unification, Unifier};

/// Mutable construction phase of a knowledge base.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBaseBuilder {
    lattice: SortLattice,
    instances: Vec<(String, Term)>,
    names: HashMap<String, usize>,
}

impl KnowledgeBaseBuilder {
    /// An empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder over an existing lattice.
    #[must_use]
    pub fn from_lattice(lattice: SortLattice) -> Self {
        Self {
            lattice,
            ..Self::default()
        }
    }

    /// The lattice being built.
    #[must_use]
    pub fn lattice(&self) -> &SortLattice {
        &self.lattice
    }

    /// Mutable access to the lattice, e.g. for
    /// [`derive_similarities`](crate::derive_similarities).
    pub fn lattice_mut(&mut self) -> &mut SortLattice {
        &mut self.lattice
    }

    /// Registers a sort.
    ///
    /// # Errors
    ///
    /// Returns [`KnowledgeBaseError::Lattice`] if the name is empty.
    pub fn add_sort(&mut self, name: &str) -> Result<(), KnowledgeBaseError> {
        self.lattice.add_sort(name)?;
        Ok(())
    }

    /// Asserts `a ⊑ b`.
    ///
    /// # Errors
    ///
    /// Returns [`KnowledgeBaseError::Lattice`] if either name is empty.
    pub fn add_subsumption(&mut self, a: &str, b: &str) -> Result<(), KnowledgeBaseError> {
        Ok(self.lattice.add_subsumption(a, b)?)
    }

    /// Asserts `a ~ b` with `degree`.
    ///
    /// # Errors
    ///
    /// Returns [`KnowledgeBaseError::Lattice`] if the degree is outside
    /// `(0, 1]` or either name is empty.
    pub fn add_similarity(
        &mut self,
        a: &str,
        b: &str,
        degree: f64,
    ) -> Result<(), KnowledgeBaseError> {
        Ok(self.lattice.add_similarity(a, b, degree)?)
    }

    /// Adds a named instance. Adding the same name with an equal term again
    /// is a no-op.
    ///
    /// Instance sorts need not be in the lattice; an unknown sort simply
    /// never matches.
    ///
    /// # Errors
    ///
    /// Returns [`KnowledgeBaseError::DuplicateInstance`] if `name` is already
    /// bound to a different term, and [`KnowledgeBaseError::EmptyInstanceName`]
    /// if `name` is empty.
    pub fn add_instance(&mut self, name: &str, term: Term) -> Result<(), KnowledgeBaseError> {
        if name.is_empty() {
            return Err(KnowledgeBaseError::EmptyInstanceName);
        }
        if let Some(&i) = self.names.get(name) {
            return if self.instances[i].1 == term {
                Ok(())
            } else {
                Err(KnowledgeBaseError::DuplicateInstance(name.to_owned()))
            };
        }
        self.names.insert(name.to_owned(), self.instances.len());
        self.instances.push((name.to_owned(), term));
        Ok(())
    }

    /// Ends construction: closes the lattice and returns the read-only
    /// knowledge base.
    #[must_use]
    pub fn freeze(self) -> KnowledgeBase {
        let degrees = compute_closure(&self.lattice);
        let unsorted = self
            .instances
            .iter()
            .filter(|(_, t)| !self.lattice.contains(t.sort_name()))
            .count();
        tracing::debug!(
            sorts = self.lattice.len(),
            instances = self.instances.len(),
            unsorted,
            "knowledge base frozen"
        );
        KnowledgeBase {
            lattice: self.lattice,
            degrees,
            instances: self.instances,
            names: self.names,
        }
    }
}

/// Immutable knowledge base: lattice, closed degrees, and named instances.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    lattice: SortLattice,
    degrees: DegreeMatrix,
    instances: Vec<(String, Term)>,
    names: HashMap<String, usize>,
}

impl KnowledgeBase {
    /// The frozen lattice.
    #[must_use]
    pub fn lattice(&self) -> &SortLattice {
        &self.lattice
    }

    /// The closed degree matrix.
    #[must_use]
    pub fn degrees(&self) -> &DegreeMatrix {
        &self.degrees
    }

    /// Closed degree from sort `a` to sort `b`; `0.0` for unknown sorts.
    #[must_use]
    pub fn degree(&self, a: &str, b: &str) -> f64 {
        self.degrees.degree(a, b)
    }

    /// Number of instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Returns true if the knowledge base holds no instances.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Looks up an instance by name.
    #[must_use]
    pub fn instance(&self, name: &str) -> Option<&Term> {
        self.names.get(name).map(|&i| &self.instances[i].1)
    }

    /// All instances in insertion order.
    pub fn instances(&self) -> impl Iterator<Item = (&str, &Term)> + '_ {
        self.instances.iter().map(|(n, t)| (n.as_str(), t))
    }

    pub(crate) fn entries(&self) -> &[(String, Term)] {
        &self.instances
    }

    /// Unifies `query` with the instance `name` under `config`. An unknown
    /// instance name yields the failure value.
    #[must_use]
    pub fn unify_with(&self, query: &Term, name: &str, config: &MatchConfig) -> Unification {
        match self.instance(name) {
            Some(instance) => Unifier::new(&self.degrees, &config.tnorm)
                .with_policy(config.root_policy)
                .unify(query, instance),
            None => Unification::failed(),
        }
    }

    /// Ranks all instances against `query` under `config`.
    #[must_use]
    pub fn query(&self, query: &Term, config: &MatchConfig) -> Vec<QueryMatch> {
        let unifier = Unifier::new(&self.degrees, &config.tnorm).with_policy(config.root_policy);
        run_query_with(self, query, &unifier, config.threshold)
    }

    /// Node/edge projection of the lattice, omitting edges below `threshold`.
    #[must_use]
    pub fn export_graph(&self, threshold: f64) -> GraphData {
        export_graph(&self.lattice, threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_instances_are_idempotent() {
        let mut b = KnowledgeBaseBuilder::new();
        let t = Term::node("thriller", [("title", "Memento".into())]);
        b.add_instance("memento", t.clone()).unwrap();
        b.add_instance("memento", t).unwrap();
        assert_eq!(b.freeze().len(), 1);
    }

    #[test]
    fn conflicting_instances_are_rejected() {
        let mut b = KnowledgeBaseBuilder::new();
        b.add_instance("memento", Term::sort("thriller")).unwrap();
        assert_eq!(
            b.add_instance("memento", Term::sort("horror")),
            Err(KnowledgeBaseError::DuplicateInstance("memento".into()))
        );
        assert_eq!(
            b.add_instance("", Term::sort("horror")),
            Err(KnowledgeBaseError::EmptyInstanceName)
        );
    }

    #[test]
    fn lattice_errors_convert() {
        let mut b = KnowledgeBaseBuilder::new();
        assert!(matches!(
            b.add_similarity("a", "b", 2.0),
            Err(KnowledgeBaseError::Lattice(_))
        ));
    }

    #[test]
    fn frozen_base_exposes_closed_degrees() {
        let mut b = KnowledgeBaseBuilder::new();
        b.add_subsumption("dog", "mammal").unwrap();
        b.add_subsumption("mammal", "animal").unwrap();
        b.add_instance("rex", Term::sort("dog")).unwrap();
        let kb = b.freeze();
        assert_eq!(kb.degree("dog", "animal"), 1.0);
        assert_eq!(kb.degree("animal", "dog"), 0.0);
        assert_eq!(kb.instance("rex"), Some(&Term::sort("dog")));
        assert!(kb.instance("fido").is_none());
        assert_eq!(kb.instances().map(|(n, _)| n).collect::<Vec<_>>(), ["rex"]);
    }

    #[test]
    fn unify_with_uses_the_configured_policy() {
        let mut b = KnowledgeBaseBuilder::new();
        b.add_subsumption("dog", "animal").unwrap();
        b.add_instance("rex", Term::sort("dog")).unwrap();
        let kb = b.freeze();
        let q = Term::sort("animal");
        assert_eq!(kb.unify_with(&q, "rex", &MatchConfig::default()).degree, 1.0);
        let directional = MatchConfig::default()
            .with_root_policy(crate::unify::RootPolicy::QueryToInstance);
        assert!(!kb.unify_with(&q, "rex", &directional).is_match());
        assert!(!kb.unify_with(&q, "fido", &MatchConfig::default()).is_match());
    }

    #[test]
    fn builder_extends_an_existing_lattice() {
        let mut lattice = SortLattice::new();
        lattice.add_subsumption("dog", "mammal").unwrap();
        let mut b = KnowledgeBaseBuilder::from_lattice(lattice);
        assert!(b.lattice().contains("dog"));
        b.add_subsumption("mammal", "animal").unwrap();
        b.add_instance("rex", Term::sort("dog")).unwrap();
        let kb = b.freeze();
        assert_eq!(kb.lattice().sorts(), &["dog", "mammal", "animal"]);
        assert_eq!(kb.degree("dog", "animal"), 1.0);
        assert_eq!(kb.query(&Term::sort("animal"), &MatchConfig::default()).len(), 1);
    }

    #[test]
    fn frozen_base_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<KnowledgeBase>();
    }
}
