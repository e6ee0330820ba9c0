//! Sort lattice: the vertex set of sorts and the asserted edges between them.
//!
//! The lattice is a plain data holder. It records two kinds of weighted edges:
//!
//! - **Subsumption** `a ⊑ b`: crisp, directed, degree `1.0` from `a` to `b`.
//! - **Similarity** `a ~ b @ d`: fuzzy and symmetric; stored as the two
//!   directed entries `(a, b)` and `(b, a)`.
//!
//! Repeated assertions for the same ordered pair merge by maximum, so every
//! mutator is idempotent and conflicting degrees never raise an error.
//! Sorts are enumerated in first-mention order; that enumeration is the
//! stable index used by [`compute_closure`](crate::compute_closure).

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::LatticeError;

/// Sorts and their asserted subsumption / similarity edges.
#[derive(Debug, Clone, Default)]
pub struct SortLattice {
    sorts: Vec<String>,
    index: HashMap<String, usize>,
    descriptions: Vec<Option<String>>,
    subsumptions: BTreeSet<(usize, usize)>,
    similarities: BTreeMap<(usize, usize), f64>,
}

impl SortLattice {
    /// Creates an empty lattice.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a sort and returns its index. Re-adding a known sort is a
    /// no-op that returns the existing index.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::EmptySortName`] if `name` is empty.
    pub fn add_sort(&mut self, name: &str) -> Result<usize, LatticeError> {
        if name.is_empty() {
            return Err(LatticeError::EmptySortName);
        }
        if let Some(&i) = self.index.get(name) {
            return Ok(i);
        }
        let i = self.sorts.len();
        self.sorts.push(name.to_owned());
        self.index.insert(name.to_owned(), i);
        self.descriptions.push(None);
        Ok(i)
    }

    /// Registers a sort together with a natural-language description, used
    /// by [`derive_similarities`](crate::derive_similarities). A later
    /// description replaces an earlier one.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::EmptySortName`] if `name` is empty.
    pub fn add_sort_with_description(
        &mut self,
        name: &str,
        description: &str,
    ) -> Result<usize, LatticeError> {
        let i = self.add_sort(name)?;
        self.descriptions[i] = Some(description.to_owned());
        Ok(i)
    }

    /// Asserts `a ⊑ b`. Both sorts are registered if unknown.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::EmptySortName`] if either name is empty.
    pub fn add_subsumption(&mut self, a: &str, b: &str) -> Result<(), LatticeError> {
        if a.is_empty() || b.is_empty() {
            return Err(LatticeError::EmptySortName);
        }
        let i = self.add_sort(a)?;
        let j = self.add_sort(b)?;
        self.subsumptions.insert((i, j));
        Ok(())
    }

    /// Asserts the symmetric similarity `a ~ b` with `degree`. Each direction
    /// keeps the maximum of all degrees asserted for it.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::DegreeOutOfRange`] if `degree` is NaN or not in
    /// `(0, 1]`, and [`LatticeError::EmptySortName`] if either name is empty.
    pub fn add_similarity(&mut self, a: &str, b: &str, degree: f64) -> Result<(), LatticeError> {
        if !(degree > 0.0 && degree <= 1.0) {
            return Err(LatticeError::DegreeOutOfRange {
                a: a.to_owned(),
                b: b.to_owned(),
                degree,
            });
        }
        if a.is_empty() || b.is_empty() {
            return Err(LatticeError::EmptySortName);
        }
        let i = self.add_sort(a)?;
        let j = self.add_sort(b)?;
        for key in [(i, j), (j, i)] {
            let slot = self.similarities.entry(key).or_insert(0.0);
            *slot = slot.max(degree);
        }
        Ok(())
    }

    /// Number of sorts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sorts.len()
    }

    /// Returns true if no sort has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sorts.is_empty()
    }

    /// All sorts in index order.
    #[must_use]
    pub fn sorts(&self) -> &[String] {
        &self.sorts
    }

    /// Returns true if `sort` is registered.
    #[must_use]
    pub fn contains(&self, sort: &str) -> bool {
        self.index.contains_key(sort)
    }

    /// Dense index of `sort`, or `None` if it is unknown.
    #[must_use]
    pub fn index_of(&self, sort: &str) -> Option<usize> {
        self.index.get(sort).copied()
    }

    /// Description attached to `sort`, if any.
    #[must_use]
    pub fn description(&self, sort: &str) -> Option<&str> {
        self.index_of(sort)
            .and_then(|i| self.descriptions[i].as_deref())
    }

    /// Sorts that carry a description, in index order.
    pub fn described_sorts(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.sorts
            .iter()
            .zip(&self.descriptions)
            .filter_map(|(s, d)| d.as_deref().map(|d| (s.as_str(), d)))
    }

    /// Asserted subsumption edges `(sub, sup)` ordered by sort index.
    pub fn subsumptions(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.subsumptions
            .iter()
            .map(|&(i, j)| (self.sorts[i].as_str(), self.sorts[j].as_str()))
    }

    /// Directed similarity entries `(a, b, degree)` ordered by sort index.
    /// Every undirected assertion appears once per direction.
    pub fn similarities(&self) -> impl Iterator<Item = (&str, &str, f64)> + '_ {
        self.similarities
            .iter()
            .map(|(&(i, j), &d)| (self.sorts[i].as_str(), self.sorts[j].as_str(), d))
    }

    /// Asserted degree from `a` to `b` before closure: `1.0` on the diagonal
    /// and for subsumption, the similarity degree otherwise, max-combined
    /// when both exist. Unknown sorts yield `0.0`.
    #[must_use]
    pub fn asserted_degree(&self, a: &str, b: &str) -> f64 {
        match (self.index_of(a), self.index_of(b)) {
            (Some(i), Some(j)) => self.asserted_by_index(i, j),
            _ => 0.0,
        }
    }

    pub(crate) fn asserted_by_index(&self, i: usize, j: usize) -> f64 {
        if i == j || self.subsumptions.contains(&(i, j)) {
            return 1.0;
        }
        self.similarities.get(&(i, j)).copied().unwrap_or(0.0)
    }

    /// Index pairs with a non-zero off-diagonal asserted degree.
    pub(crate) fn asserted_pairs(&self) -> impl Iterator<Item = ((usize, usize), f64)> + '_ {
        let crisp = self.subsumptions.iter().map(|&k| (k, 1.0));
        let fuzzy = self.similarities.iter().map(|(&k, &d)| (k, d));
        crisp.chain(fuzzy).filter(|((i, j), _)| i != j)
    }

    pub(crate) fn subsumption_indices(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.subsumptions.iter().copied()
    }
}
