//! Fuzzy transitive closure of the sort lattice.
//!
//! [`compute_closure`] turns the asserted edges of a [`SortLattice`] into a
//! dense [`DegreeMatrix`]. The closure is the max-min analogue of
//! Floyd–Warshall: `min` combines the degrees along a path and `max` selects
//! the best path.
//!
//! ```text
//! for k in sorts:
//!     for (i, j) in sorts × sorts:
//!         M[i][j] = max(M[i][j], min(M[i][k], M[k][j]))
//! ```
//!
//! The result is deterministic, satisfies `M[a][c] ≥ min(M[a][b], M[b][c])`,
//! and is a fixed point of the closure step.

use std::collections::HashMap;

use crate::lattice::SortLattice;

/// Anything that can report the degree to which sort `a` matches sort `b`.
///
/// Implemented by [`DegreeMatrix`] and by plain closures, so unification can
/// be driven by a hand-written table in tests.
pub trait DegreeFn {
    /// Degree in `[0, 1]` from `a` to `b`. Unknown sorts yield `0.0`.
    fn degree(&self, a: &str, b: &str) -> f64;
}

impl<F> DegreeFn for F
where
    F: Fn(&str, &str) -> f64,
{
    fn degree(&self, a: &str, b: &str) -> f64 {
        self(a, b)
    }
}

/// Closed pairwise degree function over a frozen sort enumeration.
///
/// Stored row-major in a flat `Vec<f64>`; `M[i][i] = 1.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct DegreeMatrix {
    sorts: Vec<String>,
    index: HashMap<String, usize>,
    values: Vec<f64>,
}

impl DegreeMatrix {
    /// Number of sorts (the matrix is `len × len`).
    #[must_use]
    pub fn len(&self) -> usize {
        self.sorts.len()
    }

    /// Returns true for the matrix of an empty lattice.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sorts.is_empty()
    }

    /// The sort enumeration backing the matrix indices.
    #[must_use]
    pub fn sorts(&self) -> &[String] {
        &self.sorts
    }

    /// Index of `sort`, or `None` if the sort was not in the lattice.
    #[must_use]
    pub fn index_of(&self, sort: &str) -> Option<usize> {
        self.index.get(sort).copied()
    }

    /// Degree at `(i, j)`. Out-of-range indices yield `0.0`.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        let n = self.len();
        if i >= n || j >= n {
            return 0.0;
        }
        self.values[i * n + j]
    }

    /// Row `i`: the degrees from sort `i` to every sort.
    #[must_use]
    pub fn row(&self, i: usize) -> Option<&[f64]> {
        let n = self.len();
        (i < n).then(|| &self.values[i * n..(i + 1) * n])
    }

    /// Applies the closure step once more to an already-built matrix.
    ///
    /// On a matrix produced by [`compute_closure`] this returns an identical
    /// matrix.
    #[must_use]
    pub fn reclose(&self) -> DegreeMatrix {
        let mut next = self.clone();
        close_in_place(&mut next.values, next.sorts.len());
        next
    }
}

impl DegreeFn for DegreeMatrix {
    fn degree(&self, a: &str, b: &str) -> f64 {
        match (self.index_of(a), self.index_of(b)) {
            (Some(i), Some(j)) => self.get(i, j),
            _ => 0.0,
        }
    }
}

/// Builds the closed degree matrix for `lattice`.
///
/// The diagonal is `1.0`; off-diagonal entries start from the asserted
/// degrees (subsumption `1.0`, similarity its own degree, max-combined) and
/// are then closed under max-min composition in `O(n³)`.
#[must_use]
pub fn compute_closure(lattice: &SortLattice) -> DegreeMatrix {
    let sorts = lattice.sorts().to_vec();
    let n = sorts.len();
    let index = sorts
        .iter()
        .enumerate()
        .map(|(i, s)| (s.clone(), i))
        .collect();

    let mut values = vec![0.0_f64; n * n];
    for i in 0..n {
        values[i * n + i] = 1.0;
    }
    for ((i, j), d) in lattice.asserted_pairs() {
        let cell = &mut values[i * n + j];
        *cell = cell.max(d);
    }

    close_in_place(&mut values, n);
    tracing::debug!(sorts = n, "degree matrix closed");

    DegreeMatrix {
        sorts,
        index,
        values,
    }
}

/// Max-min closure over a row-major `n × n` matrix.
///
/// Row `k` and column `k` are fixed points of iteration `k` (the diagonal is
/// `1.0`), so each row can be updated independently against a snapshot of
/// row `k`.
fn close_in_place(values: &mut [f64], n: usize) {
    if n == 0 {
        return;
    }
    for k in 0..n {
        let pivot: Vec<f64> = values[k * n..(k + 1) * n].to_vec();
        let relax = |row: &mut [f64]| {
            let through = row[k];
            if through <= 0.0 {
                return;
            }
            for (cell, &via) in row.iter_mut().zip(&pivot) {
                let candidate = through.min(via);
                if candidate > *cell {
                    *cell = candidate;
                }
            }
        };

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            values.par_chunks_mut(n).for_each(relax);
        }
        #[cfg(not(feature = "parallel"))]
        values.chunks_mut(n).for_each(relax);
    }
}
