//! Fuzzy unification of OSF terms.
//!
//! Unifying a query term `q` with an instance term `i` yields a merged term
//! and a degree in `(0, 1]`, or the failure value `(None, 0.0)`. Failure is
//! an ordinary result, never an error, so recursion composes without
//! special cases.
//!
//! # Algorithm
//!
//! 1. **Root.** The sort degree between `q` and `i` is taken under a
//!    [`RootPolicy`]. A zero root degree fails.
//! 2. **Features.** The merged feature set is the union of both feature sets.
//!    A feature present on one side only is copied. Two scalars must be
//!    equal. Two terms unify recursively and contribute their degree. A term
//!    against a scalar succeeds only when the term is a constant leaf holding
//!    that scalar; it contributes `1.0` and the scalar is kept.
//! 3. **Aggregation.** The root degree and every contributed degree are folded
//!    with an [`Aggregator`], by default the minimum t-norm.
//!
//! Constant leaves unify with constant leaves holding an equal value, and
//! with feature-less sort nodes. A constant never unifies with a node that
//! carries features.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::closure::DegreeFn;
use crate::term::{Scalar, Term, Value};

/// How the root sort degree is read from a (possibly asymmetric) degree
/// function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum RootPolicy {
    /// `degree(query, instance)` only. The merged term takes the instance
    /// sort.
    QueryToInstance,
    /// `max(degree(query, instance), degree(instance, query))`. The merged
    /// term takes the sort on the source side of the stronger direction; on a
    /// tie it takes the instance sort.
    #[default]
    SymmetricMax,
}

impl RootPolicy {
    /// Stable kebab-case name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RootPolicy::QueryToInstance => "query-to-instance",
            RootPolicy::SymmetricMax => "symmetric-max",
        }
    }
}

impl fmt::Display for RootPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RootPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "query-to-instance" => Ok(RootPolicy::QueryToInstance),
            "symmetric-max" => Ok(RootPolicy::SymmetricMax),
            other => Err(format!(
                "unknown root policy `{other}` (expected query-to-instance or symmetric-max)"
            )),
        }
    }
}

/// Combines a sequence of sub-degrees into one overall degree.
pub trait Aggregator {
    /// Folds `degrees` (never empty during unification) into one degree.
    fn aggregate(&self, degrees: &[f64]) -> f64;
}

impl<F> Aggregator for F
where
    F: Fn(&[f64]) -> f64,
{
    fn aggregate(&self, degrees: &[f64]) -> f64 {
        self(degrees)
    }
}

/// Named triangular norms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum TNorm {
    /// `min(a, b)`: the weakest link decides.
    #[default]
    Minimum,
    /// `a · b`.
    Product,
    /// `max(0, a + b − 1)`.
    Lukasiewicz,
}

impl TNorm {
    /// Applies the t-norm to two degrees.
    #[must_use]
    pub fn combine(self, a: f64, b: f64) -> f64 {
        match self {
            TNorm::Minimum => a.min(b),
            TNorm::Product => a * b,
            TNorm::Lukasiewicz => (a + b - 1.0).max(0.0),
        }
    }

    /// Stable kebab-case name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TNorm::Minimum => "minimum",
            TNorm::Product => "product",
            TNorm::Lukasiewicz => "lukasiewicz",
        }
    }
}

impl Aggregator for TNorm {
    fn aggregate(&self, degrees: &[f64]) -> f64 {
        // 1.0 is the identity of every t-norm.
        degrees.iter().fold(1.0, |acc, &d| self.combine(acc, d))
    }
}

impl fmt::Display for TNorm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TNorm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "minimum" | "min" => Ok(TNorm::Minimum),
            "product" => Ok(TNorm::Product),
            "lukasiewicz" => Ok(TNorm::Lukasiewicz),
            other => Err(format!(
                "unknown t-norm `{other}` (expected minimum, product or lukasiewicz)"
            )),
        }
    }
}

/// Outcome of a unification: the merged term and its degree, or
/// `(None, 0.0)` on failure.
#[derive(Debug, Clone, PartialEq)]
pub struct Unification {
    /// The merged term; `None` on failure.
    pub term: Option<Term>,
    /// Degree in `[0, 1]`; exactly `0.0` on failure.
    pub degree: f64,
}

impl Unification {
    /// The failure value `(None, 0.0)`.
    #[must_use]
    pub fn failed() -> Self {
        Self {
            term: None,
            degree: 0.0,
        }
    }

    /// Returns true if the terms unified.
    #[must_use]
    pub fn is_match(&self) -> bool {
        self.term.is_some()
    }

    /// Splits into `(term, degree)`.
    #[must_use]
    pub fn into_parts(self) -> (Option<Term>, f64) {
        (self.term, self.degree)
    }
}

impl From<Option<(Term, f64)>> for Unification {
    fn from(result: Option<(Term, f64)>) -> Self {
        match result {
            Some((term, degree)) => Self {
                term: Some(term),
                degree,
            },
            None => Self::failed(),
        }
    }
}

/// Unifies `query` with `instance` under [`RootPolicy::SymmetricMax`].
#[must_use]
pub fn unify<D, A>(query: &Term, instance: &Term, degree_fn: &D, aggregate: &A) -> Unification
where
    D: DegreeFn + ?Sized,
    A: Aggregator + ?Sized,
{
    Unifier::new(degree_fn, aggregate).unify(query, instance)
}

/// A degree function, an aggregator, and a root policy bundled for repeated
/// unification.
pub struct Unifier<'a, D: ?Sized, A: ?Sized> {
    degrees: &'a D,
    aggregate: &'a A,
    policy: RootPolicy,
}

impl<'a, D, A> Unifier<'a, D, A>
where
    D: DegreeFn + ?Sized,
    A: Aggregator + ?Sized,
{
    /// A unifier with the default [`RootPolicy::SymmetricMax`].
    #[must_use]
    pub fn new(degrees: &'a D, aggregate: &'a A) -> Self {
        Self {
            degrees,
            aggregate,
            policy: RootPolicy::default(),
        }
    }

    /// Replaces the root policy.
    #[must_use]
    pub fn with_policy(mut self, policy: RootPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The root policy in use.
    #[must_use]
    pub fn policy(&self) -> RootPolicy {
        self.policy
    }

    /// Unifies `query` with `instance`.
    #[must_use]
    pub fn unify(&self, query: &Term, instance: &Term) -> Unification {
        self.unify_terms(query, instance).into()
    }

    fn unify_terms(&self, query: &Term, instance: &Term) -> Option<(Term, f64)> {
        let (root, sort) = self.root(query.sort_name(), instance.sort_name())?;
        let mut degrees = vec![root];

        let merged = match (query, instance) {
            (
                Term::Node { features: qf, .. },
                Term::Node { features: inf, .. },
            ) => Term::Node {
                sort: sort.to_owned(),
                features: self.merge_features(qf, inf, &mut degrees)?,
            },
            (Term::Constant { value: a, .. }, Term::Constant { value: b, .. }) => {
                if a != b {
                    return None;
                }
                Term::constant(sort, a.clone())
            }
            (Term::Constant { value, .. }, Term::Node { features, .. })
            | (Term::Node { features, .. }, Term::Constant { value, .. }) => {
                if !features.is_empty() {
                    return None;
                }
                Term::constant(sort, value.clone())
            }
        };

        let degree = self.aggregate.aggregate(&degrees);
        if degree.is_nan() || degree <= 0.0 {
            return None;
        }
        Some((merged, degree.min(1.0)))
    }

    /// Root degree and the sort the merged term takes.
    fn root<'t>(&self, query: &'t str, instance: &'t str) -> Option<(f64, &'t str)> {
        let forward = self.degrees.degree(query, instance);
        let (degree, sort) = match self.policy {
            RootPolicy::QueryToInstance => (forward, instance),
            RootPolicy::SymmetricMax => {
                let backward = self.degrees.degree(instance, query);
                if forward > backward {
                    (forward, query)
                } else {
                    (backward, instance)
                }
            }
        };
        (degree > 0.0).then_some((degree, sort))
    }

    fn merge_features(
        &self,
        query: &BTreeMap<String, Value>,
        instance: &BTreeMap<String, Value>,
        degrees: &mut Vec<f64>,
    ) -> Option<BTreeMap<String, Value>> {
        let mut merged = BTreeMap::new();
        for (name, qv) in query {
            let value = match instance.get(name) {
                None => qv.clone(),
                Some(iv) => self.merge_values(qv, iv, degrees)?,
            };
            merged.insert(name.clone(), value);
        }
        for (name, iv) in instance {
            if !query.contains_key(name) {
                merged.insert(name.clone(), iv.clone());
            }
        }
        Some(merged)
    }

    fn merge_values(&self, query: &Value, instance: &Value, degrees: &mut Vec<f64>) -> Option<Value> {
        match (query, instance) {
            (Value::Scalar(a), Value::Scalar(b)) => (a == b).then(|| Value::Scalar(a.clone())),
            (Value::Term(a), Value::Term(b)) => {
                let (term, degree) = self.unify_terms(a, b)?;
                degrees.push(degree);
                Some(Value::Term(term))
            }
            (Value::Term(t), Value::Scalar(s)) | (Value::Scalar(s), Value::Term(t)) => {
                constant_matches(t, s).then(|| {
                    degrees.push(1.0);
                    Value::Scalar(s.clone())
                })
            }
        }
    }
}

fn constant_matches(term: &Term, scalar: &Scalar) -> bool {
    term.constant_value() == Some(scalar)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crisp(a: &str, b: &str) -> f64 {
        match (a, b) {
            _ if a == b => 1.0,
            ("slasher", "horror") | ("slasher", "movie") | ("horror", "movie") => 1.0,
            ("horror", "thriller") | ("thriller", "horror") | ("slasher", "thriller") => 0.6,
            ("university", "school") | ("school", "university") => 0.5,
            _ => 0.0,
        }
    }

    #[test]
    fn identical_terms_unify_at_one() {
        let t = Term::node(
            "thriller",
            [("title", "Memento".into()), ("year", 2000.into())],
        );
        let u = unify(&t, &t, &crisp, &TNorm::Minimum);
        assert_eq!(u.degree, 1.0);
        assert_eq!(u.term, Some(t));
    }

    #[test]
    fn scalar_mismatch_fails_regardless_of_other_features() {
        let q = Term::node(
            "thriller",
            [("title", "Different".into()), ("year", 2000.into())],
        );
        let i = Term::node(
            "thriller",
            [("title", "Memento".into()), ("year", 2000.into())],
        );
        assert_eq!(unify(&q, &i, &crisp, &TNorm::Minimum), Unification::failed());
    }

    #[test]
    fn unrelated_roots_fail() {
        let u = unify(&Term::sort("movie"), &Term::sort("school"), &crisp, &TNorm::Minimum);
        assert!(!u.is_match());
        assert_eq!(u.degree, 0.0);
    }

    #[test]
    fn features_are_unioned() {
        let q = Term::node("thriller", [("year", 1979.into())]);
        let i = Term::node("thriller", [("title", "Halloween".into())]);
        let u = unify(&q, &i, &crisp, &TNorm::Minimum);
        let merged = u.term.unwrap();
        assert_eq!(merged.feature("year"), Some(&Value::from(1979)));
        assert_eq!(merged.feature("title"), Some(&Value::from("Halloween")));
    }

    #[test]
    fn nested_degrees_are_aggregated() {
        let q = Term::node("teacher", [("works_at", Term::sort("school").into())]);
        let i = Term::node("teacher", [("works_at", Term::sort("university").into())]);
        let u = unify(&q, &i, &crisp, &TNorm::Minimum);
        assert_eq!(u.degree, 0.5);
        assert_eq!(u.term.unwrap().to_string(), "teacher(works_at->university())");
    }

    #[test]
    fn nested_failure_propagates() {
        let q = Term::node("teacher", [("works_at", Term::sort("movie").into())]);
        let i = Term::node("teacher", [("works_at", Term::sort("school").into())]);
        assert_eq!(unify(&q, &i, &crisp, &TNorm::Minimum), Unification::failed());
    }

    #[test]
    fn constant_against_matching_scalar() {
        let q = Term::node("person", [("city", Term::constant("city", "Oslo").into())]);
        let i = Term::node("person", [("city", "Oslo".into())]);
        let u = unify(&q, &i, &crisp, &TNorm::Minimum);
        assert_eq!(u.degree, 1.0);
        assert_eq!(u.term.unwrap().feature("city"), Some(&Value::from("Oslo")));
    }

    #[test]
    fn constant_against_other_scalar_fails() {
        let q = Term::node("person", [("city", Term::constant("city", "Oslo").into())]);
        let i = Term::node("person", [("city", "Bergen".into())]);
        assert!(!unify(&q, &i, &crisp, &TNorm::Minimum).is_match());
    }

    #[test]
    fn plain_node_against_scalar_fails() {
        let q = Term::node("person", [("city", Term::sort("city").into())]);
        let i = Term::node("person", [("city", "Oslo".into())]);
        assert!(!unify(&q, &i, &crisp, &TNorm::Minimum).is_match());
    }

    #[test]
    fn constants_unify_with_constants_and_bare_nodes() {
        let oslo = Term::constant("city", "Oslo");
        assert_eq!(unify(&oslo, &oslo, &crisp, &TNorm::Minimum).degree, 1.0);
        assert!(!unify(&oslo, &Term::constant("city", "Rome"), &crisp, &TNorm::Minimum).is_match());
        let u = unify(&Term::sort("city"), &oslo, &crisp, &TNorm::Minimum);
        assert_eq!(u.term, Some(oslo.clone()));
        let with_features = Term::node("city", [("country", "NO".into())]);
        assert!(!unify(&with_features, &oslo, &crisp, &TNorm::Minimum).is_match());
    }

    #[test]
    fn symmetric_policy_reads_both_directions() {
        // Only slasher → thriller is asserted; the query is the general side.
        let q = Term::sort("thriller");
        let i = Term::sort("slasher");
        let u = unify(&q, &i, &crisp, &TNorm::Minimum);
        assert_eq!(u.degree, 0.6);
        assert_eq!(u.term.unwrap().sort_name(), "slasher");

        // Reversed roles: query → instance is now the stronger direction and
        // the query sort is kept.
        let u = unify(&i, &q, &crisp, &TNorm::Minimum);
        assert_eq!(u.degree, 0.6);
        assert_eq!(u.term.unwrap().sort_name(), "slasher");
    }

    #[test]
    fn directional_policy_reads_query_to_instance_only() {
        let q = Term::sort("thriller");
        let i = Term::sort("slasher");
        let directional = Unifier::new(&crisp, &TNorm::Minimum).with_policy(RootPolicy::QueryToInstance);
        assert!(!directional.unify(&q, &i).is_match());
        let u = directional.unify(&i, &q);
        assert_eq!(u.degree, 0.6);
        assert_eq!(u.term.unwrap().sort_name(), "thriller");
    }

    #[test]
    fn symmetric_tie_keeps_instance_sort() {
        let u = unify(&Term::sort("horror"), &Term::sort("thriller"), &crisp, &TNorm::Minimum);
        assert_eq!(u.degree, 0.6);
        assert_eq!(u.term.unwrap().sort_name(), "thriller");
    }

    #[test]
    fn custom_aggregators_are_accepted() {
        let mean = |ds: &[f64]| ds.iter().sum::<f64>() / ds.len() as f64;
        let q = Term::node("teacher", [("works_at", Term::sort("school").into())]);
        let i = Term::node("teacher", [("works_at", Term::sort("university").into())]);
        assert_eq!(unify(&q, &i, &crisp, &mean).degree, 0.75);
        assert_eq!(unify(&q, &i, &crisp, &TNorm::Product).degree, 0.5);
    }

    #[test]
    fn zero_aggregate_is_failure() {
        let q = Term::node("teacher", [("works_at", Term::sort("school").into())]);
        let i = Term::node("teacher", [("works_at", Term::sort("university").into())]);
        // Łukasiewicz with a single weak link: max(0, 1 + 0.5 - 1) = 0.5.
        assert_eq!(unify(&q, &i, &crisp, &TNorm::Lukasiewicz).degree, 0.5);
        let never = |_: &[f64]| 0.0;
        assert_eq!(unify(&q, &i, &crisp, &never), Unification::failed());
    }

    #[test]
    fn t_norms() {
        assert_eq!(TNorm::Minimum.aggregate(&[0.9, 0.4, 0.7]), 0.4);
        assert!((TNorm::Product.aggregate(&[0.5, 0.5]) - 0.25).abs() < 1e-12);
        assert!((TNorm::Lukasiewicz.aggregate(&[0.7, 0.6]) - 0.3).abs() < 1e-12);
        assert_eq!(TNorm::Lukasiewicz.aggregate(&[0.2, 0.3]), 0.0);
    }

    #[test]
    fn policy_and_t_norm_names_round_trip() {
        for p in [RootPolicy::QueryToInstance, RootPolicy::SymmetricMax] {
            assert_eq!(p.as_str().parse::<RootPolicy>(), Ok(p));
        }
        for t in [TNorm::Minimum, TNorm::Product, TNorm::Lukasiewicz] {
            assert_eq!(t.to_string().parse::<TNorm>(), Ok(t));
        }
        assert!("sideways".parse::<RootPolicy>().is_err());
    }

    #[test]
    fn unifier_reports_its_policy() {
        let u = Unifier::new(&crisp, &TNorm::Minimum);
        assert_eq!(u.policy(), RootPolicy::SymmetricMax);
        let u = u.with_policy(RootPolicy::QueryToInstance);
        assert_eq!(u.policy(), RootPolicy::QueryToInstance);
    }

    #[test]
    fn unification_splits_into_parts() {
        let q = Term::sort("thriller");
        let i = Term::sort("slasher");
        let (term, degree) = unify(&q, &i, &crisp, &TNorm::Minimum).into_parts();
        assert_eq!(term, Some(Term::sort("slasher")));
        assert_eq!(degree, 0.6);
        assert_eq!(
            unify(&q, &Term::sort("school"), &crisp, &TNorm::Minimum).into_parts(),
            (None, 0.0)
        );
    }
}
