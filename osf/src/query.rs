//! Ranked queries over a frozen knowledge base.
//!
//! A query unifies the query term (first argument) with every instance term
//! (second argument), keeps results whose degree reaches the threshold, and
//! orders them by degree, highest first. Ties keep instance insertion order,
//! so rankings are deterministic. Nothing matching, or an empty knowledge
//! base, gives an empty ranking.

use crate::closure::DegreeFn;
use crate::kb::KnowledgeBase;
use crate::term::Term;
use crate::unify::{Aggregator, Unifier};

/// One ranked result.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryMatch {
    /// Instance name.
    pub name: String,
    /// The merged query/instance term.
    pub term: Term,
    /// Match degree, at least the query threshold.
    pub degree: f64,
}

/// Runs `query` against every instance of `kb` with the default root policy.
#[must_use]
pub fn run_query<D, A>(
    kb: &KnowledgeBase,
    query: &Term,
    degree_fn: &D,
    aggregate: &A,
    threshold: f64,
) -> Vec<QueryMatch>
where
    D: DegreeFn + Sync + ?Sized,
    A: Aggregator + Sync + ?Sized,
{
    run_query_with(kb, query, &Unifier::new(degree_fn, aggregate), threshold)
}

/// Runs `query` against every instance of `kb` with a configured [`Unifier`].
#[must_use]
pub fn run_query_with<D, A>(
    kb: &KnowledgeBase,
    query: &Term,
    unifier: &Unifier<'_, D, A>,
    threshold: f64,
) -> Vec<QueryMatch>
where
    D: DegreeFn + Sync + ?Sized,
    A: Aggregator + Sync + ?Sized,
{
    let attempt = |(name, instance): &(String, Term)| {
        let (term, degree) = unifier.unify(query, instance).into_parts();
        tracing::trace!(instance = %name, degree, "unified");
        let term = term?;
        (degree >= threshold).then(|| QueryMatch {
            name: name.clone(),
            term,
            degree,
        })
    };

    #[cfg(feature = "parallel")]
    let mut matches: Vec<QueryMatch> = {
        use rayon::prelude::*;
        kb.entries().par_iter().filter_map(attempt).collect()
    };
    #[cfg(not(feature = "parallel"))]
    let mut matches: Vec<QueryMatch> = kb.entries().iter().filter_map(attempt).collect();

    // Stable: equal degrees keep insertion order.
    matches.sort_by(|a, b| b.degree.total_cmp(&a.degree));
    tracing::debug!(
        query = %query,
        policy = %unifier.policy(),
        scanned = kb.len(),
        matched = matches.len(),
        threshold,
        "query complete"
    );
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kb::KnowledgeBaseBuilder;
    use crate::unify::{RootPolicy, TNorm};

    fn kb() -> KnowledgeBase {
        let mut b = KnowledgeBaseBuilder::new();
        b.add_subsumption("slasher", "horror").unwrap();
        b.add_subsumption("horror", "movie").unwrap();
        b.add_subsumption("thriller", "movie").unwrap();
        b.add_similarity("horror", "thriller", 0.6).unwrap();
        b.add_instance("memento", Term::node("thriller", [("title", "Memento".into())]))
            .unwrap();
        b.add_instance("psycho", Term::node("slasher", [("title", "Psycho".into())]))
            .unwrap();
        b.add_instance(
            "halloween",
            Term::node("thriller", [("title", "Halloween".into()), ("year", 1979.into())]),
        )
        .unwrap();
        b.freeze()
    }

    #[test]
    fn ranks_by_degree_then_insertion_order() {
        let kb = kb();
        let hits = run_query(&kb, &Term::sort("thriller"), kb.degrees(), &TNorm::Minimum, 0.1);
        let names: Vec<_> = hits.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["memento", "halloween", "psycho"]);
        assert_eq!(hits[0].degree, 1.0);
        assert_eq!(hits[2].degree, 0.6);
    }

    #[test]
    fn threshold_is_inclusive() {
        let kb = kb();
        let hits = run_query(&kb, &Term::sort("thriller"), kb.degrees(), &TNorm::Minimum, 0.6);
        assert_eq!(hits.len(), 3);
        let hits = run_query(&kb, &Term::sort("thriller"), kb.degrees(), &TNorm::Minimum, 0.61);
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn directional_policy_changes_the_ranking() {
        let kb = kb();
        let unifier =
            Unifier::new(kb.degrees(), &TNorm::Minimum).with_policy(RootPolicy::QueryToInstance);
        // thriller → slasher is not derivable in this direction.
        let hits = run_query_with(&kb, &Term::sort("thriller"), &unifier, 0.0);
        assert!(hits.iter().all(|m| m.name != "psycho"));
    }

    #[test]
    fn empty_knowledge_base_yields_nothing() {
        let kb = KnowledgeBaseBuilder::new().freeze();
        for threshold in [0.0, 0.5, 1.0] {
            assert!(run_query(&kb, &Term::sort("movie"), kb.degrees(), &TNorm::Minimum, threshold)
                .is_empty());
        }
    }

    #[test]
    fn merged_terms_are_returned() {
        let kb = kb();
        let q = Term::node("movie", [("year", 1979.into())]);
        let hits = run_query(&kb, &q, kb.degrees(), &TNorm::Minimum, 0.5);
        let halloween = hits.iter().find(|m| m.name == "halloween").unwrap();
        assert_eq!(halloween.term.to_string(), "thriller(title->Halloween, year->1979)");
    }
}
