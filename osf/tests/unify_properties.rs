//! Property-based tests for fuzzy unification and ranking over the movie
//! lattice.

use fuzzy_osf::{unify, KnowledgeBase, MatchConfig, RootPolicy, Scalar, TNorm, Term, Value};
use osf_test_helpers::movies;
use proptest::prelude::*;

const SORTS: &[&str] = &["movie", "thriller", "slasher", "horror"];
const FEATURES: &[&str] = &["title", "year", "sequel", "remake"];

fn scalar() -> impl Strategy<Value = Scalar> {
    prop_oneof![
        any::<bool>().prop_map(Scalar::Bool),
        (1950i64..2030).prop_map(Scalar::Int),
        prop::sample::select(vec!["Memento", "Psycho", "Halloween"]).prop_map(Scalar::from),
    ]
}

fn sort() -> impl Strategy<Value = String> {
    prop::sample::select(SORTS).prop_map(str::to_owned)
}

fn term() -> impl Strategy<Value = Term> {
    let leaf = prop_oneof![
        sort().prop_map(Term::sort),
        (sort(), scalar()).prop_map(|(s, v)| Term::constant(s, v)),
    ];
    leaf.prop_recursive(2, 12, 3, |inner| {
        let value = prop_oneof![
            scalar().prop_map(Value::Scalar),
            inner.prop_map(Value::Term),
        ];
        (
            sort(),
            prop::collection::vec((prop::sample::select(FEATURES), value), 0..3),
        )
            .prop_map(|(s, fs)| Term::node(s, fs))
    })
}

fn movie_kb() -> KnowledgeBase {
    movies().unwrap().freeze()
}

// =============================================================================
// Unification laws
// =============================================================================

proptest! {
    /// Every term unifies with itself at degree 1 and is its own unifier
    #[test]
    fn prop_self_unification(t in term()) {
        let kb = movie_kb();
        let u = unify(&t, &t, kb.degrees(), &TNorm::Minimum);
        prop_assert_eq!(u.degree, 1.0);
        prop_assert_eq!(u.term, Some(t));
    }

    /// Degrees stay in [0, 1] and failure carries no term
    #[test]
    fn prop_degree_bounded(q in term(), i in term()) {
        let kb = movie_kb();
        for tnorm in [TNorm::Minimum, TNorm::Product, TNorm::Lukasiewicz] {
            let u = unify(&q, &i, kb.degrees(), &tnorm);
            prop_assert!((0.0..=1.0).contains(&u.degree));
            prop_assert_eq!(u.term.is_some(), u.degree > 0.0);
        }
    }

    /// The product t-norm never scores above the minimum
    #[test]
    fn prop_product_below_minimum(q in term(), i in term()) {
        let kb = movie_kb();
        let min = unify(&q, &i, kb.degrees(), &TNorm::Minimum);
        let product = unify(&q, &i, kb.degrees(), &TNorm::Product);
        prop_assert!(product.degree <= min.degree + 1e-12);
        prop_assert_eq!(product.term.is_some(), min.term.is_some());
    }

    /// Symmetric-max is at least as permissive as the directional policy
    #[test]
    fn prop_symmetric_dominates_directional(q in term(), i in term()) {
        let mut builder = movies().unwrap();
        builder.add_instance("candidate", i).unwrap();
        let kb = builder.freeze();
        let symmetric = MatchConfig::default();
        let directional = symmetric.with_root_policy(RootPolicy::QueryToInstance);
        let s = kb.unify_with(&q, "candidate", &symmetric);
        let d = kb.unify_with(&q, "candidate", &directional);
        prop_assert!(s.degree >= d.degree);
    }
}

// =============================================================================
// Ranking
// =============================================================================

proptest! {
    /// Results are threshold-filtered and sorted by descending degree
    #[test]
    fn prop_ranked_and_filtered(
        q in term(),
        instances in prop::collection::vec(term(), 0..8),
        threshold in 0.0f64..=1.0,
    ) {
        let mut builder = movies().unwrap();
        for (n, t) in instances.into_iter().enumerate() {
            builder.add_instance(&format!("extra{n}"), t).unwrap();
        }
        let kb = builder.freeze();
        let config = MatchConfig::default().with_threshold(threshold);
        let hits = kb.query(&q, &config);
        for m in &hits {
            prop_assert!(m.degree >= threshold);
            prop_assert!(m.degree > 0.0);
        }
        for pair in hits.windows(2) {
            prop_assert!(pair[0].degree >= pair[1].degree);
        }
    }

    /// Querying twice gives identical answers
    #[test]
    fn prop_query_deterministic(q in term()) {
        let kb = movie_kb();
        let config = MatchConfig::default();
        prop_assert_eq!(kb.query(&q, &config), kb.query(&q, &config));
    }
}
