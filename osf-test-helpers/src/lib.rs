//! Fixture knowledge bases for `fuzzy-osf` tests and benches.
//!
//! Each domain function returns an unfrozen [`KnowledgeBaseBuilder`] so a
//! test can add to it before freezing. [`all_domains`] merges every domain
//! into one builder.
//!
//! | Domain | Hierarchy | Similarities | Instances |
//! |--------|-----------|--------------|-----------|
//! | movies | slasher ⊑ horror ⊑ movie, thriller ⊑ movie | horror ~ thriller 0.6 | memento, psycho, halloween |
//! | education | university/school_teacher ⊑ teacher | university ~ school 0.5 | carol, bob |
//! | health | surgeon ⊑ doctor ⊑ clinician, nurse ⊑ clinician | hospital ~ clinic 0.7 | house, carla, grey |
//! | animals | dog/cat/wolf ⊑ mammal ⊑ animal, eagle ⊑ bird ⊑ animal | dog ~ wolf 0.8, cat ~ dog 0.3 | rex, tom, akela, sam |

use fuzzy_osf::{KnowledgeBaseBuilder, KnowledgeBaseError, Term};

/// Sort descriptions for the movie and education sorts.
pub const SORT_DESCRIPTIONS: &[(&str, &str)] = &[
    ("movie", "A form of visual storytelling intended for entertainment."),
    ("thriller", "A movie genre focusing on tension, uncertainty, and excitement."),
    ("slasher", "A horror subgenre featuring killers and violent scenes."),
    ("horror", "A film genre intended to frighten or shock the audience."),
    ("teacher", "A person whose job is to teach students."),
    ("university_teacher", "A teacher who works in a university."),
    ("school_teacher", "A teacher who works in a primary or secondary school."),
];

/// Movies: the canonical thriller / slasher scenario.
///
/// # Errors
///
/// Never fails for the fixed data; the `Result` mirrors the builder API.
pub fn movies() -> Result<KnowledgeBaseBuilder, KnowledgeBaseError> {
    let mut kb = KnowledgeBaseBuilder::new();
    add_movies(&mut kb)?;
    Ok(kb)
}

/// Education: teachers and the institutions they work at.
///
/// # Errors
///
/// Never fails for the fixed data.
pub fn education() -> Result<KnowledgeBaseBuilder, KnowledgeBaseError> {
    let mut kb = KnowledgeBaseBuilder::new();
    add_education(&mut kb)?;
    Ok(kb)
}

/// Health: clinicians with constant-valued wards.
///
/// # Errors
///
/// Never fails for the fixed data.
pub fn health() -> Result<KnowledgeBaseBuilder, KnowledgeBaseError> {
    let mut kb = KnowledgeBaseBuilder::new();
    add_health(&mut kb)?;
    Ok(kb)
}

/// Animals: a two-branch taxonomy with fuzzy cousins.
///
/// # Errors
///
/// Never fails for the fixed data.
pub fn animals() -> Result<KnowledgeBaseBuilder, KnowledgeBaseError> {
    let mut kb = KnowledgeBaseBuilder::new();
    add_animals(&mut kb)?;
    Ok(kb)
}

/// Every domain in one builder, in the order movies, education, health,
/// animals.
///
/// # Errors
///
/// Never fails for the fixed data.
pub fn all_domains() -> Result<KnowledgeBaseBuilder, KnowledgeBaseError> {
    let mut kb = KnowledgeBaseBuilder::new();
    add_movies(&mut kb)?;
    add_education(&mut kb)?;
    add_health(&mut kb)?;
    add_animals(&mut kb)?;
    Ok(kb)
}

/// A chain lattice `s0 ⊑ s1 ⊑ … ⊑ s{n-1}` with a similarity between every
/// pair `(s_i, s_{i+3})`, one instance per sort. Used to size closure
/// benchmarks.
///
/// # Errors
///
/// Never fails.
pub fn chain(n: usize) -> Result<KnowledgeBaseBuilder, KnowledgeBaseError> {
    let mut kb = KnowledgeBaseBuilder::new();
    let name = |i: usize| format!("s{i}");
    for i in 0..n {
        kb.add_sort(&name(i))?;
        if i + 1 < n {
            kb.add_subsumption(&name(i), &name(i + 1))?;
        }
        if i + 3 < n {
            let degree = 0.2 + 0.7 * ((i % 7) as f64 / 7.0);
            kb.add_similarity(&name(i), &name(i + 3), degree)?;
        }
        kb.add_instance(
            &format!("i{i}"),
            Term::node(name(i), [("rank", (i as i64).into())]),
        )?;
    }
    Ok(kb)
}

fn describe(kb: &mut KnowledgeBaseBuilder, sorts: &[&str]) -> Result<(), KnowledgeBaseError> {
    for &(sort, text) in SORT_DESCRIPTIONS {
        if sorts.contains(&sort) {
            kb.lattice_mut().add_sort_with_description(sort, text)?;
        }
    }
    Ok(())
}

fn add_movies(kb: &mut KnowledgeBaseBuilder) -> Result<(), KnowledgeBaseError> {
    describe(kb, &["movie", "thriller", "slasher", "horror"])?;
    kb.add_subsumption("slasher", "horror")?;
    kb.add_subsumption("horror", "movie")?;
    kb.add_subsumption("thriller", "movie")?;
    kb.add_similarity("horror", "thriller", 0.6)?;

    kb.add_instance("memento", Term::node("thriller", [("title", "Memento".into())]))?;
    kb.add_instance("psycho", Term::node("slasher", [("title", "Psycho".into())]))?;
    kb.add_instance(
        "halloween",
        Term::node(
            "thriller",
            [("title", "Halloween".into()), ("year", 1979.into())],
        ),
    )?;
    Ok(())
}

fn add_education(kb: &mut KnowledgeBaseBuilder) -> Result<(), KnowledgeBaseError> {
    describe(kb, &["teacher", "university_teacher", "school_teacher"])?;
    kb.add_subsumption("university_teacher", "teacher")?;
    kb.add_subsumption("school_teacher", "teacher")?;
    kb.add_subsumption("university", "institution")?;
    kb.add_subsumption("school", "institution")?;
    kb.add_similarity("university", "school", 0.5)?;
    kb.add_similarity("university_teacher", "school_teacher", 0.4)?;

    kb.add_instance(
        "carol",
        Term::node(
            "university_teacher",
            [("works_at", Term::sort("university").into())],
        ),
    )?;
    kb.add_instance(
        "bob",
        Term::node("school_teacher", [("works_at", Term::sort("school").into())]),
    )?;
    Ok(())
}

fn add_health(kb: &mut KnowledgeBaseBuilder) -> Result<(), KnowledgeBaseError> {
    kb.add_subsumption("surgeon", "doctor")?;
    kb.add_subsumption("doctor", "clinician")?;
    kb.add_subsumption("nurse", "clinician")?;
    kb.add_similarity("hospital", "clinic", 0.7)?;
    kb.add_similarity("doctor", "nurse", 0.3)?;

    kb.add_instance(
        "house",
        Term::node(
            "doctor",
            [
                ("works_at", Term::sort("hospital").into()),
                ("ward", Term::constant("ward", "diagnostics").into()),
            ],
        ),
    )?;
    kb.add_instance(
        "carla",
        Term::node(
            "nurse",
            [
                ("works_at", Term::sort("clinic").into()),
                ("ward", "pediatrics".into()),
            ],
        ),
    )?;
    kb.add_instance(
        "grey",
        Term::node(
            "surgeon",
            [
                ("works_at", Term::sort("hospital").into()),
                ("ward", "surgery".into()),
            ],
        ),
    )?;
    Ok(())
}

fn add_animals(kb: &mut KnowledgeBaseBuilder) -> Result<(), KnowledgeBaseError> {
    for sort in ["dog", "cat", "wolf"] {
        kb.add_subsumption(sort, "mammal")?;
    }
    kb.add_subsumption("mammal", "animal")?;
    kb.add_subsumption("eagle", "bird")?;
    kb.add_subsumption("bird", "animal")?;
    kb.add_similarity("dog", "wolf", 0.8)?;
    kb.add_similarity("cat", "dog", 0.3)?;

    kb.add_instance("rex", Term::node("dog", [("legs", 4.into()), ("domestic", true.into())]))?;
    kb.add_instance("tom", Term::node("cat", [("legs", 4.into()), ("domestic", true.into())]))?;
    kb.add_instance(
        "akela",
        Term::node("wolf", [("legs", 4.into()), ("domestic", false.into())]),
    )?;
    kb.add_instance("sam", Term::node("eagle", [("legs", 2.into())]))?;
    Ok(())
}
