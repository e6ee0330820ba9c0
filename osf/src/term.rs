//! Order-sorted feature terms.
//!
//! A [`Term`] is an owned tree: either a sort node carrying a feature map, or
//! a constant leaf carrying a [`Scalar`]. Feature values are [`Value`]s, i.e.
//! either a nested term or a bare scalar. Because every child is owned by its
//! parent, a term can never reference one of its ancestors and always has a
//! finite depth.
//!
//! # Rendering
//!
//! The [`Display`](std::fmt::Display) form is the text shape existing
//! consumers parse:
//!
//! | Term | Rendering |
//! |------|-----------|
//! | node with features | `thriller(title->Memento, year->1979)` |
//! | node without features | `university()` |
//! | constant leaf | `city('Paris')` |
//!
//! Features render in name order.

use std::collections::BTreeMap;
use std::fmt;

/// A scalar feature value. Equality is structural: `Int(1)` and `Float(1.0)`
/// are different values.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(untagged)
)]
pub enum Scalar {
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A floating-point number.
    Float(f64),
    /// A string.
    Str(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(true) => f.write_str("True"),
            Scalar::Bool(false) => f.write_str("False"),
            Scalar::Int(i) => write!(f, "{i}"),
            // Whole floats keep a `.0` so they never render like an `Int`.
            Scalar::Float(x) if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e16 => {
                write!(f, "{x:.1}")
            }
            Scalar::Float(x) => write!(f, "{x}"),
            Scalar::Str(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Scalar::Int(i)
    }
}

impl From<i32> for Scalar {
    fn from(i: i32) -> Self {
        Scalar::Int(i64::from(i))
    }
}

impl From<f64> for Scalar {
    fn from(x: f64) -> Self {
        Scalar::Float(x)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Str(s.to_owned())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Str(s)
    }
}

/// The value of a feature: a nested term or a bare scalar.
///
/// Deserialization lives in the JSON adapter so that a malformed nested term
/// reports its own error instead of a generic "no variant matched".
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(untagged))]
pub enum Value {
    /// A nested term.
    Term(Term),
    /// A bare scalar.
    Scalar(Scalar),
}

impl Value {
    /// The nested term, if this value is one.
    #[must_use]
    pub fn as_term(&self) -> Option<&Term> {
        match self {
            Value::Term(t) => Some(t),
            Value::Scalar(_) => None,
        }
    }

    /// The scalar, if this value is one.
    #[must_use]
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(s) => Some(s),
            Value::Term(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Term(t) => t.fmt(f),
            Value::Scalar(s) => s.fmt(f),
        }
    }
}

impl From<Term> for Value {
    fn from(t: Term) -> Self {
        Value::Term(t)
    }
}

impl From<Scalar> for Value {
    fn from(s: Scalar) -> Self {
        Value::Scalar(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Scalar(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Scalar(s.into())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Scalar(i.into())
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Scalar(i.into())
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Scalar(x.into())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Scalar(b.into())
    }
}

/// An OSF term.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(
        try_from = "crate::serializer::json::TermRepr",
        into = "crate::serializer::json::TermRepr"
    )
)]
pub enum Term {
    /// A sort with named features. Feature names are unique.
    Node {
        /// The term's sort.
        sort: String,
        /// Feature name → value.
        features: BTreeMap<String, Value>,
    },
    /// A constant leaf: a sort paired with a concrete value.
    Constant {
        /// The term's sort.
        sort: String,
        /// The constant's value.
        value: Scalar,
    },
}

impl Term {
    /// A sort node without features, e.g. `university()`.
    #[must_use]
    pub fn sort(sort: impl Into<String>) -> Self {
        Term::Node {
            sort: sort.into(),
            features: BTreeMap::new(),
        }
    }

    /// A sort node with the given features. A repeated feature name keeps
    /// the last value.
    #[must_use]
    pub fn node<K, I>(sort: impl Into<String>, features: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Term::Node {
            sort: sort.into(),
            features: features.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// A constant leaf, e.g. `city('Paris')`.
    #[must_use]
    pub fn constant(sort: impl Into<String>, value: impl Into<Scalar>) -> Self {
        Term::Constant {
            sort: sort.into(),
            value: value.into(),
        }
    }

    /// The term's sort.
    #[must_use]
    pub fn sort_name(&self) -> &str {
        match self {
            Term::Node { sort, .. } | Term::Constant { sort, .. } => sort,
        }
    }

    /// Returns true for constant leaves.
    #[must_use]
    pub fn is_constant(&self) -> bool {
        matches!(self, Term::Constant { .. })
    }

    /// The constant's value, or `None` for sort nodes.
    #[must_use]
    pub fn constant_value(&self) -> Option<&Scalar> {
        match self {
            Term::Constant { value, .. } => Some(value),
            Term::Node { .. } => None,
        }
    }

    /// The feature map, or `None` for constant leaves.
    #[must_use]
    pub fn features(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Term::Node { features, .. } => Some(features),
            Term::Constant { .. } => None,
        }
    }

    /// Looks up a single feature.
    #[must_use]
    pub fn feature(&self, name: &str) -> Option<&Value> {
        self.features().and_then(|f| f.get(name))
    }

    /// Nesting depth: `1` for a leaf or a node whose features are all scalars.
    #[must_use]
    pub fn depth(&self) -> usize {
        let deepest = self
            .features()
            .into_iter()
            .flat_map(BTreeMap::values)
            .filter_map(Value::as_term)
            .map(Term::depth)
            .max()
            .unwrap_or(0);
        deepest + 1
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Constant { sort, value } => write!(f, "{sort}('{value}')"),
            Term::Node { sort, features } => {
                write!(f, "{sort}(")?;
                for (i, (name, value)) in features.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}->{value}")?;
                }
                f.write_str(")")
            }
        }
    }
}
