//! Match configuration: root policy, t-norm, and result threshold.

use crate::unify::{RootPolicy, TNorm};

/// Threshold used when none is configured.
pub const DEFAULT_THRESHOLD: f64 = 0.01;

/// Named settings for a query run.
///
/// Embeddable in a knowledge-base document as the `config` block; every field
/// is optional there and falls back to [`MatchConfig::default`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct MatchConfig {
    /// How the root sort degree is read.
    pub root_policy: RootPolicy,
    /// How sub-degrees are combined.
    pub tnorm: TNorm,
    /// Results below this degree are dropped.
    pub threshold: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            root_policy: RootPolicy::SymmetricMax,
            tnorm: TNorm::Minimum,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl MatchConfig {
    /// Replaces the threshold.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Replaces the root policy.
    #[must_use]
    pub fn with_root_policy(mut self, root_policy: RootPolicy) -> Self {
        self.root_policy = root_policy;
        self
    }

    /// Replaces the t-norm.
    #[must_use]
    pub fn with_tnorm(mut self, tnorm: TNorm) -> Self {
        self.tnorm = tnorm;
        self
    }
}
