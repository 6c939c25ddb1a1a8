use super::engine::DEFAULT_WEIGHTING_PERCENT;
use serde::{Deserialize, Serialize};

/// Scoring configuration.
///
/// The tier weights and the tier-A bonus are institutional rules and are not
/// configurable; only the default student weighting is.
///
/// Example YAML:
/// ```yaml
/// scoring:
///   weighting_percent: 75
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScoringConfig {
    /// Weighting (0-100) applied to student-weighted articles in new sessions
    #[serde(default)]
    pub weighting_percent: Option<f64>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weighting_percent: Some(DEFAULT_WEIGHTING_PERCENT),
        }
    }
}

impl ScoringConfig {
    pub fn effective_weighting(&self) -> f64 {
        self.weighting_percent.unwrap_or(DEFAULT_WEIGHTING_PERCENT)
    }
}
