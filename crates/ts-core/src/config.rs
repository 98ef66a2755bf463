//! Analysis configuration.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Tunables for one analysis run. Every field has a default, so an empty
/// YAML/JSON document is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Significance level. A p-value strictly below `alpha` is significant;
    /// `p == alpha` passes (default: 0.05).
    pub alpha: f64,
    /// Group label of cohort A (default: `Intervention`).
    pub intervention_label: String,
    /// Group label of cohort B (default: `Control`).
    pub control_label: String,
    /// Upper bound on distinct levels of a categorical baseline variable
    /// (default: 50).
    pub max_categorical_levels: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            intervention_label: "Intervention".to_string(),
            control_label: "Control".to_string(),
            max_categorical_levels: 50,
        }
    }
}

impl AnalysisConfig {
    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(Error::Validation(format!(
                "alpha must be in (0, 1), got {}",
                self.alpha
            )));
        }
        if self.intervention_label.trim().is_empty() || self.control_label.trim().is_empty() {
            return Err(Error::Validation("group labels must be non-empty".to_string()));
        }
        if self.intervention_label == self.control_label {
            return Err(Error::Validation(format!(
                "intervention and control labels must differ (both are '{}')",
                self.control_label
            )));
        }
        if self.max_categorical_levels == 0 {
            return Err(Error::Validation("max_categorical_levels must be >= 1".to_string()));
        }
        Ok(())
    }

    /// Whether `p` counts as significant under this configuration.
    #[inline]
    pub fn is_significant(&self, p: f64) -> bool {
        p < self.alpha
    }
}
