//! Classifier tunables

use serde::{Deserialize, Serialize};

/// Thresholds of the classification pass. Defaults are the shipped baseline;
/// they are surfaced for tuning, not expected to change per deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Below this confidence an item becomes a deferred confirmation.
    pub low_confidence_threshold: u8,
    /// Confidence assigned when no resolver candidate passes its gate.
    pub fallback_confidence: u8,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            low_confidence_threshold: 60,
            fallback_confidence: 80,
        }
    }
}
