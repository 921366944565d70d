//! User correction records

use crate::FormatId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One user correction of a classified line. Append-only; corrections are
/// never edited or removed once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correction {
    pub line: String,
    pub original_type: FormatId,
    pub corrected_type: FormatId,
    /// Confidence of the original classification, 0–100.
    pub confidence: u8,
    pub timestamp: DateTime<Utc>,
}

impl Correction {
    pub fn new(
        line: impl Into<String>,
        original_type: FormatId,
        corrected_type: FormatId,
        confidence: u8,
    ) -> Self {
        Self {
            line: line.into(),
            original_type,
            corrected_type,
            confidence,
            timestamp: Utc::now(),
        }
    }
}
