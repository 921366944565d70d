//! Classified-line records and classification results

use crate::FormatId;
use serde::{Deserialize, Serialize};

/// How a line's type was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationMethod {
    /// Direct pattern match (high-confidence short-circuit).
    Regex,
    /// A learned model. Reserved for future backends; no model ships today.
    Ml,
    /// The narrative decision resolver over the surrounding context.
    Context,
    /// Safe default applied when no candidate passed its gate.
    Fallback,
}

/// The classifier's verdict for one line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub assigned_type: FormatId,
    /// 0–100.
    pub confidence: u8,
    /// Short identifier of the deciding rule, e.g. `gate:character-with-colon`.
    pub reason: String,
    pub method: ClassificationMethod,
}

impl Classification {
    pub fn new(
        assigned_type: FormatId,
        confidence: u8,
        reason: impl Into<String>,
        method: ClassificationMethod,
    ) -> Self {
        Self {
            assigned_type,
            confidence: confidence.min(100),
            reason: reason.into(),
            method,
        }
    }
}

/// One classified line of a pass. Immutable after creation; only the reviewer
/// may derive new types from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedLine {
    pub line_index: usize,
    pub text: String,
    pub assigned_type: FormatId,
    /// 0–100.
    pub original_confidence: u8,
    pub classification_method: ClassificationMethod,
}

impl ClassifiedLine {
    pub fn from_classification(line_index: usize, text: impl Into<String>, c: &Classification) -> Self {
        Self {
            line_index,
            text: text.into(),
            assigned_type: c.assigned_type,
            original_confidence: c.confidence,
            classification_method: c.method,
        }
    }
}
