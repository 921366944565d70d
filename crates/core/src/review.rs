//! Reviewer packet and adjudicator contract types
//!
//! These types cross the classifier → pipeline → adjudicator seam. The
//! adjudicator crate owns the HTTP wire shapes and converts from these.

use crate::FormatId;
use serde::{Deserialize, Serialize};

/// One detector's verdict on one line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewFinding {
    pub detector_id: String,
    /// 0–100.
    pub suspicion_score: u8,
    pub reason: String,
    pub suggested_type: Option<FormatId>,
}

/// A neighboring line included for adjudication context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewContextLine {
    pub line_index: usize,
    pub assigned_type: FormatId,
    pub text: String,
}

/// One line the reviewer escalated, with every finding that fired on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuspiciousLine {
    /// Index into the emitted item sequence; adjudicator decisions refer to
    /// this.
    pub item_index: usize,
    pub line_index: usize,
    pub text: String,
    pub assigned_type: FormatId,
    /// Aggregate score, 0–100.
    pub total_suspicion: u8,
    pub findings: Vec<ReviewFinding>,
    /// First non-null suggestion across findings.
    pub suggested_type: Option<FormatId>,
    /// At most `2 * radius + 1` lines around the suspicious line.
    pub context_lines: Vec<ReviewContextLine>,
}

impl SuspiciousLine {
    pub fn reasons(&self) -> Vec<String> {
        self.findings.iter().map(|f| f.reason.clone()).collect()
    }
}

/// Everything sent to the external adjudicator for one pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewPacket {
    pub total_suspicious: usize,
    pub total_reviewed: usize,
    pub suspicion_rate: f32,
    pub suspicious_lines: Vec<SuspiciousLine>,
}

impl ReviewPacket {
    pub fn is_empty(&self) -> bool {
        self.suspicious_lines.is_empty()
    }
}

/// One override the adjudicator asks for. `confidence` is on the 0–1 scale of
/// the wire contract; the pipeline maps it to 0–100 when applying.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewDecision {
    pub item_index: usize,
    pub final_type: FormatId,
    pub confidence: f64,
    pub reason: String,
}

/// Terminal state of one review request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReviewOutcome {
    Applied {
        model: String,
        decisions: Vec<ReviewDecision>,
        latency_ms: u64,
    },
    Skipped {
        model: String,
        message: String,
        latency_ms: u64,
    },
    Warning {
        model: String,
        message: String,
        latency_ms: u64,
    },
    Error {
        model: String,
        message: String,
        latency_ms: u64,
    },
}

impl ReviewOutcome {
    pub fn decisions(&self) -> &[ReviewDecision] {
        match self {
            ReviewOutcome::Applied { decisions, .. } => decisions,
            _ => &[],
        }
    }
}
