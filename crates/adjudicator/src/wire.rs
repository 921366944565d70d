//! Wire shapes of the review endpoint
//!
//! The HTTP contract is camelCase JSON; these types convert from the core
//! packet types and back into [`ReviewOutcome`].

use filmlane_core::{FormatId, ReviewDecision, ReviewOutcome, ReviewPacket};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub session_id: String,
    pub total_reviewed: usize,
    pub suspicious_lines: Vec<WireSuspiciousLine>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireSuspiciousLine {
    pub item_index: usize,
    pub line_index: usize,
    pub text: String,
    pub assigned_type: FormatId,
    pub total_suspicion: u8,
    pub reasons: Vec<String>,
    pub context_lines: Vec<WireContextLine>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireContextLine {
    pub line_index: usize,
    pub assigned_type: FormatId,
    pub text: String,
}

impl ReviewRequest {
    pub fn from_packet(session_id: &str, packet: &ReviewPacket) -> Self {
        Self {
            session_id: session_id.to_string(),
            total_reviewed: packet.total_reviewed,
            suspicious_lines: packet
                .suspicious_lines
                .iter()
                .map(|line| WireSuspiciousLine {
                    item_index: line.item_index,
                    line_index: line.line_index,
                    text: line.text.clone(),
                    assigned_type: line.assigned_type,
                    total_suspicion: line.total_suspicion,
                    reasons: line.reasons(),
                    context_lines: line
                        .context_lines
                        .iter()
                        .map(|c| WireContextLine {
                            line_index: c.line_index,
                            assigned_type: c.assigned_type,
                            text: c.text.clone(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireDecision {
    pub item_index: usize,
    pub final_type: FormatId,
    /// 0–1 on the wire; the pipeline maps to 0–100 when applying.
    pub confidence: f64,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ReviewResponse {
    Applied {
        model: String,
        decisions: Vec<WireDecision>,
        #[serde(default)]
        latency_ms: u64,
    },
    Skipped {
        model: String,
        #[serde(default)]
        message: String,
        #[serde(default)]
        latency_ms: u64,
    },
    Warning {
        model: String,
        #[serde(default)]
        message: String,
        #[serde(default)]
        latency_ms: u64,
    },
    Error {
        model: String,
        #[serde(default)]
        message: String,
        #[serde(default)]
        latency_ms: u64,
    },
}

impl ReviewResponse {
    /// Convert to the core outcome, substituting the measured round-trip
    /// latency for the wire value.
    pub fn into_outcome(self, measured_latency_ms: u64) -> ReviewOutcome {
        match self {
            ReviewResponse::Applied { model, decisions, .. } => ReviewOutcome::Applied {
                model,
                decisions: decisions
                    .into_iter()
                    .map(|d| ReviewDecision {
                        item_index: d.item_index,
                        final_type: d.final_type,
                        confidence: d.confidence,
                        reason: d.reason,
                    })
                    .collect(),
                latency_ms: measured_latency_ms,
            },
            ReviewResponse::Skipped { model, message, .. } => ReviewOutcome::Skipped {
                model,
                message,
                latency_ms: measured_latency_ms,
            },
            ReviewResponse::Warning { model, message, .. } => ReviewOutcome::Warning {
                model,
                message,
                latency_ms: measured_latency_ms,
            },
            ReviewResponse::Error { model, message, .. } => ReviewOutcome::Error {
                model,
                message,
                latency_ms: measured_latency_ms,
            },
        }
    }
}
