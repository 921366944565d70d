//! Post-classification review
//!
//! Runs every detector over every classified line, aggregates the findings
//! into a per-line suspicion total, applies the escalation gate and the
//! suspicion-ratio cap, and formats the packet sent to an external
//! adjudicator.

pub mod detectors;
pub mod grammar;

use detectors::{default_detectors, Detector, LineFeatures};
use filmlane_core::{
    ClassifiedLine, ReviewContextLine, ReviewFinding, ReviewPacket, SuspiciousLine,
};
use serde::{Deserialize, Serialize};

/// Reviewer tunables with the shipped baseline as defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewerConfig {
    /// Minimum aggregate suspicion for escalation.
    pub suspicion_threshold: u8,
    /// Findings required unless one signal alone is severe enough.
    pub min_signals_for_suspicion: usize,
    /// A single finding at or above this total escalates on its own.
    pub high_severity_single_signal: u8,
    /// Cap on the share of lines reported, `ceil(n * ratio)`.
    pub max_suspicion_ratio: f32,
    /// Context lines included on each side of a suspicious line.
    pub context_radius: usize,
}

impl Default for ReviewerConfig {
    fn default() -> Self {
        Self {
            suspicion_threshold: 74,
            min_signals_for_suspicion: 2,
            high_severity_single_signal: 90,
            max_suspicion_ratio: 0.08,
            context_radius: 5,
        }
    }
}

/// The detector harness.
pub struct Reviewer {
    config: ReviewerConfig,
    detectors: Vec<Box<dyn Detector>>,
}

impl Default for Reviewer {
    fn default() -> Self {
        Self::new(ReviewerConfig::default())
    }
}

impl Reviewer {
    pub fn new(config: ReviewerConfig) -> Self {
        Self {
            config,
            detectors: default_detectors(),
        }
    }

    pub fn config(&self) -> &ReviewerConfig {
        &self.config
    }

    /// Aggregate findings: the strongest finding carries the total, the rest
    /// contribute 30% each, capped at 99.
    fn aggregate(findings: &[ReviewFinding]) -> u8 {
        let mut scores: Vec<u8> = findings.iter().map(|f| f.suspicion_score).collect();
        scores.sort_unstable_by(|a, b| b.cmp(a));
        match scores.split_first() {
            None => 0,
            Some((max, rest)) => {
                let tail: f32 = rest.iter().map(|s| *s as f32).sum();
                ((*max as f32 + 0.3 * tail).round() as u32).min(99) as u8
            }
        }
    }

    fn escalates(&self, total: u8, finding_count: usize) -> bool {
        total >= self.config.suspicion_threshold
            && (finding_count >= self.config.min_signals_for_suspicion
                || total >= self.config.high_severity_single_signal)
    }

    fn context_lines(&self, records: &[ClassifiedLine], position: usize) -> Vec<ReviewContextLine> {
        let start = position.saturating_sub(self.config.context_radius);
        let end = (position + self.config.context_radius + 1).min(records.len());
        records[start..end]
            .iter()
            .map(|r| ReviewContextLine {
                line_index: r.line_index,
                assigned_type: r.assigned_type,
                text: r.text.clone(),
            })
            .collect()
    }

    /// Review a full classified sequence and build the adjudication packet.
    pub fn review(&self, records: &[ClassifiedLine]) -> ReviewPacket {
        let total_reviewed = records.len();
        let mut suspicious: Vec<(usize, u8, Vec<ReviewFinding>)> = Vec::new();

        for (position, record) in records.iter().enumerate() {
            let features = LineFeatures::of(&record.text);
            let findings: Vec<ReviewFinding> = self
                .detectors
                .iter()
                .filter_map(|d| d.detect(record, &features, records, position))
                .collect();
            if findings.is_empty() {
                continue;
            }
            let total = Self::aggregate(&findings);
            if self.escalates(total, findings.len()) {
                suspicious.push((position, total, findings));
            }
        }

        // Deterministic cap: strongest suspicions first, ties by position.
        suspicious.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        let cap = (total_reviewed as f32 * self.config.max_suspicion_ratio).ceil() as usize;
        suspicious.truncate(cap);

        let suspicious_lines: Vec<SuspiciousLine> = suspicious
            .into_iter()
            .map(|(position, total, findings)| {
                let record = &records[position];
                let suggested_type = findings.iter().find_map(|f| f.suggested_type);
                SuspiciousLine {
                    item_index: position,
                    line_index: record.line_index,
                    text: record.text.clone(),
                    assigned_type: record.assigned_type,
                    total_suspicion: total,
                    findings,
                    suggested_type,
                    context_lines: self.context_lines(records, position),
                }
            })
            .collect();

        let total_suspicious = suspicious_lines.len();
        tracing::debug!(
            total_reviewed,
            total_suspicious,
            "review pass complete"
        );

        ReviewPacket {
            total_suspicious,
            total_reviewed,
            suspicion_rate: if total_reviewed == 0 {
                0.0
            } else {
                total_suspicious as f32 / total_reviewed as f32
            },
            suspicious_lines,
        }
    }
}
