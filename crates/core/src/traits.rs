//! Capability traits at the crate seams

use crate::{Classification, Correction, FormatId, ReviewOutcome, ReviewPacket, Result};
use async_trait::async_trait;

/// A pluggable per-line classifier backend.
///
/// The shipping implementation is the deterministic rule engine. The trait
/// keeps the door open for a learned backend without changing callers;
/// `retrain_with_corrections` is a no-op for the rule engine.
pub trait LineClassifier: Send + Sync {
    /// Prepare the backend (compile patterns, load weights). Idempotent.
    fn initialize(&mut self) -> Result<()>;

    /// Classify one normalized line given the previously assigned types,
    /// oldest first. Pure: the same inputs always yield the same verdict.
    fn classify_line(&self, line: &str, previous_types: &[FormatId]) -> Classification;

    /// Feed accumulated user corrections back into the backend.
    fn retrain_with_corrections(&mut self, corrections: &[Correction]) -> Result<()>;
}

/// User-facing confirmation of a low-confidence classification.
///
/// Implementations resolve to the final type the user picked, which may be
/// the suggested one unchanged.
#[async_trait]
pub trait ConfirmationCallback: Send + Sync {
    async fn confirm(&self, line: &str, suggested: FormatId, confidence: u8) -> Result<FormatId>;
}

/// An external reviewer of suspicious classifications.
///
/// Failures collapse into [`ReviewOutcome::Error`]; an aborted request
/// resolves to [`ReviewOutcome::Skipped`]. Implementations never panic and
/// never make the caller lose blocks.
#[async_trait]
pub trait Adjudicator: Send + Sync {
    async fn review(&self, session_id: &str, packet: &ReviewPacket) -> ReviewOutcome;

    /// Abort an in-flight review for the session, if any. Used when a new
    /// paste supersedes the pass under review.
    fn abort(&self, session_id: &str);
}
