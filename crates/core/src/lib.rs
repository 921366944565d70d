//! Core types and traits for the Filmlane classification backend
//!
//! This crate provides foundational types used across all other crates:
//! - The screenplay block taxonomy and block model
//! - Classified-line records and classification results
//! - Line relations, dialogue blocks and the context window record
//! - The reviewer packet / adjudicator contract types
//! - Error types
//! - Capability traits for pluggable classifiers, confirmation dialogs and
//!   external adjudicators

pub mod block;
pub mod classify;
pub mod correction;
pub mod error;
pub mod relation;
pub mod review;
pub mod spacing;
pub mod traits;

pub use block::{Block, FormatId};
pub use classify::{Classification, ClassificationMethod, ClassifiedLine};
pub use correction::Correction;
pub use error::{Error, Result};
pub use relation::{ContextWindow, DialogueBlockSpan, LineRelation, RelationKind};
pub use review::{
    ReviewContextLine, ReviewDecision, ReviewFinding, ReviewOutcome, ReviewPacket, SuspiciousLine,
};
pub use spacing::margin_top_pt;
pub use traits::{Adjudicator, ConfirmationCallback, LineClassifier};
