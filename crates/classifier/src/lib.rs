//! Rule-based screenplay line classification
//!
//! This crate provides:
//! - The per-line rule classifier with its narrative decision resolver
//! - The context model: sliding window, relations, dialogue-block tracking
//! - The post-classification reviewer with its suspicion detectors
//!
//! Classification is pure and synchronous; the same line and context always
//! produce the same verdict. Nothing here performs I/O.

pub mod config;
pub mod context;
pub mod resolver;
pub mod review;
pub mod rules;
pub mod signals;

pub use config::ClassifierConfig;
pub use context::{ContextTracker, LineContext, LineStats, PatternFlags, WINDOW_RADIUS};
pub use resolver::{is_plausible_name, resolve_narrative};
pub use review::{Reviewer, ReviewerConfig};
pub use rules::RuleClassifier;
