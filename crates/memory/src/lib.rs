//! Session memory and feedback persistence
//!
//! A process-wide key-value surface backs two records:
//! - Per-session screenplay memory (`screenplay-memory-<sid>`): common
//!   characters, dialogue tallies, recent classification types, relations,
//!   confidences and user corrections, each with a hard cap.
//! - The append-only correction log (`screenplay-user-corrections`) feeding
//!   future retraining.
//!
//! Reads and writes are whole-record; there are no partial updates. The
//! memory informs classification heuristics but can never override the
//! deterministic rules.

pub mod feedback;
pub mod session;
pub mod store;

pub use feedback::{FeedbackStore, TrainingExample, CORRECTIONS_KEY};
pub use session::{is_valid_memory_character_name, SessionData, SessionMemory, SessionRecord};
pub use store::{InMemoryStore, JsonFileStore, KeyValueStore};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("store i/o: {0}")]
    Io(#[from] std::io::Error),

    #[error("record encoding: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl From<MemoryError> for filmlane_core::Error {
    fn from(err: MemoryError) -> Self {
        filmlane_core::Error::Memory(err.to_string())
    }
}
