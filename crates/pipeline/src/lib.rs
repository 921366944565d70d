//! The paste/import classification pipeline
//!
//! Orchestrates the full path from raw pasted or imported text to an ordered
//! block sequence: plain-text extraction, per-source import repair,
//! line-merge repair, per-line classification with structural splits, block
//! emission with spacing metadata, deferred low-confidence confirmations,
//! the post-classification review round with optional external adjudication,
//! and the final session-memory update.

pub mod extract;
pub mod import;
pub mod merge;
pub mod paste;
pub mod splits;

pub use extract::extract_plain_text;
pub use import::{preprocess_import, ExtractedFormat, ImportResult};
pub use merge::{merge_broken_character_name, wrap_should_merge, MergePolicy};
pub use paste::{
    block_types, EmittedBlock, PasteOutcome, PastePipeline, PasteSource, PipelineConfig,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("memory: {0}")]
    Memory(#[from] filmlane_memory::MemoryError),

    #[error("confirmation callback: {0}")]
    Confirmation(String),
}

impl From<PipelineError> for filmlane_core::Error {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Memory(e) => filmlane_core::Error::Memory(e.to_string()),
            PipelineError::Confirmation(m) => filmlane_core::Error::Input(m),
        }
    }
}
