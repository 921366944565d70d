//! Error taxonomy shared across the backend

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced across crate boundaries, grouped by kind rather than by
/// origin. Local recovery rules: a failed payload decode falls back to the
/// classifier, a failed adjudication falls back to the raw classifier result,
/// and blocks are never discarded because review failed.
#[derive(Error, Debug)]
pub enum Error {
    /// Empty input, unsupported file type, missing paste anchor.
    #[error("input error: {0}")]
    Input(String),

    /// An upstream extractor (DOC/DOCX/PDF) failed.
    #[error("extraction failed: {message}")]
    Extraction {
        message: String,
        /// Extraction attempts in the order they were tried.
        attempts: Vec<String>,
        warnings: Vec<String>,
    },

    /// Malformed marker, base64/JSON failure or checksum mismatch.
    #[error("invalid payload: {0}")]
    Payload(String),

    /// Should not occur; the classifier is pure. Kept so callers can log and
    /// substitute the fallback type instead of unwinding.
    #[error("classification error: {0}")]
    Classification(String),

    /// Network/HTTP failure or a non-2xx adjudicator response.
    #[error("adjudicator error: {0}")]
    Adjudicator(String),

    /// Session memory or feedback store failure.
    #[error("memory error: {0}")]
    Memory(String),

    /// A superseding paste aborted an in-flight review. A status, not a
    /// failure.
    #[error("cancelled")]
    Cancelled,
}

impl Error {
    pub fn input(msg: impl Into<String>) -> Self {
        Error::Input(msg.into())
    }

    pub fn payload(msg: impl Into<String>) -> Self {
        Error::Payload(msg.into())
    }
}
