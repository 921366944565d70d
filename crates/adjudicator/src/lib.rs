//! External review client
//!
//! Posts the reviewer packet to `POST /api/agent/review` and maps the
//! response onto [`ReviewOutcome`]. A per-session abort handle lets a new
//! paste cancel the previous in-flight request; an aborted request resolves
//! to `Skipped`, never an error. Network and HTTP failures collapse to the
//! `Error` outcome, schema mismatches to `Skipped`; the caller keeps its
//! classifier result either way.

pub mod client;
pub mod wire;

pub use client::{AdjudicatorConfig, HttpAdjudicator};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdjudicatorError {
    #[error("network: {0}")]
    Network(String),

    #[error("http {status}: {body}")]
    Http { status: u16, body: String },

    #[error("response shape: {0}")]
    Shape(String),
}

impl From<reqwest::Error> for AdjudicatorError {
    fn from(err: reqwest::Error) -> Self {
        AdjudicatorError::Network(err.to_string())
    }
}

impl From<AdjudicatorError> for filmlane_core::Error {
    fn from(err: AdjudicatorError) -> Self {
        filmlane_core::Error::Adjudicator(err.to_string())
    }
}
