//! Block/HTML conversion and the payload exchange format
//!
//! Two surfaces live here:
//! - The HTML fragment surface used by the editor: one `div` per block, with
//!   the single composite case of a tier-1 + tier-2 scene header pair wrapped
//!   in a top-line element.
//! - The signed payload embedded in exports so a round-trip restores the
//!   exact block sequence: versioned JSON, FNV-1a checksum, base64, marker.
//!
//! Codec failures are values ([`CodecError`]), never panics.

pub mod fnv;
pub mod html;
pub mod payload;

pub use fnv::fnv1a_hex;
pub use html::{blocks_to_html, html_to_blocks};
pub use payload::{
    build_marker, decode_payload, encode_payload, extract_marker, Payload, PAYLOAD_VERSION,
};

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CodecError {
    /// Malformed marker, base64, JSON shape or unknown format id.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// The embedded checksum does not match the content.
    #[error("payload checksum mismatch")]
    ChecksumMismatch,
}

impl From<CodecError> for filmlane_core::Error {
    fn from(err: CodecError) -> Self {
        filmlane_core::Error::Payload(err.to_string())
    }
}
