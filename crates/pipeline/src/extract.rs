//! Plain-text extraction from pasted payloads
//!
//! Pastes may carry HTML from other editors and editor-internal artifact
//! tokens. Block-level closers become line breaks, every other tag is
//! dropped, entities are unescaped and NBSP becomes a plain space.

use once_cell::sync::Lazy;
use regex::Regex;

/// Editor artifact tokens like `@dom-element:block-17`.
static DOM_ARTIFACT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"@dom-element:\S+").unwrap());

static BLOCK_CLOSER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</(?:div|p|li|h[1-6]|tr)>|<br\s*/?>").unwrap());

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

fn unescape_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// Reduce a raw paste to plain text with `\n` line structure.
pub fn extract_plain_text(raw: &str) -> String {
    let without_artifacts = DOM_ARTIFACT_RE.replace_all(raw, "");
    let text = if without_artifacts.contains('<') {
        let with_breaks = BLOCK_CLOSER_RE.replace_all(&without_artifacts, "\n");
        let stripped = TAG_RE.replace_all(&with_breaks, "");
        unescape_entities(&stripped)
    } else {
        unescape_entities(&without_artifacts)
    };
    text.replace('\u{00A0}', " ")
}
