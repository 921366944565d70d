//! Arabic screenplay patterns, lexicons and text normalization
//!
//! Everything here is deterministic and allocation-light: regex tables are
//! compiled once behind lazies, closed word sets are static, and the
//! normalization functions are pure. Arabic character classes use explicit
//! Unicode ranges; none of the patterns rely on ASCII `\w`.

pub mod normalize;
pub mod patterns;
pub mod predicates;

pub use normalize::{
    clean_invisible_chars, normalize_character_name, normalize_line, strip_leading_bullets,
};
pub use predicates::{
    has_action_verb_structure, has_sentence_punctuation, is_action_cue_line, is_action_verb_start,
    is_action_with_dash, is_basmala, is_imperative_start, is_parenthetical_line,
    matches_action_start_pattern,
};

/// Canonical rendering of the opening invocation.
pub const BASMALA_CANONICAL: &str = "بسم الله الرحمن الرحيم";
