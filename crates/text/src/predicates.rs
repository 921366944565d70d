//! Boolean predicates over normalized lines
//!
//! Contracts follow the pattern tables in [`crate::patterns`]; each predicate
//! is deterministic and total.

use crate::patterns::{
    ACTION_CUE_RE, ACTION_VERB_FOLLOWED_BY_NAME_AND_VERB_RE, FULL_ACTION_VERB_SET,
    IMPERATIVE_VERB_SET, MASDAR_PREFIX_RE, PARENTHETICAL_RE, PRONOUN_ACTION_RE, THEN_ACTION_RE,
    VERB_WITH_PRONOUN_SUFFIX_RE,
};
use crate::normalize::normalize_line;

/// Sentence punctuation that disqualifies speaker cues and tier-3 headers.
pub fn has_sentence_punctuation(line: &str) -> bool {
    line.chars()
        .any(|c| matches!(c, '.' | '!' | '?' | '؟' | '؛' | '،' | ',' | '…'))
}

/// A stage direction introduced by a leading dash.
pub fn is_action_with_dash(line: &str) -> bool {
    let trimmed = line.trim_start();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some('-') | Some('–') | Some('—') => !chars.as_str().trim().is_empty(),
        _ => false,
    }
}

/// First token is a known narrative verb, allowing one leading particle from
/// `و`, `ف`, `ل`.
pub fn is_action_verb_start(line: &str) -> bool {
    let Some(first) = line.split_whitespace().next() else {
        return false;
    };
    if FULL_ACTION_VERB_SET.contains(first) {
        return true;
    }
    let mut chars = first.chars();
    match chars.next() {
        Some('و') | Some('ف') | Some('ل') => FULL_ACTION_VERB_SET.contains(chars.as_str()),
        _ => false,
    }
}

/// Line opens with a narrative construction: pronoun+verb, `ثم`+verb, or a
/// verbal-noun prefix.
pub fn matches_action_start_pattern(line: &str) -> bool {
    PRONOUN_ACTION_RE.is_match(line)
        || THEN_ACTION_RE.is_match(line)
        || MASDAR_PREFIX_RE.is_match(line)
}

/// Verb-subject-verb narration, or a verb with an attached object pronoun in
/// a verb-led line.
pub fn has_action_verb_structure(line: &str) -> bool {
    if ACTION_VERB_FOLLOWED_BY_NAME_AND_VERB_RE.is_match(line) {
        return true;
    }
    is_action_verb_start(line) && VERB_WITH_PRONOUN_SUFFIX_RE.is_match(line)
}

/// The entire line (parentheses allowed) is a short performance cue.
pub fn is_action_cue_line(line: &str) -> bool {
    let inner = line
        .trim()
        .trim_start_matches(['(', '（'])
        .trim_end_matches([')', '）'])
        .trim();
    ACTION_CUE_RE.is_match(inner)
}

/// First token is an imperative addressed at another character.
pub fn is_imperative_start(line: &str) -> bool {
    line.split_whitespace()
        .next()
        .is_some_and(|first| IMPERATIVE_VERB_SET.contains(first))
}

/// A line entirely wrapped in parentheses.
pub fn is_parenthetical_line(line: &str) -> bool {
    PARENTHETICAL_RE.is_match(line.trim())
}

/// The opening invocation, tolerant of surrounding brackets and decoration.
pub fn is_basmala(line: &str) -> bool {
    let cleaned: String = normalize_line(line)
        .chars()
        .filter(|c| !matches!(c, '{' | '}' | '[' | ']' | '(' | ')' | '（' | '）' | '<' | '>'))
        .collect();
    cleaned.contains("بسم")
        && cleaned.contains("الله")
        && (cleaned.contains("الرحمن") || cleaned.contains("الرحيم"))
}
