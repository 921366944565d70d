//! Structural line splits applied before classification
//!
//! Some source lines hold more than one block: a bullet line carrying
//! `<name> : <text>`, a cue glued to a speaker, an action prefix welded onto
//! a character cue. These helpers decompose them; the pipeline emits the
//! parts as separate items in textual order.

use filmlane_classifier::{is_plausible_name, LineContext};
use filmlane_text::patterns::{
    CHARACTER_STOP_WORDS, INLINE_DIALOGUE_GLUE_RE, INLINE_DIALOGUE_RE, SCENE_STATUS_WORDS,
};
use filmlane_text::{
    has_sentence_punctuation, is_action_cue_line, matches_action_start_pattern,
    normalize_character_name,
};
use std::collections::HashSet;

/// The parts of an inline speaker line, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineSplit {
    /// Leading performance cue, emitted as action when present.
    pub cue: Option<String>,
    /// Speaker cue including the trailing colon.
    pub character: String,
    pub dialogue: String,
}

/// `<name> : <dialogue>` with a plausible speaker, or the stricter glued
/// `(cue)<name>: <dialogue>` form.
pub fn parse_inline_character_dialogue(line: &str) -> Option<InlineSplit> {
    if let Some(caps) = INLINE_DIALOGUE_GLUE_RE.captures(line) {
        let cue = caps.get(1).unwrap().as_str().trim();
        let name = caps.get(2).unwrap().as_str().trim();
        let dialogue = caps.get(3).unwrap().as_str().trim();
        // The glued form is easy to fake; only a known cue and a clean name
        // qualify.
        if is_action_cue_line(cue) && is_plausible_name(name, 4) && !dialogue.is_empty() {
            return Some(InlineSplit {
                cue: Some(cue.to_string()),
                character: format!("{name}:"),
                dialogue: dialogue.to_string(),
            });
        }
        return None;
    }

    let caps = INLINE_DIALOGUE_RE.captures(line)?;
    let name = caps.get(1).unwrap().as_str().trim();
    let dialogue = caps.get(2).unwrap().as_str().trim();
    if dialogue.is_empty() || !is_plausible_name(name, 4) {
        return None;
    }
    Some(InlineSplit {
        cue: None,
        character: format!("{name}:"),
        dialogue: dialogue.to_string(),
    })
}

/// Colon-less speaker split available only inside a dialogue block: the line
/// opens with a name already known as a speaker and continues with speech.
/// Requiring a known name keeps ordinary dialogue openings intact.
pub fn implicit_character_dialogue(
    line: &str,
    ctx: &LineContext,
    known_names: &HashSet<String>,
) -> Option<(String, String)> {
    if !ctx.flags.is_in_dialogue_block || line.contains(':') {
        return None;
    }
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 2 {
        return None;
    }
    for name_len in (1..=3.min(tokens.len() - 1)).rev() {
        let name = tokens[..name_len].join(" ");
        let tail = tokens[name_len..].join(" ");
        if !is_plausible_name(&name, 3) || !known_names.contains(&name) {
            continue;
        }
        let tail_is_speech = filmlane_classifier::signals::dialogue_score(&tail, ctx) >= 3
            && !filmlane_classifier::signals::ActionSignals::collect(&tail).is_strong();
        if tail_is_speech {
            return Some((format!("{name}:"), tail));
        }
    }
    None
}

/// `وهو/وهي` action prefix welded to a character cue: the last tokens form a
/// valid name ending in `:`, the leading tokens a narrative opening.
pub fn split_action_prefixed_character(line: &str) -> Option<(String, String)> {
    if !line.ends_with(':') {
        return None;
    }
    let starts_with_prefix = ["وهو ", "وهي ", "ثم وهو ", "ثم وهي "]
        .iter()
        .any(|p| line.starts_with(p));
    if !starts_with_prefix {
        return None;
    }

    let without_colon = line.trim_end_matches(':').trim_end();
    let tokens: Vec<&str> = without_colon.split_whitespace().collect();
    if tokens.len() < 2 {
        return None;
    }
    for name_len in 1..=3.min(tokens.len() - 1) {
        let split_at = tokens.len() - name_len;
        let action = tokens[..split_at].join(" ");
        let name = tokens[split_at..].join(" ");
        if !matches_action_start_pattern(&action) {
            continue;
        }
        let name_normalized = normalize_character_name(&name);
        if is_plausible_name(&name_normalized, 3) && !has_sentence_punctuation(&name_normalized) {
            return Some((action, format!("{name_normalized}:")));
        }
    }
    None
}

/// Bullet/speaker decomposition used by the import preprocessor: a plausible
/// speaker cue in front of its text becomes two lines.
pub fn is_import_speaker(name: &str) -> bool {
    let chars = name.chars().count();
    if chars > 28 {
        return false;
    }
    let tokens: Vec<&str> = name.split_whitespace().collect();
    if tokens.is_empty() || tokens.len() > 4 {
        return false;
    }
    if !name
        .chars()
        .all(|c| c.is_alphanumeric() || c.is_whitespace())
    {
        return false;
    }
    !tokens.iter().any(|t| {
        CHARACTER_STOP_WORDS.contains(*t) || SCENE_STATUS_WORDS.contains(*t)
    })
}
