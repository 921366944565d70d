//! Narrative decision resolver
//!
//! When no pattern short-circuit applies, a line is one of three things:
//! stage direction (`action`), speech (`dialogue`) or a speaker cue
//! (`character`). A speaker cue always ends in `:`, so a line passing the
//! character gate wins outright; otherwise the gated dialogue and action
//! candidates compete on score, with a context-aware tie-break when they
//! land within 1.5 points.

use crate::config::ClassifierConfig;
use crate::context::LineContext;
use crate::signals::{dialogue_score, has_direct_dialogue_signals, history_score, ActionSignals};
use filmlane_core::{Classification, ClassificationMethod, FormatId};
use filmlane_text::patterns::{
    ARABIC_ONLY_WITH_NUMBERS_RE, CHARACTER_RE, NON_CHARACTER_SINGLE_TOKENS, NON_NAME_TOKENS,
    SCENE_LOCATION_RE, SCENE_NUMBER_RE, SCENE_TIME_RE, SHORT_DIALOGUE_WORDS, TRANSITION_RE,
    VOCATIVE_RE, VOCATIVE_TITLES_RE,
};
use filmlane_text::{has_sentence_punctuation, normalize_character_name};

const TIE_GAP: f32 = 1.5;

/// A line no candidate wants is narration; the safest reading.
const FALLBACK_REASON: &str = "fallback:no-candidate";

#[derive(Debug, Clone, Copy)]
struct Candidate {
    format: FormatId,
    score: i32,
}

/// Whether a normalized, colon-free string is shaped like a speaker name.
pub fn is_plausible_name(name: &str, max_tokens: usize) -> bool {
    if name.is_empty() || name.chars().count() > 32 {
        return false;
    }
    if !ARABIC_ONLY_WITH_NUMBERS_RE.is_match(name) {
        return false;
    }
    let tokens: Vec<&str> = name.split_whitespace().collect();
    if tokens.is_empty() || tokens.len() > max_tokens {
        return false;
    }
    if tokens.iter().any(|t| NON_NAME_TOKENS.contains(*t)) {
        return false;
    }
    if tokens.len() == 1 && NON_CHARACTER_SINGLE_TOKENS.contains(tokens[0]) {
        return false;
    }
    if SHORT_DIALOGUE_WORDS.contains(name) {
        return false;
    }
    true
}

/// The character gate. A speaker cue ends in `:`, without exception; the
/// rest of the checks keep scene words, speech and punctuated text out.
fn character_gate(line: &str, ctx: &LineContext) -> bool {
    if !line.ends_with(':') {
        return false;
    }
    if !CHARACTER_RE.is_match(line) {
        return false;
    }
    let name = normalize_character_name(line);
    if !is_plausible_name(&name, 5) {
        return false;
    }
    if has_sentence_punctuation(&name) {
        return false;
    }
    if VOCATIVE_RE.is_match(line) || VOCATIVE_TITLES_RE.is_match(line) {
        return false;
    }
    if has_direct_dialogue_signals(line) {
        return false;
    }
    if ctx.flags.is_in_scene_header && ctx.last_type() != Some(FormatId::SceneHeader2) {
        return false;
    }
    true
}

fn is_hard_dialogue_breaker(line: &str, ctx: &LineContext) -> bool {
    SCENE_NUMBER_RE.is_match(line)
        || (SCENE_TIME_RE.is_match(line) && SCENE_LOCATION_RE.is_match(line))
        || TRANSITION_RE.is_match(line)
        || character_gate(line, ctx)
}

fn dialogue_gate(line: &str, ctx: &LineContext, signals: &ActionSignals, dscore: i32) -> bool {
    if is_hard_dialogue_breaker(line, ctx) {
        return false;
    }
    if ctx.flags.is_in_dialogue_block {
        return true;
    }
    if has_direct_dialogue_signals(line) {
        return true;
    }
    matches!(
        ctx.last_type(),
        Some(FormatId::Character) | Some(FormatId::Parenthetical) | Some(FormatId::Dialogue)
    ) && dscore >= 3
        && !signals.is_strong()
}

fn action_gate(ctx: &LineContext, signals: &ActionSignals, dscore: i32) -> bool {
    if !signals.any() {
        return false;
    }
    if ctx.flags.is_in_dialogue_block && !signals.is_strong() {
        return false;
    }
    // A weak signal loses to a clearly conversational context.
    !(dscore - signals.score() >= 4 && !signals.is_strong())
}

fn dialogue_candidate_score(
    line: &str,
    ctx: &LineContext,
    signals: &ActionSignals,
    dscore: i32,
) -> i32 {
    let mut score = 6 + dscore.clamp(0, 6);
    score += history_score(
        &ctx.previous_types,
        &[FormatId::Character, FormatId::Dialogue, FormatId::Parenthetical],
    )
    .min(4);
    if has_direct_dialogue_signals(line) {
        score += 2;
    }
    if line.contains('?') || line.contains('؟') || line.contains('!') {
        score += 1;
    }
    if ctx.flags.is_in_dialogue_block {
        score += 3;
    }
    if signals.is_strong() {
        score -= 2;
    }
    score
}

fn action_candidate_score(line: &str, ctx: &LineContext, signals: &ActionSignals) -> i32 {
    let mut score = 6 + history_score(&ctx.previous_types, &[FormatId::Action]).min(5);
    score += signals.score();

    let dialogue_history = history_score(
        &ctx.previous_types,
        &[FormatId::Character, FormatId::Dialogue, FormatId::Parenthetical],
    );
    if has_direct_dialogue_signals(line) && !signals.is_strong() {
        score -= 3;
    }
    if dialogue_history >= 4 && !signals.is_strong() {
        score -= 2;
    }
    if ctx.flags.is_in_dialogue_block
        && ctx.last_type() == Some(FormatId::Dialogue)
        && signals.score() <= 2
    {
        score -= 2;
    }
    score
}

fn confidence_for(score: i32) -> u8 {
    (60 + 2 * score.max(0)).min(92) as u8
}

/// Decide between action, dialogue and character for a line no pattern
/// short-circuit claimed.
pub fn resolve_narrative(
    line: &str,
    ctx: &LineContext,
    config: &ClassifierConfig,
) -> Classification {
    let signals = ActionSignals::collect(line);
    let dscore = dialogue_score(line, ctx);

    // Strong override: a well-formed name with its colon is a speaker cue.
    if character_gate(line, ctx) {
        return Classification::new(
            FormatId::Character,
            95,
            "gate:character-with-colon",
            ClassificationMethod::Regex,
        );
    }

    let mut candidates: Vec<Candidate> = Vec::with_capacity(2);
    if dialogue_gate(line, ctx, &signals, dscore) {
        candidates.push(Candidate {
            format: FormatId::Dialogue,
            score: dialogue_candidate_score(line, ctx, &signals, dscore),
        });
    }
    if action_gate(ctx, &signals, dscore) {
        candidates.push(Candidate {
            format: FormatId::Action,
            score: action_candidate_score(line, ctx, &signals),
        });
    }

    if candidates.is_empty() {
        return Classification::new(
            FormatId::Action,
            config.fallback_confidence,
            FALLBACK_REASON,
            ClassificationMethod::Fallback,
        );
    }

    candidates.sort_by(|a, b| b.score.cmp(&a.score));
    let best = candidates[0];
    let runner_up = candidates.get(1);

    if let Some(second) = runner_up {
        if (best.score - second.score) as f32 <= TIE_GAP {
            if ctx.flags.is_in_dialogue_block
                && candidates.iter().any(|c| c.format == FormatId::Dialogue)
            {
                return Classification::new(
                    FormatId::Dialogue,
                    65,
                    "tie:dialogue-context",
                    ClassificationMethod::Context,
                );
            }
            if candidates.iter().any(|c| c.format == FormatId::Action) {
                return Classification::new(
                    FormatId::Action,
                    58,
                    "tie:safe-action",
                    ClassificationMethod::Context,
                );
            }
        }
    }

    Classification::new(
        best.format,
        confidence_for(best.score),
        "score:max",
        ClassificationMethod::Context,
    )
}
