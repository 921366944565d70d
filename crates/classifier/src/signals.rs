//! Evidence collectors feeding the narrative decision resolver

use crate::context::LineContext;
use filmlane_core::FormatId;
use filmlane_text::patterns::{
    ACTION_VERB_FOLLOWED_BY_NAME_AND_VERB_RE, AUDIO_NARRATIVE_RE, CONVERSATIONAL_MARKERS_RE,
    CONVERSATIONAL_STARTS, PRONOUN_ACTION_RE, QUOTE_MARKS_RE, SCENE_LOCATION_RE, SCENE_NUMBER_RE,
    SCENE_TIME_RE, THEN_ACTION_RE, VOCATIVE_RE, VOCATIVE_TITLES_RE,
};
use filmlane_text::{
    has_action_verb_structure, is_action_cue_line, is_action_verb_start, is_action_with_dash,
    is_imperative_start, matches_action_start_pattern,
};

/// Narrative-action evidence for one line, each signal scored independently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionSignals {
    pub dash: bool,
    pub start_pattern: bool,
    pub verb_start: bool,
    pub verb_structure: bool,
    pub narrative_syntax: bool,
    pub pronoun_action: bool,
    pub then_action: bool,
    pub cue: bool,
    pub audio_narrative: bool,
}

impl ActionSignals {
    pub fn collect(line: &str) -> Self {
        Self {
            dash: is_action_with_dash(line),
            start_pattern: matches_action_start_pattern(line),
            verb_start: is_action_verb_start(line),
            verb_structure: has_action_verb_structure(line),
            narrative_syntax: ACTION_VERB_FOLLOWED_BY_NAME_AND_VERB_RE.is_match(line),
            pronoun_action: PRONOUN_ACTION_RE.is_match(line),
            then_action: THEN_ACTION_RE.is_match(line),
            cue: is_action_cue_line(line),
            audio_narrative: AUDIO_NARRATIVE_RE.is_match(line),
        }
    }

    /// Weighted sum of all present signals.
    pub fn score(&self) -> i32 {
        let mut score = 0;
        if self.dash {
            score += 4;
        }
        if self.start_pattern {
            score += 3;
        }
        if self.verb_start {
            score += 2;
        }
        if self.verb_structure {
            score += 2;
        }
        if self.narrative_syntax {
            score += 3;
        }
        if self.pronoun_action {
            score += 3;
        }
        if self.then_action {
            score += 2;
        }
        if self.cue {
            score += 2;
        }
        if self.audio_narrative {
            score += 3;
        }
        score
    }

    pub fn any(&self) -> bool {
        self.score() > 0
    }

    /// Signals strong enough to assert narration even inside a dialogue block.
    pub fn is_strong(&self) -> bool {
        self.dash
            || self.start_pattern
            || self.pronoun_action
            || self.then_action
            || self.audio_narrative
            || self.narrative_syntax
            || self.verb_start
    }
}

/// Integer heuristic for how much a line reads like speech.
pub fn dialogue_score(line: &str, ctx: &LineContext) -> i32 {
    let mut score = 0;
    let verb_led =
        is_action_verb_start(line) || ACTION_VERB_FOLLOWED_BY_NAME_AND_VERB_RE.is_match(line);

    if line.contains('?') || line.contains('؟') {
        score += if verb_led { 1 } else { 3 };
    }
    if line.contains('!') {
        score += 2;
    }
    if line.contains('…') || line.contains("...") {
        score += 1;
    }

    if VOCATIVE_RE.is_match(line) {
        score += 4;
    } else if VOCATIVE_TITLES_RE.is_match(line) {
        score += 2;
    }

    let first = line.split_whitespace().next().unwrap_or("");
    if CONVERSATIONAL_STARTS.contains(first) {
        score += 2;
    } else if CONVERSATIONAL_MARKERS_RE.is_match(line) {
        score += 1;
    }

    if QUOTE_MARKS_RE.is_match(line) {
        score += 2;
    }

    let len = line.chars().count();
    if len > 5 && len < 150 {
        score += 1;
    }

    if SCENE_NUMBER_RE.is_match(line)
        || (SCENE_TIME_RE.is_match(line) && SCENE_LOCATION_RE.is_match(line))
    {
        score -= 10;
    }

    if is_action_verb_start(line) {
        score -= if ctx.flags.is_in_dialogue_block { 1 } else { 3 };
    }

    if is_imperative_start(line)
        && matches!(
            ctx.last_type(),
            Some(FormatId::Character) | Some(FormatId::Dialogue) | Some(FormatId::Parenthetical)
        )
    {
        score += 3;
    }

    score
}

/// Direct speech markers that contradict a narration reading.
pub fn has_direct_dialogue_signals(line: &str) -> bool {
    QUOTE_MARKS_RE.is_match(line)
        || VOCATIVE_RE.is_match(line)
        || line.contains('?')
        || line.contains('؟')
        || line.contains('!')
}

/// Recency-weighted count of `targets` among the last 10 assigned types.
/// Positions 0–1 (most recent) score 3, 2–4 score 2, older score 1.
pub fn history_score(previous_types: &[FormatId], targets: &[FormatId]) -> i32 {
    previous_types
        .iter()
        .rev()
        .take(10)
        .enumerate()
        .filter(|(_, t)| targets.contains(t))
        .map(|(pos, _)| match pos {
            0 | 1 => 3,
            2..=4 => 2,
            _ => 1,
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx_with(types: &[FormatId]) -> LineContext {
        let lines: Vec<String> = (0..=types.len()).map(|i| format!("سطر {i}")).collect();
        LineContext::build(&lines, types.len(), types)
    }

    #[test]
    fn test_action_signals_weights() {
        let s = ActionSignals::collect("- ينظر حوله");
        assert!(s.dash);
        assert!(s.is_strong());

        let s = ActionSignals::collect("يرفع محمود يده معترضا");
        assert!(s.narrative_syntax);
        assert!(s.verb_start);
        assert!(s.score() >= 5);

        let s = ActionSignals::collect("انا معاك");
        assert_eq!(s.score(), 0);
        assert!(!s.is_strong());
    }

    #[test]
    fn test_audio_narrative() {
        let s = ActionSignals::collect("صوت سيارة تقترب من بعيد");
        assert!(s.audio_narrative);
        assert!(s.is_strong());
    }

    #[test]
    fn test_dialogue_score_vocative() {
        let ctx = ctx_with(&[FormatId::Character]);
        let score = dialogue_score("مرحباً يا سارة", &ctx);
        assert!(score >= 5, "vocative plus length should score high, got {score}");
    }

    #[test]
    fn test_dialogue_score_scene_header_penalty() {
        let ctx = ctx_with(&[]);
        assert!(dialogue_score("مشهد 4", &ctx) < 0);
    }

    #[test]
    fn test_dialogue_score_question_downweighted_when_verb_led() {
        let ctx = ctx_with(&[]);
        let spoken = dialogue_score("انت رايح فين؟", &ctx);
        let narrated = dialogue_score("ينظر حوله؟", &ctx);
        assert!(spoken > narrated);
    }

    #[test]
    fn test_imperative_bonus_needs_dialogue_context() {
        let after_character = ctx_with(&[FormatId::Character]);
        let cold = ctx_with(&[FormatId::Action]);
        assert!(
            dialogue_score("تعال هنا", &after_character) > dialogue_score("تعال هنا", &cold)
        );
    }

    #[test]
    fn test_history_score_recency() {
        let types = vec![FormatId::Action, FormatId::Character, FormatId::Dialogue];
        // dialogue at pos 0 (3), character at pos 1 (3)
        assert_eq!(
            history_score(&types, &[FormatId::Character, FormatId::Dialogue]),
            6
        );
        // action at pos 2
        assert_eq!(history_score(&types, &[FormatId::Action]), 2);
        assert_eq!(history_score(&[], &[FormatId::Action]), 0);
    }
}
