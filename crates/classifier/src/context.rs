//! Per-pass context model
//!
//! [`ContextTracker`] accumulates the assigned types of a pass and maintains
//! the append-only [`ContextWindow`] record: relation edges, the confidence
//! map and dialogue-block spans. [`LineContext`] is the radius-10 neighborhood
//! handed to the classifier for one line.

use filmlane_core::{ContextWindow, DialogueBlockSpan, FormatId, LineRelation};
use unicode_segmentation::UnicodeSegmentation;

/// Radius of the sliding window, in lines.
pub const WINDOW_RADIUS: usize = 10;

/// Surface statistics of one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineStats {
    pub word_count: usize,
    pub char_count: usize,
    pub has_colon: bool,
    pub has_punctuation: bool,
    pub starts_with_bullet: bool,
    /// Under 30 characters.
    pub is_short: bool,
    /// Over 100 characters.
    pub is_long: bool,
}

impl LineStats {
    pub fn of(line: &str) -> Self {
        let char_count = line.chars().count();
        Self {
            word_count: line.unicode_words().count(),
            char_count,
            has_colon: line.contains(':'),
            has_punctuation: filmlane_text::has_sentence_punctuation(line),
            starts_with_bullet: line
                .chars()
                .next()
                .is_some_and(|c| matches!(c, '•' | '◦' | '▪' | '●' | '‣' | '·' | '○' | '*' | '-' | '–' | '—')),
            is_short: char_count < 30,
            is_long: char_count > 100,
        }
    }
}

/// Positional pattern flags derived from the previously assigned types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternFlags {
    pub is_in_dialogue_block: bool,
    /// The previous line was a tier-1/tier-2 header (tier 3 closes a header).
    pub is_in_scene_header: bool,
    /// Lines since the last scene header, `-1` if none.
    pub last_scene_distance: i64,
    /// Lines since the last character cue, `-1` if none.
    pub last_character_distance: i64,
}

/// Everything the classifier may inspect when deciding one line.
#[derive(Debug, Clone)]
pub struct LineContext {
    pub line_index: usize,
    /// Up to [`WINDOW_RADIUS`] preceding lines, oldest first.
    pub previous_lines: Vec<String>,
    /// Up to [`WINDOW_RADIUS`] following lines, nearest first.
    pub next_lines: Vec<String>,
    /// All previously assigned types of this pass, oldest first.
    pub previous_types: Vec<FormatId>,
    pub stats: LineStats,
    pub flags: PatternFlags,
}

impl LineContext {
    /// Build the context for `lines[i]` given the types assigned so far.
    pub fn build(lines: &[String], i: usize, previous_types: &[FormatId]) -> Self {
        let start = i.saturating_sub(WINDOW_RADIUS);
        let end = (i + 1 + WINDOW_RADIUS).min(lines.len());
        let previous_lines = lines[start..i].to_vec();
        let next_lines = lines[(i + 1).min(lines.len())..end].to_vec();

        let flags = PatternFlags {
            is_in_dialogue_block: in_dialogue_block(previous_types),
            is_in_scene_header: matches!(
                previous_types.last(),
                Some(FormatId::SceneHeader1)
                    | Some(FormatId::SceneHeader2)
                    | Some(FormatId::SceneHeaderTopLine)
            ),
            last_scene_distance: distance_to_last(previous_types, |t| t.is_scene_header()),
            last_character_distance: distance_to_last(previous_types, |t| {
                *t == FormatId::Character
            }),
        };

        Self {
            line_index: i,
            previous_lines,
            next_lines,
            previous_types: previous_types.to_vec(),
            stats: LineStats::of(&lines[i]),
            flags,
        }
    }

    pub fn last_type(&self) -> Option<FormatId> {
        self.previous_types.last().copied()
    }
}

fn distance_to_last(types: &[FormatId], pred: impl Fn(&FormatId) -> bool) -> i64 {
    match types.iter().rposition(pred) {
        Some(pos) => (types.len() - 1 - pos) as i64,
        None => -1,
    }
}

/// A dialogue block stays open through character, dialogue and parenthetical
/// lines once a character cue has started it.
fn in_dialogue_block(types: &[FormatId]) -> bool {
    for t in types.iter().rev() {
        match t {
            FormatId::Character => return true,
            FormatId::Dialogue | FormatId::Parenthetical => continue,
            _ => return false,
        }
    }
    false
}

/// Accumulates assigned types and the context-window record for one pass.
#[derive(Debug, Default)]
pub struct ContextTracker {
    types: Vec<FormatId>,
    window: ContextWindow,
    /// Index into `window.dialogue_blocks` of the open block, if any.
    open_block: Option<usize>,
    /// Line index of the previously advanced line.
    last_line: Option<usize>,
}

impl ContextTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn previous_types(&self) -> &[FormatId] {
        &self.types
    }

    pub fn window(&self) -> &ContextWindow {
        &self.window
    }

    pub fn into_window(self) -> ContextWindow {
        self.window
    }

    /// Record one emitted line: append its type, emit the relation edge from
    /// the previous line, track dialogue blocks and store the confidence.
    pub fn advance(&mut self, line_index: usize, assigned: FormatId, text: &str, confidence: u8) {
        if let (Some(prev_line), Some(prev_type)) = (self.last_line, self.types.last().copied()) {
            if let Some(kind) = ContextWindow::relation_for(prev_type, assigned) {
                self.window.line_relationships.push(LineRelation {
                    from: prev_line,
                    to: line_index,
                    kind,
                });
            }
        }

        match assigned {
            FormatId::Character => {
                let name = filmlane_text::normalize_character_name(text);
                self.window.dialogue_blocks.push(DialogueBlockSpan {
                    character: name,
                    start_line: line_index,
                    end_line: line_index,
                });
                self.open_block = Some(self.window.dialogue_blocks.len() - 1);
            }
            t if t.is_spoken() => {
                if let Some(idx) = self.open_block {
                    self.window.dialogue_blocks[idx].end_line = line_index;
                }
            }
            _ => {
                self.open_block = None;
            }
        }

        self.window.confidence_map.insert(line_index, confidence);
        self.types.push(assigned);
        self.last_line = Some(line_index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filmlane_core::RelationKind;

    fn lines(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_line_stats() {
        let stats = LineStats::of("أحمد:");
        assert!(stats.has_colon);
        assert!(stats.is_short);
        assert!(!stats.has_punctuation);
        assert_eq!(stats.word_count, 1);
    }

    #[test]
    fn test_window_bounds() {
        let all: Vec<String> = (0..30).map(|i| format!("سطر {i}")).collect();
        let ctx = LineContext::build(&all, 15, &[]);
        assert_eq!(ctx.previous_lines.len(), WINDOW_RADIUS);
        assert_eq!(ctx.next_lines.len(), WINDOW_RADIUS);
        assert_eq!(ctx.previous_lines[0], "سطر 5");
        assert_eq!(ctx.next_lines[0], "سطر 16");

        let ctx = LineContext::build(&all, 0, &[]);
        assert!(ctx.previous_lines.is_empty());
    }

    #[test]
    fn test_distances() {
        let types = vec![
            FormatId::SceneHeader1,
            FormatId::SceneHeader2,
            FormatId::Action,
            FormatId::Character,
            FormatId::Dialogue,
        ];
        let ctx = LineContext::build(&lines(&["a", "b", "c", "d", "e", "f"]), 5, &types);
        assert_eq!(ctx.flags.last_scene_distance, 3);
        assert_eq!(ctx.flags.last_character_distance, 1);
        assert!(ctx.flags.is_in_dialogue_block);
        assert!(!ctx.flags.is_in_scene_header);
    }

    #[test]
    fn test_missing_distance_is_negative() {
        let ctx = LineContext::build(&lines(&["a"]), 0, &[]);
        assert_eq!(ctx.flags.last_scene_distance, -1);
        assert_eq!(ctx.flags.last_character_distance, -1);
    }

    #[test]
    fn test_tracker_relations_and_blocks() {
        let mut tracker = ContextTracker::new();
        tracker.advance(0, FormatId::Character, "أحمد:", 95);
        tracker.advance(1, FormatId::Dialogue, "مرحباً يا سارة", 85);
        tracker.advance(2, FormatId::Dialogue, "ازيك", 85);
        tracker.advance(3, FormatId::Action, "يدخل أحمد", 90);

        let window = tracker.window();
        assert_eq!(
            window.line_relationships,
            vec![
                LineRelation { from: 0, to: 1, kind: RelationKind::Response },
                LineRelation { from: 1, to: 2, kind: RelationKind::Continuation },
            ]
        );
        assert_eq!(window.dialogue_blocks.len(), 1);
        assert_eq!(window.dialogue_blocks[0].character, "أحمد");
        assert_eq!(window.dialogue_blocks[0].start_line, 0);
        assert_eq!(window.dialogue_blocks[0].end_line, 2);
        assert_eq!(window.confidence_map.get(&3), Some(&90));
    }

    #[test]
    fn test_new_character_closes_previous_block() {
        let mut tracker = ContextTracker::new();
        tracker.advance(0, FormatId::Character, "أحمد:", 95);
        tracker.advance(1, FormatId::Dialogue, "اهلا", 85);
        tracker.advance(2, FormatId::Character, "سارة:", 95);
        tracker.advance(3, FormatId::Dialogue, "اهلا بيك", 85);

        let blocks = &tracker.window().dialogue_blocks;
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].end_line, 1);
        assert_eq!(blocks[1].character, "سارة");
        assert_eq!(blocks[1].end_line, 3);
    }
}
