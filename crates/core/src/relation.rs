//! Line relations, dialogue blocks and the per-pass context window record

use crate::FormatId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Why two adjacent lines belong together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationKind {
    /// Character cue followed by its spoken content.
    Response,
    /// Spoken content continuing spoken content.
    Continuation,
    /// Action line answered by spoken content.
    ActionResult,
}

/// An edge between two classified lines, by line index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRelation {
    pub from: usize,
    pub to: usize,
    pub kind: RelationKind,
}

/// A maximal run of dialogue-family lines opened by a character cue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueBlockSpan {
    pub character: String,
    pub start_line: usize,
    pub end_line: usize,
}

/// Append-only record built during a single pass. The only in-place mutation
/// allowed is extending the currently open dialogue block's `end_line`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextWindow {
    pub line_relationships: Vec<LineRelation>,
    /// Line index → confidence (0–100).
    pub confidence_map: BTreeMap<usize, u8>,
    pub dialogue_blocks: Vec<DialogueBlockSpan>,
}

impl ContextWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Relation kind implied by an adjacent type pair, if any.
    pub fn relation_for(prev: FormatId, current: FormatId) -> Option<RelationKind> {
        if !current.is_spoken() {
            return None;
        }
        match prev {
            FormatId::Character => Some(RelationKind::Response),
            p if p.is_spoken() => Some(RelationKind::Continuation),
            FormatId::Action => Some(RelationKind::ActionResult),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_pairs() {
        assert_eq!(
            ContextWindow::relation_for(FormatId::Character, FormatId::Dialogue),
            Some(RelationKind::Response)
        );
        assert_eq!(
            ContextWindow::relation_for(FormatId::Dialogue, FormatId::Dialogue),
            Some(RelationKind::Continuation)
        );
        assert_eq!(
            ContextWindow::relation_for(FormatId::Parenthetical, FormatId::Dialogue),
            Some(RelationKind::Continuation)
        );
        assert_eq!(
            ContextWindow::relation_for(FormatId::Action, FormatId::Dialogue),
            Some(RelationKind::ActionResult)
        );
        assert_eq!(
            ContextWindow::relation_for(FormatId::Transition, FormatId::Dialogue),
            None
        );
        assert_eq!(
            ContextWindow::relation_for(FormatId::Character, FormatId::Action),
            None
        );
    }

    #[test]
    fn test_relation_kind_serde() {
        let json = serde_json::to_string(&RelationKind::ActionResult).unwrap();
        assert_eq!(json, "\"action-result\"");
    }
}
