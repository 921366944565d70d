//! Screenplay block taxonomy and the block model

use serde::{Deserialize, Serialize};

/// The fixed taxonomy of screenplay elements.
///
/// `SceneHeaderTopLine` is a composite wrapper for an adjacent
/// scene-header-1 + scene-header-2 pair on one visual row. It appears on the
/// HTML and payload surfaces but is never stored as a leaf classified line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FormatId {
    #[serde(rename = "basmala")]
    Basmala,
    #[serde(rename = "scene-header-1")]
    SceneHeader1,
    #[serde(rename = "scene-header-2")]
    SceneHeader2,
    #[serde(rename = "scene-header-3")]
    SceneHeader3,
    #[serde(rename = "scene-header-top-line")]
    SceneHeaderTopLine,
    #[serde(rename = "action")]
    Action,
    #[serde(rename = "character")]
    Character,
    #[serde(rename = "dialogue")]
    Dialogue,
    #[serde(rename = "parenthetical")]
    Parenthetical,
    #[serde(rename = "transition")]
    Transition,
}

impl FormatId {
    /// Stable identifier used in HTML class names and payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            FormatId::Basmala => "basmala",
            FormatId::SceneHeader1 => "scene-header-1",
            FormatId::SceneHeader2 => "scene-header-2",
            FormatId::SceneHeader3 => "scene-header-3",
            FormatId::SceneHeaderTopLine => "scene-header-top-line",
            FormatId::Action => "action",
            FormatId::Character => "character",
            FormatId::Dialogue => "dialogue",
            FormatId::Parenthetical => "parenthetical",
            FormatId::Transition => "transition",
        }
    }

    /// Parse the stable identifier. Unknown strings yield `None`; surfaces
    /// that must tolerate foreign input (HTML import) apply their own default.
    pub fn parse(s: &str) -> Option<FormatId> {
        match s {
            "basmala" => Some(FormatId::Basmala),
            "scene-header-1" => Some(FormatId::SceneHeader1),
            "scene-header-2" => Some(FormatId::SceneHeader2),
            "scene-header-3" => Some(FormatId::SceneHeader3),
            "scene-header-top-line" => Some(FormatId::SceneHeaderTopLine),
            "action" => Some(FormatId::Action),
            "character" => Some(FormatId::Character),
            "dialogue" => Some(FormatId::Dialogue),
            "parenthetical" => Some(FormatId::Parenthetical),
            "transition" => Some(FormatId::Transition),
            _ => None,
        }
    }

    /// All leaf types a classified line may carry.
    pub fn is_leaf(&self) -> bool {
        !matches!(self, FormatId::SceneHeaderTopLine)
    }

    /// Any scene-header tier, including the composite wrapper.
    pub fn is_scene_header(&self) -> bool {
        matches!(
            self,
            FormatId::SceneHeader1
                | FormatId::SceneHeader2
                | FormatId::SceneHeader3
                | FormatId::SceneHeaderTopLine
        )
    }

    /// Character, dialogue or parenthetical. A maximal run of these, opened
    /// by a character line, forms a dialogue block.
    pub fn is_dialogue_family(&self) -> bool {
        matches!(
            self,
            FormatId::Character | FormatId::Dialogue | FormatId::Parenthetical
        )
    }

    /// Dialogue or parenthetical: content spoken or performed under a
    /// character cue.
    pub fn is_spoken(&self) -> bool {
        matches!(self, FormatId::Dialogue | FormatId::Parenthetical)
    }
}

impl std::fmt::Display for FormatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed, ordered unit of the output sequence.
///
/// `text` holds normalized content: no HTML, no invisible marks. It is
/// non-empty except for intentional blank placeholders at the start of an
/// empty document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    #[serde(rename = "formatId")]
    pub format_id: FormatId,
    pub text: String,
}

impl Block {
    pub fn new(format_id: FormatId, text: impl Into<String>) -> Self {
        Self {
            format_id,
            text: text.into(),
        }
    }
}
