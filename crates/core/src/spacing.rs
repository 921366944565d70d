//! Vertical spacing between adjacent emitted blocks

use crate::FormatId;

/// Margin-top in points for an emitted block given the previous block's type.
/// `None` means the renderer default applies; every pair yields either a
/// defined margin or that default, never an undefined lookup.
pub fn margin_top_pt(prev: FormatId, current: FormatId) -> Option<u32> {
    use FormatId::*;
    match (prev, current) {
        (Basmala, _) => Some(0),
        (Character, Dialogue) | (Character, Parenthetical) => Some(0),
        (Parenthetical, Dialogue) => Some(0),
        (SceneHeader2, SceneHeader3) => Some(0),
        (SceneHeader3, Action) => Some(12),
        (Action, Action) | (Action, Character) | (Action, Transition) => Some(12),
        (Dialogue, Character) | (Dialogue, Action) | (Dialogue, Transition) => Some(12),
        (Parenthetical, Character) | (Parenthetical, Action) | (Parenthetical, Transition) => {
            Some(0)
        }
        (Transition, SceneHeader1) | (Transition, SceneHeaderTopLine) => Some(12),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use FormatId::*;

    #[test]
    fn test_spacing_table() {
        assert_eq!(margin_top_pt(Basmala, SceneHeader1), Some(0));
        assert_eq!(margin_top_pt(Character, Dialogue), Some(0));
        assert_eq!(margin_top_pt(Character, Parenthetical), Some(0));
        assert_eq!(margin_top_pt(Parenthetical, Dialogue), Some(0));
        assert_eq!(margin_top_pt(SceneHeader2, SceneHeader3), Some(0));
        assert_eq!(margin_top_pt(SceneHeader3, Action), Some(12));
        assert_eq!(margin_top_pt(Action, Character), Some(12));
        assert_eq!(margin_top_pt(Dialogue, Transition), Some(12));
        assert_eq!(margin_top_pt(Parenthetical, Transition), Some(0));
        assert_eq!(margin_top_pt(Transition, SceneHeaderTopLine), Some(12));
    }

    #[test]
    fn test_unlisted_pairs_take_renderer_default() {
        assert_eq!(margin_top_pt(SceneHeader1, SceneHeader2), None);
        assert_eq!(margin_top_pt(Transition, Action), None);
    }

    #[test]
    fn test_every_pair_is_defined_or_default() {
        let all = [
            Basmala,
            SceneHeader1,
            SceneHeader2,
            SceneHeader3,
            SceneHeaderTopLine,
            Action,
            Character,
            Dialogue,
            Parenthetical,
            Transition,
        ];
        for prev in all {
            for current in all {
                // Exhaustiveness: the lookup itself must not panic.
                let _ = margin_top_pt(prev, current);
            }
        }
    }
}
