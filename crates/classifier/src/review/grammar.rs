//! Sequence grammar: which block types may follow which

use filmlane_core::FormatId;

/// Allowed successors of `prev`. Fixed; not a tunable.
pub fn allowed_next(prev: FormatId) -> &'static [FormatId] {
    use FormatId::*;
    match prev {
        Character => &[Dialogue, Parenthetical],
        Parenthetical => &[Dialogue],
        Dialogue => &[Dialogue, Action, Character, Transition, Parenthetical],
        Action => &[Action, Character, Transition, SceneHeader1, SceneHeaderTopLine],
        Transition => &[SceneHeader1, SceneHeaderTopLine, Action],
        SceneHeaderTopLine => &[Action, Character, Transition, SceneHeader1, SceneHeaderTopLine],
        SceneHeader1 => &[SceneHeader2, SceneHeader3, Action, SceneHeaderTopLine],
        SceneHeader2 => &[SceneHeader3, Action],
        SceneHeader3 => &[Action, Character],
        Basmala => &[SceneHeaderTopLine, SceneHeader1, Action, Character],
    }
}

pub fn is_allowed(prev: FormatId, next: FormatId) -> bool {
    allowed_next(prev).contains(&next)
}

/// Severity of a specific forbidden pair. Pairs that usually mean a
/// misclassified speaker or parenthetical score highest.
pub fn violation_severity(prev: FormatId, next: FormatId) -> u8 {
    use FormatId::*;
    match (prev, next) {
        (Character, Character) => 95,
        (Parenthetical, Transition) => 95,
        (Parenthetical, Character) => 92,
        (Parenthetical, Action) => 90,
        (Parenthetical, Parenthetical) => 90,
        (Transition, Dialogue) => 80,
        (Transition, Character) => 75,
        (SceneHeader2, SceneHeader1) => 75,
        (SceneHeader1, SceneHeader1) => 72,
        (SceneHeader2, SceneHeader2) => 70,
        (SceneHeader3, SceneHeader3) => 70,
        _ => 65,
    }
}

/// What the current line probably should have been, given its predecessor.
pub fn suggestion_for(prev: FormatId) -> FormatId {
    use FormatId::*;
    match prev {
        Character | Parenthetical => Dialogue,
        Transition | Basmala => SceneHeader1,
        SceneHeader1 => SceneHeader2,
        SceneHeader2 => SceneHeader3,
        SceneHeader3 | SceneHeaderTopLine | Action | Dialogue => Action,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use FormatId::*;

    #[test]
    fn test_allowed_pairs() {
        assert!(is_allowed(Character, Dialogue));
        assert!(is_allowed(Character, Parenthetical));
        assert!(!is_allowed(Character, Character));
        assert!(is_allowed(Parenthetical, Dialogue));
        assert!(!is_allowed(Parenthetical, Action));
        assert!(is_allowed(Transition, SceneHeader1));
        assert!(!is_allowed(Transition, Dialogue));
        assert!(is_allowed(Basmala, Character));
        assert!(is_allowed(SceneHeader3, Character));
    }

    #[test]
    fn test_severity_ordering() {
        assert_eq!(violation_severity(Character, Character), 95);
        assert!(violation_severity(Parenthetical, Action) >= 90);
        assert!(violation_severity(Transition, Character) < 90);
        assert_eq!(violation_severity(Dialogue, SceneHeader2), 65);
    }

    #[test]
    fn test_suggestions() {
        assert_eq!(suggestion_for(Character), Dialogue);
        assert_eq!(suggestion_for(Transition), SceneHeader1);
        assert_eq!(suggestion_for(SceneHeader2), SceneHeader3);
    }
}
