//! Line-merge repair
//!
//! Extractors and clipboards wrap long action lines, split speaker names
//! across line breaks and glue continuation tails onto their own lines.
//! These rules decide when two adjacent lines are really one.

use filmlane_classifier::is_plausible_name;
use filmlane_text::patterns::{
    CHARACTER_RE, INLINE_DIALOGUE_RE, SCENE_LOCATION_RE, SCENE_NUMBER_RE, SCENE_TIME_RE,
    TRANSITION_RE,
};
use filmlane_text::{
    is_action_verb_start, matches_action_start_pattern, normalize_line,
};

/// Wrap-merge prohibitions that differ between the import preprocessor and
/// the paste merge pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergePolicy {
    /// Refuse to merge a line that itself carries `<name>: <text>`.
    pub forbid_inline_speaker: bool,
    /// Refuse to merge a line opening with narrative action syntax.
    pub forbid_narrative_syntax: bool,
    /// Refuse to extend a line already judged to be a character cue.
    pub forbid_character_previous: bool,
}

impl MergePolicy {
    /// Import-time merging: structure only, no classification guesses yet.
    pub fn import() -> Self {
        Self::default()
    }

    /// Paste-time merging is stricter; a structural merge must never eat a
    /// speaker or a stage direction.
    pub fn paste() -> Self {
        Self {
            forbid_inline_speaker: true,
            forbid_narrative_syntax: true,
            forbid_character_previous: true,
        }
    }
}

fn ends_with_strong_punctuation(line: &str) -> bool {
    // A closing paren ends a complete parenthetical; it terminates a unit
    // the same way sentence punctuation does.
    line.trim_end()
        .chars()
        .last()
        .is_some_and(|c| matches!(c, '.' | '!' | '?' | '؟' | '؛' | ':' | '…' | ')' | '）'))
}

/// Lines that start a new structural unit and must never be merged into the
/// previous one.
fn is_boundary(line: &str) -> bool {
    let normalized = normalize_line(line);
    SCENE_NUMBER_RE.is_match(&normalized)
        || (SCENE_TIME_RE.is_match(&normalized) && SCENE_LOCATION_RE.is_match(&normalized))
        || TRANSITION_RE.is_match(&normalized)
        || CHARACTER_RE.is_match(&normalized)
        || INLINE_DIALOGUE_RE.is_match(&normalized)
}

fn open_parens_exceed_closed(line: &str) -> bool {
    let open = line.chars().filter(|c| matches!(c, '(' | '（')).count();
    let close = line.chars().filter(|c| matches!(c, ')' | '）')).count();
    open > close
}

fn starts_with_continuation(line: &str) -> bool {
    let trimmed = line.trim_start();
    if trimmed.starts_with("...")
        || trimmed.starts_with('…')
        || trimmed.starts_with('،')
        || trimmed.starts_with(',')
    {
        return true;
    }
    match trimmed.split_whitespace().next() {
        // ف is only a connector as a bare token; و attaches as a prefix.
        Some("و") | Some("ثم") | Some("ف") => true,
        Some(first) => first.starts_with('و') && first.chars().count() > 1,
        None => false,
    }
}

/// Decide whether `current` is the wrapped tail of `prev`.
pub fn wrap_should_merge(prev: &str, current: &str, policy: MergePolicy) -> bool {
    let prev_trimmed = prev.trim();
    let current_trimmed = current.trim();
    if prev_trimmed.is_empty() || current_trimmed.is_empty() {
        return false;
    }

    if open_parens_exceed_closed(prev_trimmed) {
        return true;
    }

    if ends_with_strong_punctuation(prev_trimmed) {
        return false;
    }
    // Structural units never absorb or get absorbed: headers, transitions
    // and speaker cues on either side, and dash-led action openings.
    if is_boundary(current_trimmed) || is_boundary(prev_trimmed) {
        return false;
    }
    if filmlane_text::is_action_with_dash(current_trimmed) {
        return false;
    }
    if policy.forbid_character_previous && CHARACTER_RE.is_match(&normalize_line(prev_trimmed)) {
        return false;
    }
    if policy.forbid_inline_speaker
        && INLINE_DIALOGUE_RE.is_match(&normalize_line(current_trimmed))
    {
        return false;
    }
    if policy.forbid_narrative_syntax && matches_action_start_pattern(current_trimmed) {
        return false;
    }

    let prev_len = prev_trimmed.chars().count();
    let current_len = current_trimmed.chars().count();

    if starts_with_continuation(current_trimmed) {
        return true;
    }
    if current_len <= 16 {
        return true;
    }
    // The classic wrap shape: a line broken at the extractor's column limit.
    prev_len >= 90 && current_len <= 90 && !is_action_verb_start(current_trimmed)
}

/// Try to heal a speaker name split across a line break. Returns the merged
/// `name:` line.
pub fn merge_broken_character_name(prev: &str, current: &str) -> Option<String> {
    let prev_norm = normalize_line(prev);
    let current_norm = normalize_line(current);
    if prev_norm.is_empty() || current_norm.is_empty() {
        return None;
    }
    if filmlane_text::has_sentence_punctuation(&prev_norm) || prev_norm.contains(':') {
        return None;
    }
    if prev_norm.chars().count() > 25 {
        return None;
    }
    if !current_norm.ends_with(':') {
        return None;
    }
    let boundary = SCENE_NUMBER_RE.is_match(&prev_norm)
        || TRANSITION_RE.is_match(&prev_norm)
        || (SCENE_TIME_RE.is_match(&prev_norm) && SCENE_LOCATION_RE.is_match(&prev_norm));
    if boundary {
        return None;
    }

    for candidate in [
        format!("{prev_norm}{current_norm}"),
        format!("{prev_norm} {current_norm}"),
    ] {
        let name = candidate.trim_end_matches(':');
        let chars = candidate.chars().count();
        if (2..=32).contains(&chars)
            && CHARACTER_RE.is_match(&candidate)
            && name.split_whitespace().count() <= 3
            && is_plausible_name(name, 3)
        {
            return Some(candidate);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broken_name_direct_concat() {
        let merged = merge_broken_character_name("الا", "سطى:").unwrap();
        assert_eq!(merged, "الاسطى:");
    }

    #[test]
    fn test_broken_name_with_invisible_marks() {
        let merged = merge_broken_character_name("الا", "سطى﹕\u{200F}").unwrap();
        assert_eq!(merged, "الاسطى:");
    }

    #[test]
    fn test_broken_name_spaced() {
        let merged = merge_broken_character_name("الاسطى", "حسن:").unwrap();
        assert_eq!(merged, "الاسطى حسن:");
    }

    #[test]
    fn test_broken_name_rejects_scene_header() {
        assert!(merge_broken_character_name("مشهد 1", "نهار:").is_none());
    }

    #[test]
    fn test_broken_name_rejects_punctuated_prior() {
        assert!(merge_broken_character_name("وصل أخيراً.", "أحمد:").is_none());
    }

    #[test]
    fn test_wrap_merge_short_tail() {
        assert!(wrap_should_merge(
            "يمشي أحمد في الشارع الطويل وهو يفكر",
            "بهدوء",
            MergePolicy::import()
        ));
    }

    #[test]
    fn test_wrap_merge_continuation_particle() {
        assert!(wrap_should_merge(
            "يفتح الباب وينظر حوله في حذر شديد قبل ان يخطو",
            "ثم يدخل مسرعا إلى الغرفة المظلمة في عمق الشقة",
            MergePolicy::import()
        ));
    }

    #[test]
    fn test_wrap_merge_respects_strong_punctuation() {
        assert!(!wrap_should_merge(
            "يدخل أحمد إلى الغرفة.",
            "بهدوء",
            MergePolicy::import()
        ));
    }

    #[test]
    fn test_wrap_merge_never_eats_boundaries() {
        assert!(!wrap_should_merge("يمشي أحمد", "مشهد 2", MergePolicy::import()));
        assert!(!wrap_should_merge("يمشي أحمد", "قطع", MergePolicy::import()));
        assert!(!wrap_should_merge("يمشي أحمد", "سارة:", MergePolicy::import()));
    }

    #[test]
    fn test_unbalanced_parens_force_merge() {
        assert!(wrap_should_merge(
            "(يقول بصوت منخفض",
            "وهو يبتسم)",
            MergePolicy::import()
        ));
    }

    #[test]
    fn test_paste_policy_blocks_inline_speaker() {
        assert!(!wrap_should_merge(
            "يمشي أحمد",
            "سارة : اهلا بيك",
            MergePolicy::paste()
        ));
    }

    #[test]
    fn test_paste_policy_blocks_narrative_tail() {
        assert!(!wrap_should_merge(
            "كان الجو جميلا في الخارج",
            "وهو يفتح الباب",
            MergePolicy::paste()
        ));
    }

    #[test]
    fn test_long_wrap_shape() {
        let long_prev = "يمشي أحمد في الشارع الطويل المزدحم بالناس والباعة الجائلين بينما تغرب الشمس خلف البنايات العالية القديمة";
        assert!(long_prev.chars().count() >= 90);
        assert!(wrap_should_merge(
            long_prev,
            "والاضواء تبدأ في الظهور على الجانبين",
            MergePolicy::import()
        ));
    }
}
