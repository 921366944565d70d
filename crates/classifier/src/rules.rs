//! The per-line rule cascade
//!
//! High-confidence pattern short-circuits run first (basmala, scene headers,
//! transitions, dash narration, parentheticals); everything else goes to the
//! narrative decision resolver. The cascade is pure: classification cannot
//! fail, and callers that still want a belt-and-braces default use `action`
//! at confidence 80.

use crate::config::ClassifierConfig;
use crate::context::LineContext;
use crate::resolver::resolve_narrative;
use filmlane_core::{
    Classification, ClassificationMethod, Correction, FormatId, LineClassifier, Result,
};
use filmlane_text::patterns::{
    MULTI_LOCATION_RE, SCENE3_PLACE_PREFIX_RE, SCENE_LOCATION_RE, SCENE_NUMBER_RE,
    SCENE_RANGE_RE, SCENE_TIME_RE, TRANSITION_RE,
};
use filmlane_text::{
    has_sentence_punctuation, is_action_verb_start, is_action_with_dash, is_basmala,
    is_parenthetical_line, matches_action_start_pattern,
};
use unicode_segmentation::UnicodeSegmentation;

/// A dash line whose content reads as narration (verb-led or pattern-led).
fn is_dash_narrative_action_line(line: &str) -> bool {
    if !is_action_with_dash(line) {
        return false;
    }
    let rest = line
        .trim_start()
        .trim_start_matches(['-', '–', '—'])
        .trim_start();
    is_action_verb_start(rest) || matches_action_start_pattern(rest)
}

/// Base constraints shared by both tier-3 header rules, applied after
/// stripping a trailing colon.
fn scene3_base(line: &str) -> bool {
    let stripped = line.trim_end_matches(':').trim();
    stripped.unicode_words().count() <= 14
        && !has_sentence_punctuation(stripped)
        && !TRANSITION_RE.is_match(stripped)
        && !is_action_verb_start(stripped)
        && !matches_action_start_pattern(stripped)
}

/// Stand-alone tier-3 header: a known place prefix, a multi-location form or
/// the range form, with the base constraints.
fn is_standalone_scene3(line: &str) -> bool {
    let stripped = line.trim_end_matches(':').trim();
    scene3_base(line)
        && (SCENE3_PLACE_PREFIX_RE.is_match(stripped)
            || MULTI_LOCATION_RE.is_match(stripped)
            || SCENE_RANGE_RE.is_match(stripped))
}

/// Weaker tier-3 reading available only directly under a scene header.
fn is_scene3_after_header(line: &str, ctx: &LineContext) -> bool {
    if !matches!(
        ctx.last_type(),
        Some(t) if t.is_scene_header()
    ) {
        return false;
    }
    let stripped = line.trim_end_matches(':').trim();
    scene3_base(line)
        && (SCENE3_PLACE_PREFIX_RE.is_match(stripped)
            || MULTI_LOCATION_RE.is_match(stripped)
            || (ctx.stats.is_short && !ctx.stats.has_punctuation))
}

/// Classify one normalized line against its context.
pub fn classify_line(line: &str, ctx: &LineContext, config: &ClassifierConfig) -> Classification {
    if is_basmala(line) {
        return Classification::new(
            FormatId::Basmala,
            99,
            "regex:basmala",
            ClassificationMethod::Regex,
        );
    }

    let has_scene_number = SCENE_NUMBER_RE.is_match(line);
    let has_time = SCENE_TIME_RE.is_match(line);
    let has_location = SCENE_LOCATION_RE.is_match(line);

    if has_scene_number && has_time && has_location {
        return Classification::new(
            FormatId::SceneHeaderTopLine,
            95,
            "regex:scene-header-top-line",
            ClassificationMethod::Regex,
        );
    }
    if has_scene_number {
        return Classification::new(
            FormatId::SceneHeader1,
            95,
            "regex:scene-number",
            ClassificationMethod::Regex,
        );
    }
    if has_time && has_location {
        return Classification::new(
            FormatId::SceneHeader2,
            95,
            "regex:time-location",
            ClassificationMethod::Regex,
        );
    }
    if TRANSITION_RE.is_match(line) {
        return Classification::new(
            FormatId::Transition,
            95,
            "regex:transition",
            ClassificationMethod::Regex,
        );
    }
    if is_standalone_scene3(line) {
        return Classification::new(
            FormatId::SceneHeader3,
            90,
            "regex:scene-header-3",
            ClassificationMethod::Regex,
        );
    }
    if is_action_with_dash(line) || is_dash_narrative_action_line(line) {
        return Classification::new(
            FormatId::Action,
            90,
            "regex:action-dash",
            ClassificationMethod::Regex,
        );
    }
    if is_parenthetical_line(line) {
        return classify_parenthetical(line, ctx);
    }
    if is_scene3_after_header(line, ctx) {
        return Classification::new(
            FormatId::SceneHeader3,
            85,
            "context:scene-header-3",
            ClassificationMethod::Context,
        );
    }

    resolve_narrative(line, ctx, config)
}

fn classify_parenthetical(line: &str, ctx: &LineContext) -> Classification {
    if ctx.flags.is_in_dialogue_block || ctx.last_type() == Some(FormatId::Character) {
        return Classification::new(
            FormatId::Parenthetical,
            95,
            "regex:parenthetical",
            ClassificationMethod::Regex,
        );
    }
    // Outside a dialogue block, a bracketed performance cue still reads as a
    // parenthetical when speech happened recently; anything else is staging.
    let recent_dialogue = ctx
        .previous_types
        .iter()
        .rev()
        .take(3)
        .any(|t| t.is_dialogue_family());
    if filmlane_text::is_action_cue_line(line) && recent_dialogue {
        Classification::new(
            FormatId::Parenthetical,
            85,
            "context:parenthetical-cue",
            ClassificationMethod::Context,
        )
    } else {
        Classification::new(
            FormatId::Action,
            85,
            "context:parenthetical-as-action",
            ClassificationMethod::Context,
        )
    }
}

/// The shipping [`LineClassifier`] backend: the rule cascade over a context
/// rebuilt from the caller's assigned-type history.
#[derive(Debug, Default, Clone)]
pub struct RuleClassifier {
    config: ClassifierConfig,
}

impl RuleClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Full-context entry point used by the paste pipeline.
    pub fn classify(&self, line: &str, ctx: &LineContext) -> Classification {
        let classification = classify_line(line, ctx, &self.config);
        tracing::debug!(
            line = %line,
            assigned = %classification.assigned_type,
            confidence = classification.confidence,
            reason = %classification.reason,
            "classified line"
        );
        classification
    }
}

impl LineClassifier for RuleClassifier {
    fn initialize(&mut self) -> Result<()> {
        // Regex tables are lazies; touching one forces compilation up front.
        let _ = SCENE_NUMBER_RE.as_str();
        Ok(())
    }

    fn classify_line(&self, line: &str, previous_types: &[FormatId]) -> Classification {
        let owned = [line.to_string()];
        let ctx = LineContext::build(&owned, 0, previous_types);
        classify_line(line, &ctx, &self.config)
    }

    fn retrain_with_corrections(&mut self, corrections: &[Correction]) -> Result<()> {
        // The rule engine has no weights to move; corrections only feed the
        // feedback store.
        tracing::debug!(count = corrections.len(), "corrections acknowledged");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(types: &[FormatId], line: &str) -> LineContext {
        let mut lines: Vec<String> = (0..types.len()).map(|i| format!("سطر {i}")).collect();
        lines.push(line.to_string());
        LineContext::build(&lines, types.len(), types)
    }

    fn classify(line: &str, types: &[FormatId]) -> Classification {
        classify_line(line, &ctx(types, line), &ClassifierConfig::default())
    }

    #[test]
    fn test_basmala() {
        let c = classify("بسم الله الرحمن الرحيم {", &[]);
        assert_eq!(c.assigned_type, FormatId::Basmala);
        assert_eq!(c.confidence, 99);
    }

    #[test]
    fn test_scene_number_only() {
        let c = classify("مشهد 1", &[]);
        assert_eq!(c.assigned_type, FormatId::SceneHeader1);
        assert_eq!(c.confidence, 95);
    }

    #[test]
    fn test_top_line_composite() {
        let c = classify("مشهد 2 - ليل - داخلي", &[FormatId::Basmala]);
        assert_eq!(c.assigned_type, FormatId::SceneHeaderTopLine);
    }

    #[test]
    fn test_time_location_header() {
        let c = classify("داخلي - بيت أحمد - نهار", &[FormatId::SceneHeader1]);
        assert_eq!(c.assigned_type, FormatId::SceneHeader2);
    }

    #[test]
    fn test_transition_exact() {
        assert_eq!(classify("قطع", &[]).assigned_type, FormatId::Transition);
        assert_eq!(
            classify("قطع إلى:", &[FormatId::Dialogue]).assigned_type,
            FormatId::Transition
        );
    }

    #[test]
    fn test_scene3_under_header() {
        let c = classify("غرفة المعيشة", &[FormatId::SceneHeader1, FormatId::SceneHeader2]);
        assert_eq!(c.assigned_type, FormatId::SceneHeader3);
    }

    #[test]
    fn test_dash_line_is_action() {
        let c = classify("- ينظر حوله", &[FormatId::SceneHeader3]);
        assert_eq!(c.assigned_type, FormatId::Action);
    }

    #[test]
    fn test_parenthetical_in_dialogue() {
        let c = classify("(بفرح)", &[FormatId::Character]);
        assert_eq!(c.assigned_type, FormatId::Parenthetical);
        assert_eq!(c.confidence, 95);
    }

    #[test]
    fn test_parenthetical_outside_dialogue_is_action() {
        let c = classify("(يفتح الباب بهدوء)", &[FormatId::Action]);
        assert_eq!(c.assigned_type, FormatId::Action);
    }

    #[test]
    fn test_parenthetical_cue_near_dialogue() {
        let types = [FormatId::Character, FormatId::Dialogue, FormatId::Action];
        let c = classify("(بغضب)", &types);
        assert_eq!(c.assigned_type, FormatId::Parenthetical);
    }

    #[test]
    fn test_backend_trait_entry_point() {
        let mut backend = RuleClassifier::default();
        backend.initialize().unwrap();
        let c = LineClassifier::classify_line(&backend, "أحمد:", &[FormatId::Action]);
        assert_eq!(c.assigned_type, FormatId::Character);
    }
}
