//! Independent suspicion detectors
//!
//! Each detector inspects one classified line (with its neighbors) and
//! returns at most one finding. Detectors never see each other's output;
//! aggregation happens in [`super::Reviewer`].

use crate::review::grammar;
use crate::signals::ActionSignals;
use filmlane_core::{ClassificationMethod, ClassifiedLine, FormatId, ReviewFinding};
use filmlane_text::{has_sentence_punctuation, normalize_character_name};
use unicode_segmentation::UnicodeSegmentation;

/// Surface features shared by all detectors for one line.
#[derive(Debug, Clone)]
pub struct LineFeatures {
    pub word_count: usize,
    pub char_count: usize,
    pub ends_with_colon: bool,
    pub ends_with_punctuation: bool,
    pub starts_with_dash: bool,
    pub fully_parenthesized: bool,
}

impl LineFeatures {
    pub fn of(text: &str) -> Self {
        let trimmed = text.trim();
        Self {
            word_count: trimmed.unicode_words().count(),
            char_count: trimmed.chars().count(),
            ends_with_colon: trimmed.ends_with(':'),
            ends_with_punctuation: trimmed
                .chars()
                .last()
                .is_some_and(|c| matches!(c, '.' | '!' | '?' | '؟' | '؛' | '…')),
            starts_with_dash: trimmed.starts_with(['-', '–', '—']),
            fully_parenthesized: filmlane_text::is_parenthetical_line(trimmed),
        }
    }
}

/// One suspicion heuristic.
pub trait Detector: Send + Sync {
    fn id(&self) -> &'static str;

    fn detect(
        &self,
        line: &ClassifiedLine,
        features: &LineFeatures,
        context: &[ClassifiedLine],
        position: usize,
    ) -> Option<ReviewFinding>;
}

fn finding(
    detector_id: &str,
    score: u8,
    reason: String,
    suggested: Option<FormatId>,
) -> ReviewFinding {
    ReviewFinding {
        detector_id: detector_id.to_string(),
        suspicion_score: score,
        reason,
        suggested_type: suggested,
    }
}

/// The assigned type is not a legal successor of the previous one.
pub struct SequenceViolation;

impl Detector for SequenceViolation {
    fn id(&self) -> &'static str {
        "sequence-violation"
    }

    fn detect(
        &self,
        line: &ClassifiedLine,
        _features: &LineFeatures,
        context: &[ClassifiedLine],
        position: usize,
    ) -> Option<ReviewFinding> {
        let prev = context.get(position.checked_sub(1)?)?;
        if grammar::is_allowed(prev.assigned_type, line.assigned_type) {
            return None;
        }
        let score = grammar::violation_severity(prev.assigned_type, line.assigned_type);
        Some(finding(
            self.id(),
            score,
            format!(
                "{} لا يتبع {} في تسلسل صحيح",
                line.assigned_type, prev.assigned_type
            ),
            Some(grammar::suggestion_for(prev.assigned_type)),
        ))
    }
}

/// The text does not look like its assigned type.
pub struct ContentTypeMismatch;

impl Detector for ContentTypeMismatch {
    fn id(&self) -> &'static str {
        "content-type-mismatch"
    }

    fn detect(
        &self,
        line: &ClassifiedLine,
        features: &LineFeatures,
        _context: &[ClassifiedLine],
        _position: usize,
    ) -> Option<ReviewFinding> {
        match line.assigned_type {
            FormatId::Character if features.word_count > 5 => Some(finding(
                self.id(),
                75,
                "اسم شخصية أطول من المعتاد".to_string(),
                Some(FormatId::Dialogue),
            )),
            FormatId::Character
                if has_sentence_punctuation(line.text.trim_end_matches(':')) =>
            {
                Some(finding(
                    self.id(),
                    80,
                    "اسم شخصية يحتوي على علامات ترقيم".to_string(),
                    Some(FormatId::Dialogue),
                ))
            }
            FormatId::Dialogue if features.fully_parenthesized => Some(finding(
                self.id(),
                88,
                "حوار محاط بالكامل بأقواس".to_string(),
                Some(FormatId::Parenthetical),
            )),
            FormatId::Dialogue
                if features.starts_with_dash && ActionSignals::collect(&line.text).any() =>
            {
                Some(finding(
                    self.id(),
                    82,
                    "حوار يبدأ بشرطة ويحمل ملامح سرد".to_string(),
                    Some(FormatId::Action),
                ))
            }
            FormatId::Action if features.ends_with_colon && features.word_count <= 3 => {
                Some(finding(
                    self.id(),
                    78,
                    "سطر حركة قصير ينتهي بنقطتين".to_string(),
                    Some(FormatId::Character),
                ))
            }
            FormatId::Parenthetical if !features.fully_parenthesized => Some(finding(
                self.id(),
                72,
                "قوس حواري بدون أقواس".to_string(),
                Some(FormatId::Dialogue),
            )),
            FormatId::Transition if features.word_count > 6 => Some(finding(
                self.id(),
                70,
                "انتقال أطول من المعتاد".to_string(),
                Some(FormatId::Action),
            )),
            _ => None,
        }
    }
}

/// A name broken across two lines: a short action fragment directly before a
/// tiny character cue that together form a valid name.
pub struct SplitNameFragment;

impl SplitNameFragment {
    fn looks_like_name_fragment(text: &str) -> bool {
        let chars = text.chars().count();
        (2..=14).contains(&chars) && text.unicode_words().count() <= 2
    }
}

impl Detector for SplitNameFragment {
    fn id(&self) -> &'static str {
        "split-name-fragment"
    }

    fn detect(
        &self,
        line: &ClassifiedLine,
        features: &LineFeatures,
        context: &[ClassifiedLine],
        position: usize,
    ) -> Option<ReviewFinding> {
        if line.assigned_type != FormatId::Action || features.word_count > 2 {
            return None;
        }
        if !Self::looks_like_name_fragment(&line.text) {
            return None;
        }
        if ActionSignals::collect(&line.text).is_strong() {
            return None;
        }
        let next = context.get(position + 1)?;
        if next.assigned_type != FormatId::Character || !next.text.trim().ends_with(':') {
            return None;
        }
        let next_name = normalize_character_name(&next.text);
        if !(1..=4).contains(&next_name.chars().count()) {
            return None;
        }

        let direct = format!("{}{}", line.text.trim(), next_name);
        let spaced = format!("{} {}", line.text.trim(), next_name);
        let merged_ok = [direct, spaced].into_iter().any(|merged| {
            (3..=32).contains(&merged.chars().count())
                && merged.split_whitespace().count() <= 3
                && crate::resolver::is_plausible_name(&merged, 3)
        });
        if !merged_ok {
            return None;
        }

        // Merging requires a text edit the reviewer cannot express as a
        // retype, so no suggested type.
        Some(finding(
            self.id(),
            92,
            "جزء من اسم مقسوم على سطرين".to_string(),
            None,
        ))
    }
}

/// Word counts far outside the norm for the assigned type.
pub struct StatisticalAnomaly;

impl StatisticalAnomaly {
    fn bounds(format: FormatId) -> (usize, usize) {
        use FormatId::*;
        match format {
            Basmala => (2, 6),
            SceneHeader1 => (1, 3),
            SceneHeader2 => (2, 8),
            SceneHeader3 => (1, 8),
            SceneHeaderTopLine => (2, 12),
            Action => (1, 60),
            Character => (1, 5),
            Dialogue => (1, 40),
            Parenthetical => (1, 6),
            Transition => (1, 4),
        }
    }
}

impl Detector for StatisticalAnomaly {
    fn id(&self) -> &'static str {
        "statistical-anomaly"
    }

    fn detect(
        &self,
        line: &ClassifiedLine,
        features: &LineFeatures,
        _context: &[ClassifiedLine],
        _position: usize,
    ) -> Option<ReviewFinding> {
        let (_, max) = Self::bounds(line.assigned_type);
        if features.word_count > max {
            let excess = (features.word_count - max) as u32;
            let score = (60 + 3 * excess).min(90) as u8;
            return Some(finding(
                self.id(),
                score,
                format!(
                    "عدد كلمات {} يتجاوز المعتاد لنوع {}",
                    features.word_count, line.assigned_type
                ),
                None,
            ));
        }
        if line.assigned_type == FormatId::Action && features.word_count < 2 {
            return Some(finding(
                self.id(),
                55,
                "سطر حركة من كلمة واحدة".to_string(),
                Some(FormatId::Character),
            ));
        }
        None
    }
}

/// Low classifier confidence, weighted by method.
pub struct ConfidenceDrop;

impl Detector for ConfidenceDrop {
    fn id(&self) -> &'static str {
        "confidence-drop"
    }

    fn detect(
        &self,
        line: &ClassifiedLine,
        _features: &LineFeatures,
        _context: &[ClassifiedLine],
        _position: usize,
    ) -> Option<ReviewFinding> {
        if line.classification_method == ClassificationMethod::Regex
            && line.original_confidence >= 90
        {
            return None;
        }
        if line.classification_method == ClassificationMethod::Fallback
            && line.original_confidence < 60
        {
            return Some(finding(
                self.id(),
                50,
                "تصنيف احتياطي منخفض الثقة".to_string(),
                None,
            ));
        }
        if line.original_confidence < 45 {
            return Some(finding(
                self.id(),
                55,
                format!("ثقة منخفضة ({})", line.original_confidence),
                None,
            ));
        }
        None
    }
}

/// The default detector set, in reporting order.
pub fn default_detectors() -> Vec<Box<dyn Detector>> {
    vec![
        Box::new(SequenceViolation),
        Box::new(ContentTypeMismatch),
        Box::new(SplitNameFragment),
        Box::new(StatisticalAnomaly),
        Box::new(ConfidenceDrop),
    ]
}
