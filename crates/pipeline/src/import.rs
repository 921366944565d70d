//! Import preprocessor
//!
//! Deterministic per-source repair applied to text extracted from DOC, DOCX
//! or PDF before classification: tab cleanup, scene-header spacing repair,
//! bullet/speaker decomposition, wrapped-line merging, and an informational
//! quality score.

use crate::merge::{wrap_should_merge, MergePolicy};
use crate::splits::is_import_speaker;
use filmlane_text::patterns::SCENE_STATUS_WORDS;
use filmlane_text::{clean_invisible_chars, is_action_cue_line, normalize_line};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Which extractor produced the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractedFormat {
    PlainText,
    Doc,
    Docx,
    Pdf,
}

/// The repaired line list plus its informational quality score.
#[derive(Debug, Clone)]
pub struct ImportResult {
    pub lines: Vec<String>,
    /// 1.0 is pristine; each structural anomaly subtracts a share.
    pub quality: f32,
}

/// `مشهد` glued to its digits.
static GLUED_SCENE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"مشهد([0-9٠-٩]+)").unwrap());

/// `مشهد N status` with no dash in between.
static SCENE_STATUS_GAP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(مشهد\s*[0-9٠-٩]+)\s+([ء-ي]+.*)$").unwrap());

/// `<name> : <text>` shape inside one bullet line.
static BULLET_SPEAKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([^:]{1,28}?)\s*:\s*(.+)$").unwrap());

static PDF_BULLET_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[•◦▪●‣]").unwrap());

fn collapse_tabs(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut in_tab_run = false;
    for c in line.chars() {
        if c == '\t' {
            if !in_tab_run {
                out.push(' ');
                in_tab_run = true;
            }
        } else {
            in_tab_run = false;
            out.push(c);
        }
    }
    out
}

/// `مشهد1` → `مشهد 1`; `مشهد N <status>` → `مشهد N - <status>` when the
/// status token is recognized and no dash already separates them.
fn repair_scene_header_spacing(line: &str) -> String {
    let spaced = GLUED_SCENE_RE.replace_all(line, "مشهد $1").into_owned();
    if let Some(caps) = SCENE_STATUS_GAP_RE.captures(&spaced) {
        let header = caps.get(1).unwrap().as_str();
        let rest = caps.get(2).unwrap().as_str();
        let first = rest.split_whitespace().next().unwrap_or("");
        if !rest.starts_with('-') && SCENE_STATUS_WORDS.contains(first) {
            return format!("{header} - {rest}");
        }
    }
    spaced
}

/// A bullet line of the shape `• <name> : <text>` becomes the two lines
/// `<name> :` and `<text>`.
fn decompose_bullet_speaker(line: &str) -> Option<(String, String)> {
    let stripped = filmlane_text::strip_leading_bullets(line);
    if stripped == line.trim() {
        return None;
    }
    let normalized = normalize_line(&stripped);
    let caps = BULLET_SPEAKER_RE.captures(&normalized)?;
    let name = caps.get(1).unwrap().as_str().trim();
    let text = caps.get(2).unwrap().as_str().trim();
    if text.is_empty() || !is_import_speaker(name) {
        return None;
    }
    Some((format!("{name} :"), text.to_string()))
}

struct QualityCounter {
    anomalies: u32,
}

impl QualityCounter {
    fn new() -> Self {
        Self { anomalies: 0 }
    }

    fn bump(&mut self) {
        self.anomalies += 1;
    }

    fn score(&self, line_count: usize) -> f32 {
        let denom = (2.2 * line_count as f32).max(1.0);
        (1.0 - self.anomalies as f32 / denom).clamp(0.0, 1.0)
    }
}

/// Run the per-source repair over extracted text.
pub fn preprocess_import(text: &str, format: ExtractedFormat) -> ImportResult {
    let cleaned = clean_invisible_chars(text);

    // PDFs carry bullet glyphs mid-line where the original had line breaks.
    let cleaned = if format == ExtractedFormat::Pdf {
        PDF_BULLET_SPLIT_RE.replace_all(&cleaned, "\n").into_owned()
    } else {
        cleaned
    };

    let mut quality = QualityCounter::new();
    let mut repaired: Vec<String> = Vec::new();

    for raw_line in cleaned.split('\n') {
        let line = collapse_tabs(raw_line);
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if GLUED_SCENE_RE.is_match(line) {
            quality.bump();
        }
        if line.starts_with('-') || line.starts_with('–') {
            quality.bump();
        }
        let repaired_line = repair_scene_header_spacing(line);

        if let Some((speaker, text)) = decompose_bullet_speaker(&repaired_line) {
            repaired.push(speaker);
            repaired.push(text);
            continue;
        }

        let normalized = normalize_line(&repaired_line);
        if normalized.is_empty() {
            continue;
        }
        if normalized.chars().count() <= 2 && !is_action_cue_line(&normalized) {
            quality.bump();
        }
        repaired.push(normalized);
    }

    // Wrapped-line merging, one forward pass.
    let mut merged: Vec<String> = Vec::with_capacity(repaired.len());
    for line in repaired {
        match merged.last_mut() {
            Some(prev) if wrap_should_merge(prev, &line, MergePolicy::import()) => {
                quality.bump(); // orphan wrapped line healed
                prev.push(' ');
                prev.push_str(&line);
            }
            _ => merged.push(line),
        }
    }

    let line_count = merged.len();
    ImportResult {
        lines: merged,
        quality: quality.score(line_count),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glued_scene_number() {
        let result = preprocess_import("مشهد1\nداخلي - نهار", ExtractedFormat::Docx);
        assert_eq!(result.lines[0], "مشهد 1");
        assert!(result.quality < 1.0);
    }

    #[test]
    fn test_scene_status_dash_inserted() {
        let result = preprocess_import("مشهد 3 نهار داخلي", ExtractedFormat::Docx);
        assert_eq!(result.lines[0], "مشهد 3 - نهار داخلي");
    }

    #[test]
    fn test_scene_status_dash_not_duplicated() {
        let result = preprocess_import("مشهد 3 - نهار", ExtractedFormat::Docx);
        assert_eq!(result.lines[0], "مشهد 3 - نهار");
    }

    #[test]
    fn test_unrecognized_second_token_left_alone() {
        let result = preprocess_import("مشهد 3 شقة أحمد", ExtractedFormat::Docx);
        assert_eq!(result.lines[0], "مشهد 3 شقة أحمد");
    }

    #[test]
    fn test_bullet_speaker_decomposition() {
        let result = preprocess_import("• أحمد : اهلا بيك يا سارة", ExtractedFormat::Docx);
        assert_eq!(
            result.lines,
            vec!["أحمد :".to_string(), "اهلا بيك يا سارة".to_string()]
        );
    }

    #[test]
    fn test_bullet_scene_word_not_decomposed() {
        let result = preprocess_import("• مشهد : ليل", ExtractedFormat::Docx);
        assert_eq!(result.lines.len(), 1);
    }

    #[test]
    fn test_pdf_bullets_become_lines() {
        let result = preprocess_import("يدخل أحمد.•يجلس على المقعد.", ExtractedFormat::Pdf);
        assert_eq!(
            result.lines,
            vec!["يدخل أحمد.".to_string(), "يجلس على المقعد.".to_string()]
        );
    }

    #[test]
    fn test_wrap_merge_applied() {
        let result = preprocess_import(
            "يمشي أحمد في الشارع الطويل وهو يفكر\nبهدوء",
            ExtractedFormat::Docx,
        );
        assert_eq!(result.lines.len(), 1);
        assert!(result.lines[0].ends_with("بهدوء"));
    }

    #[test]
    fn test_tabs_collapsed() {
        let result = preprocess_import("أحمد\t\t\t\t:", ExtractedFormat::Doc);
        assert_eq!(result.lines[0], "أحمد :");
    }

    #[test]
    fn test_clean_input_scores_high() {
        let text = "مشهد 1\nداخلي - بيت أحمد - نهار\nيدخل أحمد إلى الغرفة.\nأحمد:\nمرحباً يا سارة.";
        let result = preprocess_import(text, ExtractedFormat::PlainText);
        assert_eq!(result.lines.len(), 5);
        assert!(result.quality > 0.9);
    }
}
