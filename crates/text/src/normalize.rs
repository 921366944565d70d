//! Line and name normalization
//!
//! Input arrives from clipboards, DOCX/PDF extractors and older exports, so
//! it carries diacritics, directional marks, zero-width characters, exotic
//! colon glyphs and decorative bullets. Every classifier-facing string goes
//! through [`normalize_line`] first.

/// Colon glyphs that foreign editors and extractors produce.
const COLON_VARIANTS: [char; 8] = ['：', '﹕', '︰', '∶', '꞉', 'ː', '˸', ':'];

/// Leading bullet glyphs. Dashes are deliberately absent: a leading dash is
/// an action signal the classifier must still see.
const BULLET_CHARS: [char; 8] = ['•', '◦', '▪', '●', '‣', '·', '○', '*'];

fn is_arabic_diacritic(c: char) -> bool {
    // Harakat, tanwin, sukun, combining maddah/hamza, plus superscript alef.
    matches!(c, '\u{064B}'..='\u{065F}' | '\u{0670}')
}

fn is_invisible_mark(c: char) -> bool {
    matches!(
        c,
        // LRM / RLM and the rest of the directional controls
        '\u{200E}' | '\u{200F}' | '\u{061C}' | '\u{202A}'..='\u{202E}' | '\u{2066}'..='\u{2069}'
        // zero-width characters and BOM
        | '\u{200B}'..='\u{200D}' | '\u{2060}' | '\u{FEFF}'
        // soft hyphen
        | '\u{00AD}'
        // private use area
        | '\u{E000}'..='\u{F8FF}'
    )
}

/// Remove invisible characters while keeping line structure. CRLF and lone CR
/// become `\n`; everything else invisible is dropped.
pub fn clean_invisible_chars(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push('\n');
            }
            c if is_invisible_mark(c) => {}
            c => out.push(c),
        }
    }
    out
}

/// Strip decorative bullets (and the whitespace after them) from the start of
/// a line. Repeats so `- • text` fully unwraps.
pub fn strip_leading_bullets(s: &str) -> String {
    let mut rest = s.trim_start();
    loop {
        let mut chars = rest.chars();
        match chars.next() {
            Some(c) if BULLET_CHARS.contains(&c) => {
                rest = chars.as_str().trim_start();
            }
            _ => break,
        }
    }
    rest.to_string()
}

/// Canonicalize one line: drop diacritics, directional and zero-width marks,
/// separators and tabs; strip leading bullet glyphs; map colon variants to
/// `:`; collapse runs of whitespace; trim.
pub fn normalize_line(s: &str) -> String {
    let s = strip_leading_bullets(s);
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if is_arabic_diacritic(c) || is_invisible_mark(c) {
            continue;
        }
        match c {
            '\u{2028}' | '\u{2029}' => {}
            '\t' | '\u{00A0}' => out.push(' '),
            c if COLON_VARIANTS.contains(&c) => out.push(':'),
            c => out.push(c),
        }
    }
    let collapsed: Vec<&str> = out.split_whitespace().collect();
    collapsed.join(" ")
}

/// Normalize a speaker name: [`normalize_line`] plus trailing colons and
/// whitespace removed.
pub fn normalize_character_name(s: &str) -> String {
    let normalized = normalize_line(s);
    normalized
        .trim_end_matches(|c: char| c == ':' || c.is_whitespace())
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diacritics_removed() {
        assert_eq!(normalize_line("مَرْحَباً"), "مرحبا");
        assert_eq!(normalize_line("مُحَمَّد"), "محمد");
    }

    #[test]
    fn test_directional_and_zero_width_removed() {
        assert_eq!(normalize_line("سارة\u{200F}\u{200B}"), "سارة");
        assert_eq!(normalize_line("\u{FEFF}مشهد 1"), "مشهد 1");
    }

    #[test]
    fn test_colon_variants() {
        for colon in ['：', '﹕', '︰', '∶', '꞉', 'ː', '˸'] {
            let line = format!("أحمد{colon}");
            assert_eq!(normalize_line(&line), "أحمد:");
        }
    }

    #[test]
    fn test_whitespace_collapsed() {
        assert_eq!(normalize_line("  مشهد   1  "), "مشهد 1");
        assert_eq!(normalize_line("داخلي\t-\tنهار"), "داخلي - نهار");
        assert_eq!(normalize_line("بيت\u{00A0}أحمد"), "بيت أحمد");
    }

    #[test]
    fn test_strip_leading_bullets() {
        assert_eq!(strip_leading_bullets("• أحمد : اهلا"), "أحمد : اهلا");
        assert_eq!(strip_leading_bullets("* • نص"), "نص");
        assert_eq!(strip_leading_bullets("نص عادي"), "نص عادي");
    }

    #[test]
    fn test_leading_dash_survives() {
        assert_eq!(normalize_line("- ينظر حوله"), "- ينظر حوله");
        assert_eq!(strip_leading_bullets("- ينظر حوله"), "- ينظر حوله");
    }

    #[test]
    fn test_clean_invisible_keeps_newlines() {
        assert_eq!(clean_invisible_chars("ا\r\nب\rج"), "ا\nب\nج");
        assert_eq!(clean_invisible_chars("ا\u{200E}ب"), "اب");
    }

    #[test]
    fn test_normalize_character_name() {
        assert_eq!(normalize_character_name("أحمد :"), "أحمد");
        assert_eq!(normalize_character_name("سارة﹕\u{200F}"), "سارة");
    }
}
