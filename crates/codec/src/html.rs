//! The HTML fragment surface
//!
//! Writes one `<div class="format-…">` per block, wrapping an adjacent
//! tier-1 + tier-2 header pair in the top-line composite. Reading accepts
//! only that subset: known `format-` classes, the top-line wrapper and `<br>`
//! placeholders; every other tag is flattened to its text. Unknown classes
//! fall back to `action`.

use filmlane_core::{Block, FormatId};

/// Escape text for embedding in a div.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Undo [`escape`], plus the non-breaking space entity.
fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

fn leaf_div(format: FormatId, text: &str) -> String {
    let inner = if text.is_empty() {
        "<br>".to_string()
    } else {
        escape(text)
    };
    format!("<div class=\"format-{}\">{}</div>", format.as_str(), inner)
}

/// Render a block sequence to the editor HTML fragment.
pub fn blocks_to_html(blocks: &[Block]) -> String {
    let mut out = String::new();
    let mut i = 0;
    while i < blocks.len() {
        let block = &blocks[i];
        if block.format_id == FormatId::SceneHeader1
            && blocks
                .get(i + 1)
                .is_some_and(|next| next.format_id == FormatId::SceneHeader2)
        {
            out.push_str("<div class=\"format-scene-header-top-line\">");
            out.push_str(&leaf_div(FormatId::SceneHeader1, &block.text));
            out.push_str(&leaf_div(FormatId::SceneHeader2, &blocks[i + 1].text));
            out.push_str("</div>");
            i += 2;
            continue;
        }
        if block.format_id == FormatId::SceneHeaderTopLine {
            // A stray composite leaf is repaired on the way out.
            let repaired = crate::payload::split_top_line(&block.text);
            out.push_str("<div class=\"format-scene-header-top-line\">");
            for part in &repaired {
                out.push_str(&leaf_div(part.format_id, &part.text));
            }
            out.push_str("</div>");
            i += 1;
            continue;
        }
        out.push_str(&leaf_div(block.format_id, &block.text));
        i += 1;
    }
    out
}

/// Strip nested tags from div content, turning `<br>` variants into
/// newlines, then unescape entities.
fn flatten_text(inner: &str) -> String {
    let mut out = String::with_capacity(inner.len());
    let mut rest = inner;
    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        match tail.find('>') {
            Some(close) => {
                let tag = &tail[..=close];
                if tag.starts_with("<br") {
                    out.push('\n');
                }
                rest = &tail[close + 1..];
            }
            None => {
                // Dangling '<': keep it as text.
                out.push_str(tail);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    unescape(&out)
}

/// Class token of a tag, minus the `format-` prefix.
fn format_class(tag: &str) -> Option<&str> {
    let attr_start = tag.find("class=")? + "class=".len();
    let rest = &tag[attr_start..];
    let quote = rest.chars().next()?;
    if quote != '"' && quote != '\'' {
        return None;
    }
    let value = &rest[1..rest[1..].find(quote)? + 1];
    value
        .split_whitespace()
        .find_map(|token| token.strip_prefix("format-"))
}

/// Find the span of the div opened at `open_start`, returning
/// `(inner_start, inner_end, after_close)`. Handles nesting.
fn div_span(html: &str, open_start: usize) -> Option<(usize, usize, usize)> {
    let open_end = html[open_start..].find('>')? + open_start;
    let inner_start = open_end + 1;
    let mut depth = 1usize;
    let mut cursor = inner_start;
    while depth > 0 {
        let rest = &html[cursor..];
        let next_open = rest.find("<div");
        let next_close = rest.find("</div");
        match (next_open, next_close) {
            (Some(o), Some(c)) if o < c => {
                depth += 1;
                cursor += o + 4;
            }
            (_, Some(c)) => {
                depth -= 1;
                if depth == 0 {
                    let inner_end = cursor + c;
                    let close_end = html[inner_end..].find('>')? + inner_end + 1;
                    return Some((inner_start, inner_end, close_end));
                }
                cursor += c + 5;
            }
            _ => return None,
        }
    }
    None
}

fn push_text_lines(out: &mut Vec<Block>, format: FormatId, text: &str) {
    let lines: Vec<&str> = text
        .split('\n')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    if lines.is_empty() {
        out.push(Block::new(format, ""));
    } else {
        for line in lines {
            out.push(Block::new(format, line));
        }
    }
}

fn parse_fragment(html: &str, out: &mut Vec<Block>) {
    let mut rest = html;
    let mut offset = 0usize;
    loop {
        let Some(open_rel) = rest[offset..].find("<div") else {
            let trailing = flatten_text(&rest[offset..]);
            if !trailing.trim().is_empty() {
                push_text_lines(out, FormatId::Action, &trailing);
            }
            return;
        };
        let open = offset + open_rel;
        let leading = flatten_text(&rest[offset..open]);
        if !leading.trim().is_empty() {
            push_text_lines(out, FormatId::Action, &leading);
        }

        let Some((inner_start, inner_end, close_end)) = div_span(rest, open) else {
            // Unterminated div: flatten what remains.
            let tail = flatten_text(&rest[open..]);
            if !tail.trim().is_empty() {
                push_text_lines(out, FormatId::Action, &tail);
            }
            return;
        };
        let tag = &rest[open..inner_start];
        let inner = &rest[inner_start..inner_end];

        match format_class(tag) {
            Some("scene-header-top-line") => {
                // The wrapper's children are themselves the known subset.
                parse_fragment(inner, out);
            }
            class => {
                let format = class
                    .and_then(FormatId::parse)
                    .filter(FormatId::is_leaf)
                    .unwrap_or(FormatId::Action);
                push_text_lines(out, format, &flatten_text(inner));
            }
        }

        rest = &rest[close_end..];
        offset = 0;
    }
}

/// Parse the editor HTML fragment back into blocks.
pub fn html_to_blocks(html: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    parse_fragment(html, &mut blocks);
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(format: FormatId, text: &str) -> Block {
        Block::new(format, text)
    }

    #[test]
    fn test_leaf_round_trip() {
        let blocks = vec![
            block(FormatId::Action, "يدخل أحمد إلى الغرفة."),
            block(FormatId::Character, "أحمد:"),
            block(FormatId::Dialogue, "مرحباً يا سارة."),
        ];
        let html = blocks_to_html(&blocks);
        assert_eq!(html_to_blocks(&html), blocks);
    }

    #[test]
    fn test_top_line_wrapper_emitted_and_parsed() {
        let blocks = vec![
            block(FormatId::SceneHeader1, "مشهد 1"),
            block(FormatId::SceneHeader2, "داخلي - بيت أحمد - نهار"),
            block(FormatId::Action, "يدخل أحمد."),
        ];
        let html = blocks_to_html(&blocks);
        assert!(html.starts_with("<div class=\"format-scene-header-top-line\">"));
        assert_eq!(html_to_blocks(&html), blocks);
    }

    #[test]
    fn test_lone_header1_is_not_wrapped() {
        let blocks = vec![block(FormatId::SceneHeader1, "مشهد 5")];
        let html = blocks_to_html(&blocks);
        assert!(!html.contains("top-line"));
        assert_eq!(html_to_blocks(&html), blocks);
    }

    #[test]
    fn test_unknown_class_defaults_to_action() {
        let html = "<div class=\"format-shot\">لقطة قريبة</div>";
        let blocks = html_to_blocks(html);
        assert_eq!(blocks, vec![block(FormatId::Action, "لقطة قريبة")]);
    }

    #[test]
    fn test_multiline_text_node_splits() {
        let html = "<div class=\"format-dialogue\">سطر اول\nسطر تاني</div>";
        let blocks = html_to_blocks(html);
        assert_eq!(
            blocks,
            vec![
                block(FormatId::Dialogue, "سطر اول"),
                block(FormatId::Dialogue, "سطر تاني"),
            ]
        );
    }

    #[test]
    fn test_escaping_round_trip() {
        let blocks = vec![block(FormatId::Dialogue, "قال \"أهلاً\" <بسرعة> & مشى")];
        let html = blocks_to_html(&blocks);
        assert!(!html.contains("<بسرعة>"));
        assert_eq!(html_to_blocks(&html), blocks);
    }

    #[test]
    fn test_empty_text_becomes_br() {
        let blocks = vec![block(FormatId::Action, "")];
        let html = blocks_to_html(&blocks);
        assert_eq!(html, "<div class=\"format-action\"><br></div>");
        assert_eq!(html_to_blocks(&html), blocks);
    }

    #[test]
    fn test_foreign_tags_flattened() {
        let html = "<div class=\"format-action\"><span>يمشي</span> في <b>الشارع</b></div>";
        assert_eq!(
            html_to_blocks(html),
            vec![block(FormatId::Action, "يمشي في الشارع")]
        );
    }

    #[test]
    fn test_stray_text_outside_divs() {
        let html = "نص حر<div class=\"format-action\">يمشي</div>";
        assert_eq!(
            html_to_blocks(html),
            vec![
                block(FormatId::Action, "نص حر"),
                block(FormatId::Action, "يمشي"),
            ]
        );
    }
}
