//! Payload v1: the signed block-sequence exchange format
//!
//! Exports embed `[[FILMLANE_PAYLOAD_V1:<base64>]]` where the base64 is the
//! UTF-8 JSON of the payload record in the field order `version, blocks,
//! font, size, createdAt, checksum`. The checksum is FNV-1a 32-bit over the
//! serialization without the checksum field. Decoding verifies the checksum
//! and repairs legacy composite blocks.

use crate::{fnv::fnv1a_hex, CodecError};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{SecondsFormat, Utc};
use filmlane_core::{Block, FormatId};
use filmlane_text::patterns::SCENE_NUMBER_RE;
use serde::{Deserialize, Serialize};

pub const PAYLOAD_VERSION: u32 = 1;

/// Marker frame around the encoded payload.
const MARKER_PREFIX: &str = "[[FILMLANE_PAYLOAD_V1:";
const MARKER_SUFFIX: &str = "]]";

/// The exchange record. Field order matters: the checksum is computed over
/// the JSON of the first five fields in exactly this order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    pub version: u32,
    pub blocks: Vec<Block>,
    pub font: String,
    pub size: u32,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    pub checksum: String,
}

/// The checksummed portion, kept as its own type so serialization order is
/// fixed by construction.
#[derive(Serialize)]
struct PayloadCore<'a> {
    version: u32,
    blocks: &'a [Block],
    font: &'a str,
    size: u32,
    #[serde(rename = "createdAt")]
    created_at: &'a str,
}

impl Payload {
    /// Build a payload over normalized blocks, stamped with the current time.
    pub fn new(blocks: Vec<Block>, font: impl Into<String>, size: u32) -> Self {
        let blocks = normalize_blocks(&blocks);
        let font = font.into();
        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let checksum = checksum_of(&blocks, &font, size, &created_at);
        Self {
            version: PAYLOAD_VERSION,
            blocks,
            font,
            size,
            created_at,
            checksum,
        }
    }
}

fn checksum_of(blocks: &[Block], font: &str, size: u32, created_at: &str) -> String {
    let core = PayloadCore {
        version: PAYLOAD_VERSION,
        blocks,
        font,
        size,
        created_at,
    };
    // Serialization of a struct cannot fail.
    let json = serde_json::to_string(&core).expect("payload core serializes");
    fnv1a_hex(json.as_bytes())
}

/// Split a composite top-line block by the first `مشهد N` occurrence: the
/// match becomes the tier-1 header, the remainder (minus separator dashes)
/// the tier-2 header.
pub fn split_top_line(text: &str) -> Vec<Block> {
    match SCENE_NUMBER_RE.find(text) {
        Some(m) => {
            let header1 = text[m.start()..m.end()].trim();
            let mut rest = String::new();
            rest.push_str(text[..m.start()].trim());
            let tail = text[m.end()..].trim();
            if !tail.is_empty() {
                if !rest.is_empty() {
                    rest.push(' ');
                }
                rest.push_str(tail);
            }
            let rest = rest
                .trim_matches(|c: char| c == '-' || c == '–' || c.is_whitespace())
                .to_string();
            let mut out = vec![Block::new(FormatId::SceneHeader1, header1)];
            if !rest.is_empty() {
                out.push(Block::new(FormatId::SceneHeader2, rest));
            }
            out
        }
        None => vec![Block::new(FormatId::SceneHeader1, text.trim())],
    }
}

/// Payload-normal form: composite blocks split, NBSP to space, CR removed.
fn normalize_blocks(blocks: &[Block]) -> Vec<Block> {
    let mut out = Vec::with_capacity(blocks.len());
    for block in blocks {
        let text = block.text.replace('\u{00A0}', " ").replace('\r', "");
        if block.format_id == FormatId::SceneHeaderTopLine {
            out.extend(split_top_line(&text));
        } else {
            out.push(Block::new(block.format_id, text));
        }
    }
    out
}

/// Encode a payload to the base64 form embedded in markers.
pub fn encode_payload(payload: &Payload) -> String {
    // Serialization of a struct cannot fail.
    let json = serde_json::to_string(payload).expect("payload serializes");
    BASE64.encode(json.as_bytes())
}

/// Decode and verify a base64 payload. The checksum may cover either the
/// repaired blocks (current writers) or the raw pre-repair blocks (legacy
/// exports); both are accepted.
pub fn decode_payload(encoded: &str) -> Result<Payload, CodecError> {
    let bytes = BASE64
        .decode(encoded.trim())
        .map_err(|e| CodecError::InvalidPayload(format!("base64: {e}")))?;
    let json = String::from_utf8(bytes)
        .map_err(|e| CodecError::InvalidPayload(format!("utf-8: {e}")))?;
    let raw: Payload = serde_json::from_str(&json)
        .map_err(|e| CodecError::InvalidPayload(format!("json: {e}")))?;
    if raw.version != PAYLOAD_VERSION {
        return Err(CodecError::InvalidPayload(format!(
            "unsupported version {}",
            raw.version
        )));
    }

    let repaired = normalize_blocks(&raw.blocks);
    let current = checksum_of(&repaired, &raw.font, raw.size, &raw.created_at);
    let legacy = checksum_of(&raw.blocks, &raw.font, raw.size, &raw.created_at);
    if raw.checksum != current && raw.checksum != legacy {
        return Err(CodecError::ChecksumMismatch);
    }

    Ok(Payload {
        blocks: repaired,
        ..raw
    })
}

/// Frame an encoded payload for embedding in exported text.
pub fn build_marker(encoded: &str) -> String {
    format!("{MARKER_PREFIX}{encoded}{MARKER_SUFFIX}")
}

/// Pull the base64 out of the first marker in `text`, if any.
pub fn extract_marker(text: &str) -> Option<&str> {
    let start = text.find(MARKER_PREFIX)? + MARKER_PREFIX.len();
    let end = text[start..].find(MARKER_SUFFIX)? + start;
    Some(&text[start..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_blocks() -> Vec<Block> {
        vec![
            Block::new(FormatId::SceneHeader1, "مشهد 1"),
            Block::new(FormatId::SceneHeader2, "داخلي - بيت أحمد - نهار"),
            Block::new(FormatId::Action, "يدخل أحمد إلى الغرفة."),
            Block::new(FormatId::Character, "أحمد:"),
            Block::new(FormatId::Dialogue, "مرحباً يا سارة."),
        ]
    }

    #[test]
    fn test_round_trip() {
        let payload = Payload::new(sample_blocks(), "Amiri", 14);
        let encoded = encode_payload(&payload);
        let decoded = decode_payload(&encoded).unwrap();
        assert_eq!(decoded, payload);
        assert_eq!(decoded.blocks, sample_blocks());
    }

    #[test]
    fn test_field_order_in_json() {
        let payload = Payload::new(sample_blocks(), "Amiri", 14);
        let json = serde_json::to_string(&payload).unwrap();
        let version = json.find("\"version\"").unwrap();
        let blocks = json.find("\"blocks\"").unwrap();
        let font = json.find("\"font\"").unwrap();
        let size = json.find("\"size\"").unwrap();
        let created = json.find("\"createdAt\"").unwrap();
        let checksum = json.find("\"checksum\"").unwrap();
        assert!(version < blocks && blocks < font && font < size);
        assert!(size < created && created < checksum);
    }

    #[test]
    fn test_tampering_invalidates_checksum() {
        let payload = Payload::new(sample_blocks(), "Amiri", 14);
        let json = serde_json::to_string(&payload).unwrap();
        let tampered = json.replace("مرحباً", "وداعاً");
        let encoded = BASE64.encode(tampered.as_bytes());
        assert_eq!(decode_payload(&encoded), Err(CodecError::ChecksumMismatch));
    }

    #[test]
    fn test_unknown_format_id_fails_decode() {
        let payload = Payload::new(sample_blocks(), "Amiri", 14);
        let json = serde_json::to_string(&payload).unwrap();
        let broken = json.replace("scene-header-1", "shot");
        let encoded = BASE64.encode(broken.as_bytes());
        assert!(matches!(
            decode_payload(&encoded),
            Err(CodecError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_bad_base64_fails_decode() {
        assert!(matches!(
            decode_payload("هذا ليس base64"),
            Err(CodecError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_legacy_top_line_is_repaired() {
        // A legacy export stored the composite as one block and checksummed
        // it before repair.
        let legacy_blocks = vec![Block::new(
            FormatId::SceneHeaderTopLine,
            "مشهد 2 - ليل - داخلي",
        )];
        let created_at = "2024-06-01T10:00:00.000Z".to_string();
        let checksum = checksum_of(&legacy_blocks, "Amiri", 14, &created_at);
        let payload = Payload {
            version: PAYLOAD_VERSION,
            blocks: legacy_blocks,
            font: "Amiri".to_string(),
            size: 14,
            created_at,
            checksum,
        };
        let decoded = decode_payload(&encode_payload(&payload)).unwrap();
        assert_eq!(
            decoded.blocks,
            vec![
                Block::new(FormatId::SceneHeader1, "مشهد 2"),
                Block::new(FormatId::SceneHeader2, "ليل - داخلي"),
            ]
        );
    }

    #[test]
    fn test_split_top_line_rule() {
        assert_eq!(
            split_top_line("مشهد 2 - ليل - داخلي"),
            vec![
                Block::new(FormatId::SceneHeader1, "مشهد 2"),
                Block::new(FormatId::SceneHeader2, "ليل - داخلي"),
            ]
        );
        assert_eq!(
            split_top_line("مشهد 7"),
            vec![Block::new(FormatId::SceneHeader1, "مشهد 7")]
        );
    }

    #[test]
    fn test_marker_round_trip() {
        let payload = Payload::new(sample_blocks(), "Amiri", 14);
        let encoded = encode_payload(&payload);
        let marker = build_marker(&encoded);
        let surrounded = format!("نص قبل العلامة {marker} نص بعدها");
        assert_eq!(extract_marker(&surrounded), Some(encoded.as_str()));
        assert_eq!(extract_marker("لا علامة هنا"), None);
    }
}
