//! End-to-end payload round-trip over a realistic scene

use filmlane_codec::{
    blocks_to_html, build_marker, decode_payload, encode_payload, extract_marker, html_to_blocks,
    Payload,
};
use filmlane_core::{Block, FormatId};

fn scene_blocks() -> Vec<Block> {
    vec![
        Block::new(FormatId::SceneHeader1, "مشهد 1"),
        Block::new(FormatId::SceneHeader2, "داخلي - بيت أحمد - نهار"),
        Block::new(FormatId::Action, "يدخل أحمد إلى الغرفة."),
        Block::new(FormatId::Character, "أحمد:"),
        Block::new(FormatId::Dialogue, "مرحباً يا سارة."),
        Block::new(FormatId::Character, "سارة:"),
        Block::new(FormatId::Parenthetical, "(بفرح)"),
        Block::new(FormatId::Dialogue, "أهلاً بك!"),
        Block::new(FormatId::Transition, "قطع إلى:"),
    ]
}

#[test]
fn payload_survives_marker_embedding() {
    let blocks = scene_blocks();
    let payload = Payload::new(blocks.clone(), "Amiri", 14);
    let marker = build_marker(&encode_payload(&payload));

    let exported = format!(
        "سيناريو فيلم\n\n{}\n\n{}",
        blocks
            .iter()
            .map(|b| b.text.clone())
            .collect::<Vec<_>>()
            .join("\n"),
        marker
    );

    let extracted = extract_marker(&exported).expect("marker present");
    let decoded = decode_payload(extracted).expect("payload decodes");
    assert_eq!(decoded.blocks, blocks);
    assert_eq!(decoded.font, "Amiri");
    assert_eq!(decoded.size, 14);
}

#[test]
fn html_surface_round_trips_the_same_scene() {
    let blocks = scene_blocks();
    let html = blocks_to_html(&blocks);
    // The header pair collapses into one wrapper element on the surface.
    assert_eq!(html.matches("format-scene-header-top-line").count(), 1);
    assert_eq!(html_to_blocks(&html), blocks);
}
