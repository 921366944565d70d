//! End-to-end classification scenarios over the paste pipeline

use async_trait::async_trait;
use filmlane_core::{
    Adjudicator, ConfirmationCallback, FormatId, ReviewDecision, ReviewOutcome, ReviewPacket,
};
use filmlane_memory::{FeedbackStore, InMemoryStore, SessionMemory};
use filmlane_pipeline::{block_types, PasteOutcome, PastePipeline, PasteSource, PipelineConfig};
use parking_lot::Mutex;
use std::sync::Arc;

async fn run(input: &str) -> PasteOutcome {
    PastePipeline::default()
        .paste("s-test", input, PasteSource::Clipboard)
        .await
        .unwrap()
}

#[tokio::test]
async fn scenario_a_full_scene() {
    let input = "مشهد 1\nداخلي - بيت أحمد - نهار\nيدخل أحمد إلى الغرفة.\nأحمد:\nمرحباً يا سارة.\nسارة:\n(بفرح)\nأهلاً بك!\nقطع إلى:";
    let outcome = run(input).await;
    assert_eq!(
        block_types(&outcome),
        vec![
            FormatId::SceneHeader1,
            FormatId::SceneHeader2,
            FormatId::Action,
            FormatId::Character,
            FormatId::Dialogue,
            FormatId::Character,
            FormatId::Parenthetical,
            FormatId::Dialogue,
            FormatId::Transition,
        ]
    );
    // The header pair renders as one top-line composite on the HTML surface.
    let blocks: Vec<_> = outcome.blocks.iter().map(|b| b.block.clone()).collect();
    let html = filmlane_codec::blocks_to_html(&blocks);
    assert_eq!(html.matches("format-scene-header-top-line").count(), 1);
}

#[tokio::test]
async fn scenario_b_broken_name() {
    let outcome = run("الا\nسطى﹕\u{200F}").await;
    assert_eq!(outcome.blocks.len(), 1);
    assert_eq!(outcome.blocks[0].block.format_id, FormatId::Character);
    assert_eq!(outcome.blocks[0].block.text, "الاسطى:");
}

#[tokio::test]
async fn scenario_c_narrative_verbs_in_dialogue() {
    let input = "محمود:\nأنا معاك\nيرفع محمود يده معترضا\nينهض منصف من على الارض ليقف بجوار بوسي\nيقف بجوارها محمود";
    let outcome = run(input).await;
    assert_eq!(
        block_types(&outcome),
        vec![
            FormatId::Character,
            FormatId::Dialogue,
            FormatId::Action,
            FormatId::Action,
            FormatId::Action,
        ]
    );
}

#[tokio::test]
async fn scenario_d_basmala_and_composite_header() {
    let input = "بسم الله الرحمن الرحيم {\nمشهد 2 - ليل - داخلي\nغرفة المعيشة\n- ينظر حوله";
    let outcome = run(input).await;
    assert_eq!(
        block_types(&outcome),
        vec![
            FormatId::Basmala,
            FormatId::SceneHeader1,
            FormatId::SceneHeader2,
            FormatId::SceneHeader3,
            FormatId::Action,
        ]
    );
    assert_eq!(outcome.blocks[0].block.text, "بسم الله الرحمن الرحيم");
    assert_eq!(outcome.blocks[1].block.text, "مشهد 2");
    assert_eq!(outcome.blocks[2].block.text, "ليل - داخلي");
}

#[tokio::test]
async fn scenario_f_payload_round_trip() {
    let input = "مشهد 1\nداخلي - بيت أحمد - نهار\nيدخل أحمد إلى الغرفة.\nأحمد:\nمرحباً يا سارة.\nسارة:\n(بفرح)\nأهلاً بك!\nقطع إلى:";
    let outcome = run(input).await;
    let blocks: Vec<_> = outcome.blocks.iter().map(|b| b.block.clone()).collect();

    let payload = filmlane_codec::Payload::new(blocks.clone(), "Amiri", 14);
    let marker = filmlane_codec::build_marker(&filmlane_codec::encode_payload(&payload));
    let exported = format!("تصدير\n{marker}\nنهاية");

    let extracted = filmlane_codec::extract_marker(&exported).unwrap();
    let decoded = filmlane_codec::decode_payload(extracted).unwrap();
    assert_eq!(decoded.blocks, blocks);
}

#[tokio::test]
async fn every_block_is_leaf_typed_and_non_empty() {
    let input = "مشهد 1\nداخلي - بيت أحمد - نهار\nيدخل أحمد.\nأحمد : اهلا يا سارة\nقطع";
    let outcome = run(input).await;
    assert!(!outcome.blocks.is_empty());
    for emitted in &outcome.blocks {
        assert!(emitted.block.format_id.is_leaf());
        assert!(!emitted.block.text.is_empty());
    }
    assert_eq!(outcome.blocks.len(), outcome.records.len());
}

struct RecordingCallback {
    asked: Mutex<Vec<String>>,
    answer: FormatId,
}

#[async_trait]
impl ConfirmationCallback for RecordingCallback {
    async fn confirm(
        &self,
        line: &str,
        _suggested: FormatId,
        _confidence: u8,
    ) -> filmlane_core::Result<FormatId> {
        self.asked.lock().push(line.to_string());
        Ok(self.answer)
    }
}

#[tokio::test]
async fn low_confidence_items_defer_to_confirmation() {
    let callback = Arc::new(RecordingCallback {
        asked: Mutex::new(Vec::new()),
        answer: FormatId::Dialogue,
    });
    let store = Arc::new(InMemoryStore::new());
    // A high threshold makes every context-resolved item a candidate, so the
    // batch mechanics are exercised deterministically.
    let mut config = PipelineConfig::default();
    config.classifier.low_confidence_threshold = 95;
    let pipeline = PastePipeline::new(config)
        .with_memory(SessionMemory::new(store.clone()))
        .with_feedback(FeedbackStore::new(store.clone()))
        .with_confirmation(callback.clone());

    let input = "محمود:\nانا معاك\nيقف بجوارها\nيمشي بعيدا";
    let outcome = pipeline
        .paste("s-confirm", input, PasteSource::Clipboard)
        .await
        .unwrap();

    let batch_id = outcome.batch_id.clone().expect("low-confidence batch");
    let finished = pipeline
        .apply_confirmations(&batch_id)
        .await
        .unwrap()
        .expect("batch is pending");
    assert!(!callback.asked.lock().is_empty());
    assert!(finished.batch_id.is_none());
    // Every confirmed override is now dialogue.
    for index in outcome
        .records
        .iter()
        .enumerate()
        .filter(|(_, r)| r.original_confidence < 95)
        .map(|(i, _)| i)
    {
        assert_eq!(finished.records[index].assigned_type, FormatId::Dialogue);
    }
    // Re-application is a no-op.
    assert!(pipeline
        .apply_confirmations(&batch_id)
        .await
        .unwrap()
        .is_none());
}

struct StubAdjudicator {
    decisions: Vec<ReviewDecision>,
    seen: Mutex<Vec<ReviewPacket>>,
}

#[async_trait]
impl Adjudicator for StubAdjudicator {
    async fn review(&self, _session_id: &str, packet: &ReviewPacket) -> ReviewOutcome {
        self.seen.lock().push(packet.clone());
        ReviewOutcome::Applied {
            model: "stub-review".to_string(),
            decisions: self.decisions.clone(),
            latency_ms: 1,
        }
    }

    fn abort(&self, _session_id: &str) {}
}

#[tokio::test]
async fn scenario_e_review_flags_double_character_and_applies_decision() {
    let adjudicator = Arc::new(StubAdjudicator {
        decisions: vec![ReviewDecision {
            item_index: 1,
            final_type: FormatId::Dialogue,
            confidence: 0.93,
            reason: "سياق حواري".to_string(),
        }],
        seen: Mutex::new(Vec::new()),
    });
    let pipeline = PastePipeline::new(PipelineConfig {
        review_enabled: true,
        ..PipelineConfig::default()
    })
    .with_adjudicator(adjudicator.clone());

    // Two bare speaker cues in a row violate the sequence grammar.
    let input = "أحمد:\nسارة:\nاهلا بيك";
    let outcome = pipeline
        .paste("s-review", input, PasteSource::Clipboard)
        .await
        .unwrap();

    let packets = adjudicator.seen.lock();
    assert_eq!(packets.len(), 1);
    let flagged = &packets[0].suspicious_lines;
    assert_eq!(flagged.len(), 1);
    assert_eq!(flagged[0].item_index, 1);
    assert!(flagged[0].total_suspicion >= 74);
    assert_eq!(flagged[0].suggested_type, Some(FormatId::Dialogue));
    assert!(!flagged[0].context_lines.is_empty());

    // The accepted decision overrode the second cue.
    assert_eq!(outcome.records[1].assigned_type, FormatId::Dialogue);
    assert_eq!(outcome.blocks[1].block.format_id, FormatId::Dialogue);
    assert!(outcome.records[1].original_confidence >= 85);
}

#[tokio::test]
async fn review_decisions_with_invalid_indexes_are_ignored() {
    let adjudicator = Arc::new(StubAdjudicator {
        decisions: vec![ReviewDecision {
            item_index: 99,
            final_type: FormatId::Action,
            confidence: 0.9,
            reason: String::new(),
        }],
        seen: Mutex::new(Vec::new()),
    });
    let pipeline = PastePipeline::new(PipelineConfig {
        review_enabled: true,
        ..PipelineConfig::default()
    })
    .with_adjudicator(adjudicator);

    let outcome = pipeline
        .paste("s-review2", "أحمد:\nسارة:\nاهلا", PasteSource::Clipboard)
        .await
        .unwrap();
    // Nothing changed; the sequence is exactly the classifier's.
    assert_eq!(outcome.records[1].assigned_type, FormatId::Character);
}

#[tokio::test]
async fn memory_learns_characters_from_a_pass() {
    let store = Arc::new(InMemoryStore::new());
    let memory = SessionMemory::new(store.clone());
    let pipeline = PastePipeline::new(PipelineConfig::default())
        .with_memory(memory.clone());

    let input = "أحمد:\nاهلا يا سارة\nسارة:\nاهلا بيك";
    pipeline
        .paste("s-memory", input, PasteSource::Clipboard)
        .await
        .unwrap();

    let record = memory.load("s-memory").unwrap().unwrap();
    assert!(record.data.common_characters.contains(&"أحمد".to_string()));
    assert!(record.data.common_characters.contains(&"سارة".to_string()));
    assert!(record.data.last_classifications.len() >= 4);
}
