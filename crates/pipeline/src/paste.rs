//! The paste orchestrator
//!
//! One pass owns its whole lifecycle: extraction, the clipboard merge pass,
//! classification with structural splits, emission with spacing metadata,
//! then the deferred tail (low-confidence confirmations, the review round,
//! the session-memory update). A paste on a session aborts any in-flight
//! review from the previous paste on the same session.

use crate::extract::extract_plain_text;
use crate::merge::{merge_broken_character_name, wrap_should_merge, MergePolicy};
use crate::splits::{
    implicit_character_dialogue, parse_inline_character_dialogue, split_action_prefixed_character,
};
use crate::PipelineError;
use dashmap::DashMap;
use filmlane_classifier::{ClassifierConfig, ContextTracker, LineContext, Reviewer, ReviewerConfig, RuleClassifier};
use filmlane_codec::payload::split_top_line;
use filmlane_core::{
    margin_top_pt, Adjudicator, Block, Classification, ClassificationMethod, ClassifiedLine,
    ConfirmationCallback, ContextWindow, Correction, FormatId, ReviewOutcome,
};
use filmlane_memory::{FeedbackStore, SessionMemory};
use filmlane_text::patterns::INLINE_DIALOGUE_RE;
use filmlane_text::{normalize_line, strip_leading_bullets};
use std::collections::HashSet;
use std::sync::Arc;

/// Where the raw text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasteSource {
    Clipboard,
    FileImport,
}

#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub classifier: ClassifierConfig,
    pub reviewer: ReviewerConfig,
    /// Gates the adjudicator round; test runtimes leave it off.
    pub review_enabled: bool,
}

/// One emitted block with its spacing metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct EmittedBlock {
    pub block: Block,
    /// `None` means the renderer default.
    pub margin_top_pt: Option<u32>,
    pub confidence: u8,
}

/// Everything a paste produced.
#[derive(Debug, Clone)]
pub struct PasteOutcome {
    pub blocks: Vec<EmittedBlock>,
    pub records: Vec<ClassifiedLine>,
    pub window: ContextWindow,
    /// Set when low-confidence items await confirmation through
    /// [`PastePipeline::apply_confirmations`].
    pub batch_id: Option<String>,
    pub review: Option<ReviewOutcome>,
    pub merges: usize,
    pub splits: usize,
}

struct PendingBatch {
    session_id: String,
    item_indexes: Vec<usize>,
    outcome: PasteOutcome,
}

/// The pipeline with its collaborators. Collaborators are optional; a bare
/// pipeline classifies and emits, nothing else.
pub struct PastePipeline {
    classifier: RuleClassifier,
    reviewer: Reviewer,
    config: PipelineConfig,
    memory: Option<SessionMemory>,
    feedback: Option<FeedbackStore>,
    adjudicator: Option<Arc<dyn Adjudicator>>,
    confirmation: Option<Arc<dyn ConfirmationCallback>>,
    pending: DashMap<String, PendingBatch>,
}

impl Default for PastePipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl PastePipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            classifier: RuleClassifier::new(config.classifier.clone()),
            reviewer: Reviewer::new(config.reviewer.clone()),
            config,
            memory: None,
            feedback: None,
            adjudicator: None,
            confirmation: None,
            pending: DashMap::new(),
        }
    }

    pub fn with_memory(mut self, memory: SessionMemory) -> Self {
        self.memory = Some(memory);
        self
    }

    pub fn with_feedback(mut self, feedback: FeedbackStore) -> Self {
        self.feedback = Some(feedback);
        self
    }

    pub fn with_adjudicator(mut self, adjudicator: Arc<dyn Adjudicator>) -> Self {
        self.adjudicator = Some(adjudicator);
        self
    }

    pub fn with_confirmation(mut self, callback: Arc<dyn ConfirmationCallback>) -> Self {
        self.confirmation = Some(callback);
        self
    }

    /// Names already established as speakers, for the implicit-speaker split.
    fn known_names(&self, session_id: &str, tracker: &ContextTracker) -> HashSet<String> {
        let mut names: HashSet<String> = tracker
            .window()
            .dialogue_blocks
            .iter()
            .map(|b| b.character.clone())
            .collect();
        if let Some(memory) = &self.memory {
            if let Ok(Some(record)) = memory.load(session_id) {
                names.extend(record.data.common_characters);
            }
        }
        names
    }

    /// Run a full paste. Returns the first-pass result; when `batch_id` is
    /// set the review round and memory update wait for
    /// [`Self::apply_confirmations`].
    pub async fn paste(
        &self,
        session_id: &str,
        raw: &str,
        source: PasteSource,
    ) -> Result<PasteOutcome, PipelineError> {
        let started = std::time::Instant::now();
        if let Some(adjudicator) = &self.adjudicator {
            adjudicator.abort(session_id);
        }

        let plain = extract_plain_text(raw);
        let mut lines: Vec<String> = plain
            .split('\n')
            .map(|line| strip_leading_bullets(&normalize_line(line)))
            .filter(|line| !line.is_empty())
            .collect();

        let mut merges = 0usize;
        if source == PasteSource::Clipboard {
            lines = self.merge_pass(lines, &mut merges);
        }

        let (blocks, records, window, splits) = self.classify_lines(session_id, &lines);

        let mut outcome = PasteOutcome {
            blocks,
            records,
            window,
            batch_id: None,
            review: None,
            merges,
            splits,
        };

        // Deferred confirmations for low-confidence items.
        if self.confirmation.is_some() {
            let threshold = self.config.classifier.low_confidence_threshold;
            let item_indexes: Vec<usize> = outcome
                .records
                .iter()
                .enumerate()
                .filter(|(_, r)| r.original_confidence < threshold)
                .map(|(i, _)| i)
                .collect();
            if !item_indexes.is_empty() {
                let batch_id = format!(
                    "{session_id}-{}",
                    chrono::Utc::now().timestamp_millis()
                );
                outcome.batch_id = Some(batch_id.clone());
                self.pending.insert(
                    batch_id,
                    PendingBatch {
                        session_id: session_id.to_string(),
                        item_indexes,
                        outcome: outcome.clone(),
                    },
                );
                tracing::info!(
                    session_id,
                    blocks = outcome.blocks.len(),
                    merges,
                    splits,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "paste classified; confirmations pending"
                );
                return Ok(outcome);
            }
        }

        self.finish(session_id, &mut outcome).await;
        tracing::info!(
            session_id,
            blocks = outcome.blocks.len(),
            merges,
            splits,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "paste complete"
        );
        Ok(outcome)
    }

    /// Merge pass over cleaned clipboard lines: broken names, wrapped tails,
    /// ellipsis continuations.
    fn merge_pass(&self, lines: Vec<String>, merges: &mut usize) -> Vec<String> {
        let mut merged: Vec<String> = Vec::with_capacity(lines.len());
        for current in lines {
            let Some(prev) = merged.last_mut() else {
                merged.push(current);
                continue;
            };

            if let Some(healed) = merge_broken_character_name(prev, &current) {
                *prev = healed;
                *merges += 1;
                continue;
            }
            if wrap_should_merge(prev, &current, MergePolicy::paste()) {
                prev.push(' ');
                prev.push_str(&current);
                *merges += 1;
                continue;
            }
            // An inline speaker line keeps collecting its trailing ellipsis
            // continuations.
            if INLINE_DIALOGUE_RE.is_match(prev)
                && (current.starts_with("...") || current.starts_with('…'))
            {
                prev.push(' ');
                prev.push_str(&current);
                *merges += 1;
                continue;
            }
            merged.push(current);
        }
        merged
    }

    fn classify_lines(
        &self,
        session_id: &str,
        lines: &[String],
    ) -> (Vec<EmittedBlock>, Vec<ClassifiedLine>, ContextWindow, usize) {
        let mut tracker = ContextTracker::new();
        let mut blocks: Vec<EmittedBlock> = Vec::with_capacity(lines.len());
        let mut records: Vec<ClassifiedLine> = Vec::with_capacity(lines.len());
        let mut splits = 0usize;

        let emit = |tracker: &mut ContextTracker,
                        blocks: &mut Vec<EmittedBlock>,
                        records: &mut Vec<ClassifiedLine>,
                        text: String,
                        classification: Classification| {
            let item_index = records.len();
            tracker.advance(
                item_index,
                classification.assigned_type,
                &text,
                classification.confidence,
            );
            records.push(ClassifiedLine::from_classification(
                item_index,
                text.clone(),
                &classification,
            ));
            blocks.push(EmittedBlock {
                block: Block::new(classification.assigned_type, text),
                margin_top_pt: None,
                confidence: classification.confidence,
            });
        };

        for (i, line) in lines.iter().enumerate() {
            let ctx = LineContext::build(lines, i, tracker.previous_types());

            if let Some((action, character)) = split_action_prefixed_character(line) {
                splits += 1;
                emit(
                    &mut tracker,
                    &mut blocks,
                    &mut records,
                    action,
                    Classification::new(FormatId::Action, 90, "split:action-prefix", ClassificationMethod::Regex),
                );
                emit(
                    &mut tracker,
                    &mut blocks,
                    &mut records,
                    character,
                    Classification::new(FormatId::Character, 95, "split:action-prefix", ClassificationMethod::Regex),
                );
                continue;
            }

            if let Some(split) = parse_inline_character_dialogue(line) {
                splits += 1;
                if let Some(cue) = split.cue {
                    emit(
                        &mut tracker,
                        &mut blocks,
                        &mut records,
                        cue,
                        Classification::new(FormatId::Action, 90, "split:inline-speaker", ClassificationMethod::Regex),
                    );
                }
                emit(
                    &mut tracker,
                    &mut blocks,
                    &mut records,
                    split.character,
                    Classification::new(FormatId::Character, 95, "split:inline-speaker", ClassificationMethod::Regex),
                );
                emit(
                    &mut tracker,
                    &mut blocks,
                    &mut records,
                    split.dialogue,
                    Classification::new(FormatId::Dialogue, 90, "split:inline-speaker", ClassificationMethod::Regex),
                );
                continue;
            }

            let known = self.known_names(session_id, &tracker);
            if let Some((character, dialogue)) = implicit_character_dialogue(line, &ctx, &known) {
                splits += 1;
                emit(
                    &mut tracker,
                    &mut blocks,
                    &mut records,
                    character,
                    Classification::new(FormatId::Character, 75, "split:implicit-speaker", ClassificationMethod::Context),
                );
                emit(
                    &mut tracker,
                    &mut blocks,
                    &mut records,
                    dialogue,
                    Classification::new(FormatId::Dialogue, 75, "split:implicit-speaker", ClassificationMethod::Context),
                );
                continue;
            }

            let classification = self.classifier.classify(line, &ctx);

            if classification.assigned_type == FormatId::SceneHeaderTopLine {
                splits += 1;
                for part in split_top_line(line) {
                    let c = Classification::new(
                        part.format_id,
                        classification.confidence,
                        classification.reason.clone(),
                        classification.method,
                    );
                    emit(&mut tracker, &mut blocks, &mut records, part.text, c);
                }
                continue;
            }

            let text = if classification.assigned_type == FormatId::Basmala {
                filmlane_text::BASMALA_CANONICAL.to_string()
            } else {
                line.clone()
            };
            emit(&mut tracker, &mut blocks, &mut records, text, classification);
        }

        assign_margins(&mut blocks);
        (blocks, records, tracker.into_window(), splits)
    }

    /// The deferred tail shared by both completion paths: the review round
    /// and the session-memory update.
    async fn finish(&self, session_id: &str, outcome: &mut PasteOutcome) {
        if self.config.review_enabled {
            if let Some(adjudicator) = &self.adjudicator {
                let packet = self.reviewer.review(&outcome.records);
                if !packet.is_empty() {
                    let review = adjudicator.review(session_id, &packet).await;
                    self.apply_decisions(outcome, &review);
                    outcome.review = Some(review);
                }
            }
        }

        if let Some(memory) = &self.memory {
            if let Err(e) = memory.update(session_id, &outcome.records, &outcome.window) {
                tracing::warn!(session_id, error = %e, "session memory update failed");
            }
        }
    }

    /// Apply adjudicator overrides: valid indexes, actual type changes, in
    /// ascending item order. Confidence maps from the wire's 0–1 scale.
    fn apply_decisions(&self, outcome: &mut PasteOutcome, review: &ReviewOutcome) {
        let mut decisions = review.decisions().to_vec();
        decisions.sort_by_key(|d| d.item_index);
        let mut changed = false;
        for decision in decisions {
            let Some(record) = outcome.records.get_mut(decision.item_index) else {
                tracing::warn!(item = decision.item_index, "decision for unknown item");
                continue;
            };
            if decision.final_type == record.assigned_type {
                continue;
            }
            let confidence = ((decision.confidence * 100.0).round() as u8).max(85);
            tracing::info!(
                item = decision.item_index,
                from = %record.assigned_type,
                to = %decision.final_type,
                confidence,
                "applying review decision"
            );
            record.assigned_type = decision.final_type;
            record.original_confidence = confidence;
            let block = &mut outcome.blocks[decision.item_index];
            block.block.format_id = decision.final_type;
            block.confidence = confidence;
            changed = true;
        }
        if changed {
            assign_margins(&mut outcome.blocks);
        }
    }

    /// Consume a confirmation batch: ask the callback about every deferred
    /// item in ascending order, record corrections, re-emit metadata, then
    /// run the deferred tail. Idempotent: a consumed or unknown batch yields
    /// `None`.
    pub async fn apply_confirmations(
        &self,
        batch_id: &str,
    ) -> Result<Option<PasteOutcome>, PipelineError> {
        let Some(callback) = &self.confirmation else {
            // Consuming the batch without a callback would lose it silently.
            return Err(PipelineError::Confirmation(
                "pending batch with no confirmation callback".to_string(),
            ));
        };
        let Some((_, batch)) = self.pending.remove(batch_id) else {
            return Ok(None);
        };

        let PendingBatch {
            session_id,
            item_indexes,
            mut outcome,
        } = batch;

        let mut changed = false;
        for index in item_indexes {
            let (text, suggested, confidence) = {
                let record = &outcome.records[index];
                (
                    record.text.clone(),
                    record.assigned_type,
                    record.original_confidence,
                )
            };
            let confirmed = match callback.confirm(&text, suggested, confidence).await {
                Ok(format) => format,
                Err(e) => {
                    tracing::warn!(item = index, error = %e, "confirmation failed; keeping type");
                    continue;
                }
            };
            if confirmed == suggested {
                continue;
            }

            let correction = Correction::new(text, suggested, confirmed, confidence);
            if let Some(memory) = &self.memory {
                if let Err(e) = memory.record_correction(&session_id, correction.clone()) {
                    tracing::warn!(error = %e, "failed to store correction in session memory");
                }
            }
            if let Some(feedback) = &self.feedback {
                if let Err(e) = feedback.add_correction(correction) {
                    tracing::warn!(error = %e, "failed to append correction to feedback log");
                }
            }

            let record = &mut outcome.records[index];
            record.assigned_type = confirmed;
            record.original_confidence = 95;
            outcome.blocks[index].block.format_id = confirmed;
            outcome.blocks[index].confidence = 95;
            changed = true;
        }
        if changed {
            assign_margins(&mut outcome.blocks);
        }
        outcome.batch_id = None;

        self.finish(&session_id, &mut outcome).await;
        Ok(Some(outcome))
    }

    /// Discard a batch without consulting the callback.
    pub fn discard_confirmations(&self, batch_id: &str) -> bool {
        self.pending.remove(batch_id).is_some()
    }
}

/// Recompute spacing metadata across the whole sequence.
fn assign_margins(blocks: &mut [EmittedBlock]) {
    let mut prev: Option<FormatId> = None;
    for emitted in blocks.iter_mut() {
        emitted.margin_top_pt = match prev {
            Some(p) => margin_top_pt(p, emitted.block.format_id),
            None => None,
        };
        prev = Some(emitted.block.format_id);
    }
}

/// Convenience for callers that only need typed blocks.
pub fn block_types(outcome: &PasteOutcome) -> Vec<FormatId> {
    outcome
        .blocks
        .iter()
        .map(|b| b.block.format_id)
        .collect()
}
