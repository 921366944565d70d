//! Per-session screenplay memory

use crate::{KeyValueStore, MemoryError};
use chrono::{DateTime, Utc};
use filmlane_core::{
    ClassifiedLine, ContextWindow, Correction, DialogueBlockSpan, FormatId, LineRelation,
};
use filmlane_text::patterns::MEMORY_INVALID_SINGLE_TOKENS;
use filmlane_text::{has_sentence_punctuation, normalize_character_name};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

const MAX_LAST_CLASSIFICATIONS: usize = 20;
const MAX_DIALOGUE_BLOCKS: usize = 50;
const MAX_RELATIONSHIPS: usize = 200;
const MAX_CORRECTIONS: usize = 200;

/// Durable per-session knowledge. Every collection has `#[serde(default)]`
/// so records written by older builds load with the missing parts filled in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default)]
    pub common_characters: Vec<String>,
    #[serde(default)]
    pub common_locations: Vec<String>,
    /// Newest first, capped at 20.
    #[serde(default)]
    pub last_classifications: Vec<FormatId>,
    /// Character name → dialogue-line tally.
    #[serde(default)]
    pub character_dialogue_map: BTreeMap<String, u32>,
    /// Capped at the last 50.
    #[serde(default)]
    pub dialogue_blocks: Vec<DialogueBlockSpan>,
    /// Capped at the last 200.
    #[serde(default)]
    pub line_relationships: Vec<LineRelation>,
    /// Capped at the last 200.
    #[serde(default)]
    pub user_corrections: Vec<Correction>,
    #[serde(default)]
    pub confidence_map: BTreeMap<usize, u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: String,
    pub last_modified: DateTime<Utc>,
    pub data: SessionData,
}

impl SessionRecord {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            last_modified: Utc::now(),
            data: SessionData::default(),
        }
    }
}

/// Name filter for memory harvesting: real speaker names only.
pub fn is_valid_memory_character_name(name: &str) -> bool {
    let chars = name.chars().count();
    if !(2..=40).contains(&chars) {
        return false;
    }
    let tokens: Vec<&str> = name.split_whitespace().collect();
    if tokens.is_empty() || tokens.len() > 5 {
        return false;
    }
    if has_sentence_punctuation(name) || name.contains(':') {
        return false;
    }
    if tokens.len() == 1 && MEMORY_INVALID_SINGLE_TOKENS.contains(tokens[0]) {
        return false;
    }
    true
}

/// The session-memory operations over a key-value store.
#[derive(Clone)]
pub struct SessionMemory {
    store: Arc<dyn KeyValueStore>,
}

impl SessionMemory {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn key(session_id: &str) -> String {
        format!("screenplay-memory-{session_id}")
    }

    /// Read a session record. A corrupt record reads as absent.
    pub fn load(&self, session_id: &str) -> Result<Option<SessionRecord>, MemoryError> {
        let Some(raw) = self.store.get(&Self::key(session_id))? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                tracing::warn!(session_id, error = %e, "discarding corrupt session record");
                Ok(None)
            }
        }
    }

    pub fn save(&self, session_id: &str, record: &SessionRecord) -> Result<(), MemoryError> {
        let raw = serde_json::to_string(record)?;
        self.store.put(&Self::key(session_id), raw)
    }

    /// Fold a finished pass into the session: recent types, character names,
    /// dialogue tallies, and the pass's context window, all capped.
    pub fn update(
        &self,
        session_id: &str,
        records: &[ClassifiedLine],
        window: &ContextWindow,
    ) -> Result<SessionRecord, MemoryError> {
        let mut record = self
            .load(session_id)?
            .unwrap_or_else(|| SessionRecord::new(session_id));
        let data = &mut record.data;

        for line in records {
            data.last_classifications.insert(0, line.assigned_type);

            if line.assigned_type == FormatId::Character {
                let name = normalize_character_name(&line.text);
                if is_valid_memory_character_name(&name) {
                    if !data.common_characters.contains(&name) {
                        data.common_characters.push(name.clone());
                    }
                    *data.character_dialogue_map.entry(name).or_insert(0) += 1;
                }
            }
        }
        data.last_classifications.truncate(MAX_LAST_CLASSIFICATIONS);

        data.dialogue_blocks
            .extend(window.dialogue_blocks.iter().cloned());
        trim_to_last(&mut data.dialogue_blocks, MAX_DIALOGUE_BLOCKS);

        data.line_relationships
            .extend(window.line_relationships.iter().copied());
        trim_to_last(&mut data.line_relationships, MAX_RELATIONSHIPS);

        for (line, confidence) in &window.confidence_map {
            data.confidence_map.insert(*line, *confidence);
        }

        record.last_modified = Utc::now();
        self.save(session_id, &record)?;
        Ok(record)
    }

    /// Append a user correction, keeping the newest 200.
    pub fn record_correction(
        &self,
        session_id: &str,
        correction: Correction,
    ) -> Result<(), MemoryError> {
        let mut record = self
            .load(session_id)?
            .unwrap_or_else(|| SessionRecord::new(session_id));
        record.data.user_corrections.push(correction);
        trim_to_last(&mut record.data.user_corrections, MAX_CORRECTIONS);
        record.last_modified = Utc::now();
        self.save(session_id, &record)
    }

    /// Most frequent adjacent type pair among the recent classifications,
    /// scanning both the newest-first order and its reverse. `None` unless a
    /// pair occurs at least twice.
    pub fn detect_pattern(&self, session_id: &str) -> Result<Option<String>, MemoryError> {
        let Some(record) = self.load(session_id)? else {
            return Ok(None);
        };
        let seq = &record.data.last_classifications;
        if seq.len() < 2 {
            return Ok(None);
        }

        let mut counts: BTreeMap<(FormatId, FormatId), u32> = BTreeMap::new();
        for pair in seq.windows(2) {
            *counts.entry((pair[0], pair[1])).or_insert(0) += 1;
        }
        let reversed: Vec<FormatId> = seq.iter().rev().copied().collect();
        for pair in reversed.windows(2) {
            *counts.entry((pair[0], pair[1])).or_insert(0) += 1;
        }

        Ok(counts
            .into_iter()
            .filter(|(_, n)| *n >= 2)
            .max_by_key(|(_, n)| *n)
            .map(|((a, b), _)| format!("{a}-{b}")))
    }
}

fn trim_to_last<T>(items: &mut Vec<T>, cap: usize) {
    if items.len() > cap {
        items.drain(..items.len() - cap);
    }
}
