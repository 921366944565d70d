//! Append-only correction log feeding future retraining

use crate::{KeyValueStore, MemoryError};
use filmlane_core::Correction;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const CORRECTIONS_KEY: &str = "screenplay-user-corrections";

/// Retraining batch size: every full multiple of this count triggers one.
const RETRAIN_BATCH: usize = 50;

/// One labeled example exported for training.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub text: String,
    pub label: String,
}

/// The process-wide correction log. Writes only append.
#[derive(Clone)]
pub struct FeedbackStore {
    store: Arc<dyn KeyValueStore>,
}

impl FeedbackStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn read_all(&self) -> Result<Vec<Correction>, MemoryError> {
        let Some(raw) = self.store.get(CORRECTIONS_KEY)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(list) => Ok(list),
            Err(e) => {
                tracing::warn!(error = %e, "discarding corrupt correction log");
                Ok(Vec::new())
            }
        }
    }

    pub fn add_correction(&self, correction: Correction) -> Result<usize, MemoryError> {
        let mut all = self.read_all()?;
        all.push(correction);
        self.store
            .put(CORRECTIONS_KEY, serde_json::to_string(&all)?)?;
        Ok(all.len())
    }

    pub fn count(&self) -> Result<usize, MemoryError> {
        Ok(self.read_all()?.len())
    }

    /// A retrain is due exactly at every full batch of 50 corrections.
    pub fn should_retrain(&self) -> Result<bool, MemoryError> {
        let count = self.count()?;
        Ok(count >= RETRAIN_BATCH && count % RETRAIN_BATCH == 0)
    }

    /// The log as `(text, label)` training pairs, labeled with the corrected
    /// type.
    pub fn export_for_training(&self) -> Result<Vec<TrainingExample>, MemoryError> {
        Ok(self
            .read_all()?
            .into_iter()
            .map(|c| TrainingExample {
                text: c.line,
                label: c.corrected_type.as_str().to_string(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryStore;
    use filmlane_core::FormatId;

    fn store() -> FeedbackStore {
        FeedbackStore::new(Arc::new(InMemoryStore::new()))
    }

    fn correction(text: &str) -> Correction {
        Correction::new(text, FormatId::Action, FormatId::Dialogue, 50)
    }

    #[test]
    fn test_append_and_count() {
        let feedback = store();
        assert_eq!(feedback.count().unwrap(), 0);
        feedback.add_correction(correction("سطر 1")).unwrap();
        feedback.add_correction(correction("سطر 2")).unwrap();
        assert_eq!(feedback.count().unwrap(), 2);
    }

    #[test]
    fn test_retrain_trigger_at_batch_boundaries() {
        let feedback = store();
        for i in 0..49 {
            feedback.add_correction(correction(&format!("سطر {i}"))).unwrap();
            assert!(!feedback.should_retrain().unwrap());
        }
        feedback.add_correction(correction("سطر 49")).unwrap();
        assert!(feedback.should_retrain().unwrap());
        feedback.add_correction(correction("سطر 50")).unwrap();
        assert!(!feedback.should_retrain().unwrap());
    }

    #[test]
    fn test_export_labels_use_corrected_type() {
        let feedback = store();
        feedback.add_correction(correction("تعال هنا")).unwrap();
        let examples = feedback.export_for_training().unwrap();
        assert_eq!(
            examples,
            vec![TrainingExample {
                text: "تعال هنا".to_string(),
                label: "dialogue".to_string(),
            }]
        );
    }
}
