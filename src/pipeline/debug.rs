use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use serde_json::{Map, Value};

use super::stage::{PipelineError, PipelineStage};
use crate::models::DebugRecord;

/// Per-run diagnostics accumulator.
///
/// Concurrent tasks only ever touch their own entry under `pages`, keyed by
/// URL, so the locks are held for a single insert.
pub struct DebugTrail {
    entries: Mutex<DebugRecord>,
    pages: Mutex<Map<String, Value>>,
    stages: Mutex<Vec<PipelineStage>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl DebugTrail {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Map::new()),
            pages: Mutex::new(Map::new()),
            stages: Mutex::new(Vec::new()),
        }
    }

    pub fn record<T: Serialize>(&self, key: &str, value: T) {
        let value = serde_json::to_value(value).unwrap_or_else(|err| {
            Value::String(format!("<unserializable: {}>", err))
        });
        lock(&self.entries).insert(key.to_string(), value);
    }

    /// Merges `fields` into the entry for `url`, later writes winning.
    pub fn update_page(&self, url: &str, fields: Map<String, Value>) {
        let mut pages = lock(&self.pages);
        let entry = pages
            .entry(url.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(existing) = entry {
            existing.extend(fields);
        }
    }

    pub fn enter(&self, stage: PipelineStage) {
        tracing::debug!("[pipeline] entering {}", stage.as_str());
        lock(&self.stages).push(stage);
    }

    pub fn stages(&self) -> Vec<PipelineStage> {
        lock(&self.stages).clone()
    }

    pub fn current_stage(&self) -> Option<PipelineStage> {
        lock(&self.stages).last().copied()
    }

    pub fn record_critical(&self, error: &PipelineError) {
        self.record("critical_error", error);
    }

    pub fn into_record(self) -> DebugRecord {
        let mut record = self
            .entries
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        let stages = self.stages.into_inner().unwrap_or_else(PoisonError::into_inner);
        let pages = self.pages.into_inner().unwrap_or_else(PoisonError::into_inner);

        record.insert(
            "stages".to_string(),
            Value::Array(
                stages
                    .iter()
                    .map(|stage| Value::String(stage.as_str().to_string()))
                    .collect(),
            ),
        );
        if !pages.is_empty() {
            record.insert("pages".to_string(), Value::Object(pages));
        }
        record
    }
}

impl Default for DebugTrail {
    fn default() -> Self {
        Self::new()
    }
}
