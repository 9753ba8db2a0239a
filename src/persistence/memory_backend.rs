//! In-memory persistence backends using DashMap.
//!
//! Data is lost on restart. Listing order follows insertion via a sequence
//! number kept next to each entry.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::{Map, Value};

use crate::flow::FlowRecord;
use crate::template::TemplateSpec;

use super::backend::{
    check_storable, merge_for_save, new_id, FlowBackend, PersistenceError, PersistenceResult,
    TemplateDraft, TemplateDraftBackend,
};

struct Sequenced<T> {
    seq: u64,
    value: T,
}

struct SequencedMap<T> {
    entries: DashMap<String, Sequenced<T>>,
    next_seq: AtomicU64,
}

impl<T: Clone> SequencedMap<T> {
    fn new() -> Self {
        Self {
            entries: DashMap::new(),
            next_seq: AtomicU64::new(0),
        }
    }

    fn insert(&self, id: String, value: T) {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.entries.insert(id, Sequenced { seq, value });
    }

    fn get(&self, id: &str) -> Option<T> {
        self.entries.get(id).map(|entry| entry.value.clone())
    }

    /// Replace the value in place, keeping the original sequence number
    fn replace(&self, id: &str, value: T) -> bool {
        match self.entries.get_mut(id) {
            Some(mut entry) => {
                entry.value = value;
                true
            }
            None => false,
        }
    }

    fn remove(&self, id: &str) -> bool {
        self.entries.remove(id).is_some()
    }

    fn ordered(&self) -> Vec<T> {
        let mut items: Vec<(u64, T)> = self
            .entries
            .iter()
            .map(|entry| (entry.seq, entry.value.clone()))
            .collect();
        items.sort_by_key(|(seq, _)| *seq);
        items.into_iter().map(|(_, value)| value).collect()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Template drafts held in memory
pub struct MemoryTemplateBackend {
    drafts: SequencedMap<TemplateDraft>,
}

impl MemoryTemplateBackend {
    pub fn new() -> Self {
        Self {
            drafts: SequencedMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryTemplateBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TemplateDraftBackend for MemoryTemplateBackend {
    fn backend_type(&self) -> &'static str {
        "memory"
    }

    async fn create(&self, spec: TemplateSpec) -> PersistenceResult<TemplateDraft> {
        check_storable(&spec)?;
        let draft = TemplateDraft::new(new_id(), spec);
        self.drafts.insert(draft.id.clone(), draft.clone());
        tracing::debug!(draft_id = %draft.id, "Template draft created");
        Ok(draft)
    }

    async fn load(&self, id: &str) -> PersistenceResult<TemplateDraft> {
        self.drafts
            .get(id)
            .ok_or_else(|| PersistenceError::NotFound(id.to_string()))
    }

    async fn save(&self, id: &str, patch: &Map<String, Value>) -> PersistenceResult<TemplateDraft> {
        let current = self.load(id).await?;
        let saved = merge_for_save(&current, patch)?;
        if !self.drafts.replace(id, saved.clone()) {
            return Err(PersistenceError::NotFound(id.to_string()));
        }
        Ok(saved)
    }

    async fn list(&self) -> PersistenceResult<Vec<TemplateDraft>> {
        Ok(self.drafts.ordered())
    }

    async fn delete(&self, id: &str) -> PersistenceResult<()> {
        if self.drafts.remove(id) {
            Ok(())
        } else {
            Err(PersistenceError::NotFound(id.to_string()))
        }
    }
}

/// Flows held in memory
pub struct MemoryFlowBackend {
    flows: SequencedMap<FlowRecord>,
}

impl MemoryFlowBackend {
    pub fn new() -> Self {
        Self {
            flows: SequencedMap::new(),
        }
    }
}

impl Default for MemoryFlowBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FlowBackend for MemoryFlowBackend {
    fn backend_type(&self) -> &'static str {
        "memory"
    }

    async fn list(&self) -> PersistenceResult<Vec<FlowRecord>> {
        Ok(self.flows.ordered())
    }

    async fn insert(&self, record: FlowRecord) -> PersistenceResult<FlowRecord> {
        self.flows.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn get(&self, id: &str) -> PersistenceResult<FlowRecord> {
        self.flows
            .get(id)
            .ok_or_else(|| PersistenceError::NotFound(id.to_string()))
    }

    async fn update(&self, record: FlowRecord) -> PersistenceResult<FlowRecord> {
        if self.flows.replace(&record.id, record.clone()) {
            Ok(record)
        } else {
            Err(PersistenceError::NotFound(record.id))
        }
    }

    async fn delete(&self, id: &str) -> PersistenceResult<()> {
        if self.flows.remove(id) {
            Ok(())
        } else {
            Err(PersistenceError::NotFound(id.to_string()))
        }
    }
}
