//! Flow operations on top of a flow backend

use std::sync::Arc;

use crate::metrics::FlowMetrics;
use crate::persistence::{FlowBackend, PersistenceError, PersistenceResult};

use super::catalog::create_from_template;
use super::picker::{filter_flows, published_flows, PickerEntry};
use super::types::{FlowPatch, FlowRecord, FlowSpec, FlowSummary};

#[derive(Clone)]
pub struct FlowService {
    backend: Arc<dyn FlowBackend>,
}

impl FlowService {
    pub fn new(backend: Arc<dyn FlowBackend>) -> Self {
        Self { backend }
    }

    pub fn backend_type(&self) -> &'static str {
        self.backend.backend_type()
    }

    /// Summaries in creation order, optionally narrowed by a search query
    pub async fn list(&self, query: Option<&str>) -> PersistenceResult<Vec<FlowSummary>> {
        let summaries: Vec<FlowSummary> = self
            .backend
            .list()
            .await?
            .iter()
            .map(FlowRecord::summary)
            .collect();
        Ok(filter_flows(summaries, query.unwrap_or_default()))
    }

    /// New flow with no screens
    pub async fn create(&self, name: &str) -> PersistenceResult<FlowRecord> {
        let record = FlowRecord::new(new_flow_id(), FlowSpec::blank(name));
        let record = self.backend.insert(record).await?;
        FlowMetrics::record_created("blank");
        tracing::info!(flow_id = %record.id, name = %name, "Flow created");
        Ok(record)
    }

    /// New flow seeded from a catalog entry. `name` overrides the catalog
    /// name when given.
    pub async fn create_from_template(
        &self,
        name: Option<&str>,
        key: &str,
    ) -> PersistenceResult<FlowRecord> {
        let Some(mut spec) = create_from_template(key) else {
            tracing::debug!(template_key = %key, "Unknown flow template");
            return Err(PersistenceError::NotFound(format!("flow template {}", key)));
        };
        if let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) {
            spec.name = name.to_string();
        }

        let record = self
            .backend
            .insert(FlowRecord::new(new_flow_id(), spec))
            .await?;
        FlowMetrics::record_created("template");
        tracing::info!(flow_id = %record.id, template_key = %key, "Flow created from template");
        Ok(record)
    }

    pub async fn get(&self, id: &str) -> PersistenceResult<FlowRecord> {
        self.backend.get(id).await
    }

    pub async fn save(&self, id: &str, patch: FlowPatch) -> PersistenceResult<FlowRecord> {
        let mut record = self.backend.get(id).await?;
        patch
            .apply(&mut record)
            .map_err(PersistenceError::ValidationRejected)?;
        let record = self.backend.update(record).await?;
        tracing::debug!(flow_id = %id, "Flow saved");
        Ok(record)
    }

    pub async fn delete(&self, id: &str) -> PersistenceResult<()> {
        self.backend.delete(id).await?;
        tracing::info!(flow_id = %id, "Flow deleted");
        Ok(())
    }

    /// Entries offered by the FLOW-button flow picker
    pub async fn picker(&self) -> PersistenceResult<Vec<PickerEntry>> {
        let summaries = self.list(None).await?;
        Ok(published_flows(&summaries))
    }
}

fn new_flow_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
