//! Persistence backend contracts and shared types.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::flow::FlowRecord;
use crate::template::{apply_patch, validate, TemplateSpec};

/// Errors reported by persistence backends
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// The store refused the content; the message is shown to the user as-is
    #[error("{0}")]
    ValidationRejected(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// A persisted template draft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDraft {
    pub id: String,
    pub spec: TemplateSpec,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TemplateDraft {
    pub fn new(id: String, spec: TemplateSpec) -> Self {
        let now = Utc::now();
        Self {
            id,
            spec,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Storage contract for template drafts.
///
/// `save` merges `patch` into the stored document; the merged result must be
/// free of validation errors (warnings are fine) or the save is refused with
/// `ValidationRejected` and the stored draft is unchanged.
#[async_trait]
pub trait TemplateDraftBackend: Send + Sync {
    fn backend_type(&self) -> &'static str;

    async fn create(&self, spec: TemplateSpec) -> PersistenceResult<TemplateDraft>;

    async fn load(&self, id: &str) -> PersistenceResult<TemplateDraft>;

    async fn save(&self, id: &str, patch: &Map<String, Value>) -> PersistenceResult<TemplateDraft>;

    /// All drafts, oldest first
    async fn list(&self) -> PersistenceResult<Vec<TemplateDraft>>;

    async fn delete(&self, id: &str) -> PersistenceResult<()>;
}

/// Storage contract for flows. Backends store records as given; flow rules
/// live in `FlowService`.
#[async_trait]
pub trait FlowBackend: Send + Sync {
    fn backend_type(&self) -> &'static str;

    /// All flows, oldest first
    async fn list(&self) -> PersistenceResult<Vec<FlowRecord>>;

    async fn insert(&self, record: FlowRecord) -> PersistenceResult<FlowRecord>;

    async fn get(&self, id: &str) -> PersistenceResult<FlowRecord>;

    /// Replace an existing record
    async fn update(&self, record: FlowRecord) -> PersistenceResult<FlowRecord>;

    async fn delete(&self, id: &str) -> PersistenceResult<()>;
}

/// Merge and check a draft save; shared by every draft backend.
pub(crate) fn merge_for_save(
    draft: &TemplateDraft,
    patch: &Map<String, Value>,
) -> PersistenceResult<TemplateDraft> {
    let spec = apply_patch(&draft.spec, patch);
    check_storable(&spec)?;
    Ok(TemplateDraft {
        id: draft.id.clone(),
        spec,
        created_at: draft.created_at,
        updated_at: Utc::now(),
    })
}

pub(crate) fn check_storable(spec: &TemplateSpec) -> PersistenceResult<()> {
    let report = validate(spec);
    if report.has_errors() {
        return Err(PersistenceError::ValidationRejected(report.error_summary()));
    }
    Ok(())
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
