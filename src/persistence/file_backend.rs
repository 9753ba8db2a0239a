//! JSON-file persistence backends.
//!
//! One file per record: `{data_dir}/templates/{id}.json` and
//! `{data_dir}/flows/{id}.json`. Writes go to a temporary file first and are
//! renamed into place.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::fs;

use crate::flow::FlowRecord;
use crate::template::TemplateSpec;

use super::backend::{
    check_storable, merge_for_save, new_id, FlowBackend, PersistenceError, PersistenceResult,
    TemplateDraft, TemplateDraftBackend,
};

/// Directory of JSON documents keyed by id
struct JsonDir {
    root: PathBuf,
}

impl JsonDir {
    fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Ids map straight to file names, so only a safe character set is accepted
    fn path_for(&self, id: &str) -> PersistenceResult<PathBuf> {
        let valid = !id.is_empty()
            && id.len() <= 64
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(PersistenceError::NotFound(id.to_string()));
        }
        Ok(self.root.join(format!("{}.json", id)))
    }

    async fn read<T: DeserializeOwned>(&self, id: &str) -> PersistenceResult<T> {
        let path = self.path_for(id)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(PersistenceError::NotFound(id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, id: &str) -> PersistenceResult<bool> {
        let path = self.path_for(id)?;
        Ok(fs::try_exists(&path).await?)
    }

    async fn write<T: Serialize>(&self, id: &str, value: &T) -> PersistenceResult<()> {
        let path = self.path_for(id)?;
        fs::create_dir_all(&self.root).await?;
        let bytes = serde_json::to_vec_pretty(value)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, bytes).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn remove(&self, id: &str) -> PersistenceResult<()> {
        let path = self.path_for(id)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(PersistenceError::NotFound(id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Every readable document; unreadable files are skipped with a warning
    async fn read_all<T: DeserializeOwned>(&self) -> PersistenceResult<Vec<T>> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut items = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            match read_file(&path).await {
                Ok(item) => items.push(item),
                Err(e) => tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Skipping unreadable record"
                ),
            }
        }
        Ok(items)
    }
}

async fn read_file<T: DeserializeOwned>(path: &Path) -> PersistenceResult<T> {
    let bytes = fs::read(path).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Template drafts stored as JSON files
pub struct FileTemplateBackend {
    dir: JsonDir,
}

impl FileTemplateBackend {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            dir: JsonDir::new(data_dir.as_ref().join("templates")),
        }
    }
}

#[async_trait]
impl TemplateDraftBackend for FileTemplateBackend {
    fn backend_type(&self) -> &'static str {
        "file"
    }

    async fn create(&self, spec: TemplateSpec) -> PersistenceResult<TemplateDraft> {
        check_storable(&spec)?;
        let draft = TemplateDraft::new(new_id(), spec);
        self.dir.write(&draft.id, &draft).await?;
        tracing::debug!(draft_id = %draft.id, "Template draft written");
        Ok(draft)
    }

    async fn load(&self, id: &str) -> PersistenceResult<TemplateDraft> {
        self.dir.read(id).await
    }

    async fn save(&self, id: &str, patch: &Map<String, Value>) -> PersistenceResult<TemplateDraft> {
        let current: TemplateDraft = self.dir.read(id).await?;
        let saved = merge_for_save(&current, patch)?;
        self.dir.write(id, &saved).await?;
        Ok(saved)
    }

    async fn list(&self) -> PersistenceResult<Vec<TemplateDraft>> {
        let mut drafts: Vec<TemplateDraft> = self.dir.read_all().await?;
        drafts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(drafts)
    }

    async fn delete(&self, id: &str) -> PersistenceResult<()> {
        self.dir.remove(id).await
    }
}

/// Flows stored as JSON files
pub struct FileFlowBackend {
    dir: JsonDir,
}

impl FileFlowBackend {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            dir: JsonDir::new(data_dir.as_ref().join("flows")),
        }
    }
}

#[async_trait]
impl FlowBackend for FileFlowBackend {
    fn backend_type(&self) -> &'static str {
        "file"
    }

    async fn list(&self) -> PersistenceResult<Vec<FlowRecord>> {
        let mut flows: Vec<FlowRecord> = self.dir.read_all().await?;
        flows.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(flows)
    }

    async fn insert(&self, record: FlowRecord) -> PersistenceResult<FlowRecord> {
        self.dir.write(&record.id, &record).await?;
        Ok(record)
    }

    async fn get(&self, id: &str) -> PersistenceResult<FlowRecord> {
        self.dir.read(id).await
    }

    async fn update(&self, record: FlowRecord) -> PersistenceResult<FlowRecord> {
        if !self.dir.exists(&record.id).await? {
            return Err(PersistenceError::NotFound(record.id));
        }
        self.dir.write(&record.id, &record).await?;
        Ok(record)
    }

    async fn delete(&self, id: &str) -> PersistenceResult<()> {
        self.dir.remove(id).await
    }
}
