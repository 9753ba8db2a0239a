//! Editing session: one editor bound to one persisted draft.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::metrics::DraftMetrics;
use crate::persistence::{PersistenceResult, TemplateDraftBackend};

use super::editor::TemplateEditor;
use super::types::TemplateSpec;

/// Holds the canonical document for a draft while it is being edited.
///
/// `save` takes `&mut self`, so a session can never have two saves in flight.
/// A failed save leaves the document as it was and records the error for the
/// caller to retry.
pub struct TemplateSession {
    backend: Arc<dyn TemplateDraftBackend>,
    id: String,
    editor: TemplateEditor,
    saved: Arc<TemplateSpec>,
    last_error: Option<String>,
}

impl TemplateSession {
    pub async fn open(backend: Arc<dyn TemplateDraftBackend>, id: &str) -> PersistenceResult<Self> {
        let draft = backend.load(id).await?;
        let editor = TemplateEditor::from_spec(draft.spec);
        let saved = editor.document().clone();

        Ok(Self {
            backend,
            id: draft.id,
            editor,
            saved,
            last_error: None,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn editor(&self) -> &TemplateEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut TemplateEditor {
        &mut self.editor
    }

    pub fn document(&self) -> &Arc<TemplateSpec> {
        self.editor.document()
    }

    /// True when the document changed since it was loaded or last saved
    pub fn is_dirty(&self) -> bool {
        !Arc::ptr_eq(&self.saved, self.editor.document())
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Send the whole document to the backend
    pub async fn save(&mut self) -> PersistenceResult<Arc<TemplateSpec>> {
        let patch = match serde_json::to_value(&**self.editor.document())? {
            Value::Object(fields) => fields,
            _ => Map::new(),
        };

        match self.backend.save(&self.id, &patch).await {
            Ok(draft) => {
                DraftMetrics::record_saved();
                if draft.spec != **self.editor.document() {
                    self.editor.reload(draft.spec);
                }
                self.saved = self.editor.document().clone();
                self.last_error = None;
                tracing::info!(draft_id = %self.id, "Template draft saved");
                Ok(self.saved.clone())
            }
            Err(e) => {
                DraftMetrics::record_failed();
                tracing::warn!(draft_id = %self.id, error = %e, "Template draft save failed");
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{MemoryTemplateBackend, PersistenceError};
    use crate::template::types::ButtonType;

    async fn open_new() -> TemplateSession {
        let backend: Arc<dyn TemplateDraftBackend> = Arc::new(MemoryTemplateBackend::new());
        let draft = backend.create(TemplateSpec::default()).await.unwrap();
        TemplateSession::open(backend, &draft.id).await.unwrap()
    }

    #[tokio::test]
    async fn test_save_clears_dirty_flag() {
        let mut session = open_new().await;
        assert!(!session.is_dirty());

        session.editor_mut().set_body_text("Olá {{1}}");
        session.editor_mut().add_button(ButtonType::QuickReply).unwrap();
        assert!(session.is_dirty());

        let saved = session.save().await.unwrap();
        assert!(!session.is_dirty());
        assert_eq!(saved.body.text, "Olá {{1}}");
        assert!(session.last_error().is_none());
    }

    #[tokio::test]
    async fn test_failed_save_keeps_document() {
        let mut session = open_new().await;
        session.editor_mut().set_body_text("Oi {{nome}}");
        let before = session.document().clone();

        let err = session.save().await.unwrap_err();
        assert!(matches!(err, PersistenceError::ValidationRejected(_)));
        assert!(Arc::ptr_eq(&before, session.document()));
        assert!(session.is_dirty());
        assert!(session.last_error().unwrap().contains("{{nome}}"));
    }

    #[test]
    fn test_open_missing_draft() {
        let backend: Arc<dyn TemplateDraftBackend> = Arc::new(MemoryTemplateBackend::new());
        let result = tokio_test::block_on(TemplateSession::open(backend, "missing"));
        assert!(matches!(result, Err(PersistenceError::NotFound(_))));
    }
}
