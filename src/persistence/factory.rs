//! Persistence backend factory

use std::sync::Arc;

use crate::config::StorageConfig;

use super::backend::{FlowBackend, TemplateDraftBackend};
use super::file_backend::{FileFlowBackend, FileTemplateBackend};
use super::memory_backend::{MemoryFlowBackend, MemoryTemplateBackend};

/// Backends selected from configuration
#[derive(Clone)]
pub struct Backends {
    pub templates: Arc<dyn TemplateDraftBackend>,
    pub flows: Arc<dyn FlowBackend>,
}

/// Create persistence backends based on configuration.
///
/// - `"file"`: JSON files under `storage.data_dir`
/// - `"memory"` (default): in-process maps, lost on restart
pub fn create_backends(settings: &StorageConfig) -> Backends {
    match settings.backend.as_str() {
        "file" => {
            tracing::info!(
                backend = "file",
                data_dir = %settings.data_dir,
                "Creating file persistence backends"
            );
            Backends {
                templates: Arc::new(FileTemplateBackend::new(&settings.data_dir)),
                flows: Arc::new(FileFlowBackend::new(&settings.data_dir)),
            }
        }
        "memory" => {
            tracing::info!(backend = "memory", "Creating memory persistence backends");
            memory_backends()
        }
        other => {
            tracing::warn!(
                backend = %other,
                "Unknown storage backend requested, falling back to memory"
            );
            memory_backends()
        }
    }
}

fn memory_backends() -> Backends {
    Backends {
        templates: Arc::new(MemoryTemplateBackend::new()),
        flows: Arc::new(MemoryFlowBackend::new()),
    }
}
