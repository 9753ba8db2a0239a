//! Persistence adapters for template drafts and flows.
//!
//! Backends own no business rules beyond refusing structurally invalid
//! drafts. Two implementations are provided:
//! - `memory`: DashMap storage, lost on restart
//! - `file`: one JSON document per record under a data directory

mod backend;
mod factory;
mod file_backend;
mod memory_backend;

pub use backend::{
    FlowBackend, PersistenceError, PersistenceResult, TemplateDraft, TemplateDraftBackend,
};
pub use factory::{create_backends, Backends};
pub use file_backend::{FileFlowBackend, FileTemplateBackend};
pub use memory_backend::{MemoryFlowBackend, MemoryTemplateBackend};
