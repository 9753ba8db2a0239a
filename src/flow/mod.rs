//! WhatsApp Flow documents.
//!
//! This module provides:
//! - The flow document model with a read-only view of its screens
//! - A static catalog of starter flows with default response mappings
//! - List search and the flow picker used by FLOW template buttons
//! - `FlowService`, the flow operations exposed over HTTP

mod catalog;
mod picker;
mod service;
mod types;

pub use catalog::{create_from_template, flow_template, list_flow_templates, FlowTemplate};
pub use picker::{filter_flows, published_flows, PickerEntry, UNKNOWN_STATUS};
pub use service::FlowService;
pub use types::{
    check_spec_json, ContactMapping, FlowMapping, FlowPatch, FlowRecord, FlowScreen, FlowSpec,
    FlowStatus, FlowSummary, FLOW_JSON_VERSION,
};
