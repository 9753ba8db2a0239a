//! API layer - HTTP endpoint handlers organized by domain.

mod flow;
mod health;
mod metrics;
mod onboarding;
mod routes;
mod template;

pub use flow::{
    create_flow, delete_flow, flow_picker, get_flow, list_flow_templates, list_flows, update_flow,
    CreateFlowRequest, FlowListQuery,
};
pub use health::{health, HealthResponse};
pub use metrics::prometheus_metrics;
pub use onboarding::{apply_onboarding_action, get_onboarding, reset_onboarding};
pub use routes::api_routes;
pub use template::{
    add_template_button, create_template, delete_template, get_template, insert_template_variable,
    list_templates, preview_template, update_template, validate_template, AddButtonRequest,
    InsertVariableRequest, InsertVariableResponse, TemplateListResponse, ValidationResponse,
};
