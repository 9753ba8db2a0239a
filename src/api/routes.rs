use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::server::{api_key_auth, AppState};

use super::flow::{
    create_flow, delete_flow, flow_picker, get_flow, list_flow_templates, list_flows, update_flow,
};
use super::health::health;
use super::metrics::prometheus_metrics;
use super::onboarding::{apply_onboarding_action, get_onboarding, reset_onboarding};
use super::template::{
    add_template_button, create_template, delete_template, get_template, insert_template_variable,
    list_templates, preview_template, update_template, validate_template,
};

pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health & Metrics
        .route("/health", get(health))
        .route("/metrics", get(prometheus_metrics))
        .nest(
            "/api/v1",
            Router::new()
                // Template drafts
                .route("/templates", get(list_templates).post(create_template))
                .route(
                    "/templates/{id}",
                    get(get_template)
                        .patch(update_template)
                        .delete(delete_template),
                )
                .route("/templates/{id}/preview", get(preview_template))
                .route("/templates/{id}/validation", get(validate_template))
                .route("/templates/{id}/buttons", post(add_template_button))
                .route("/templates/{id}/variables", post(insert_template_variable))
                // Flows
                .route("/flows", get(list_flows).post(create_flow))
                .route("/flows/picker", get(flow_picker))
                .route(
                    "/flows/{id}",
                    get(get_flow).patch(update_flow).delete(delete_flow),
                )
                .route("/flow-templates", get(list_flow_templates))
                // Onboarding
                .route(
                    "/onboarding",
                    get(get_onboarding).delete(reset_onboarding),
                )
                .route("/onboarding/actions", post(apply_onboarding_action))
                .route_layer(middleware::from_fn_with_state(state, api_key_auth)),
        )
}
