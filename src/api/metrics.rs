//! Prometheus metrics endpoint.

use axum::{extract::State, http::StatusCode, response::IntoResponse};

use crate::metrics::{self, DraftMetrics, FlowMetrics};
use crate::server::AppState;

/// GET /metrics - Prometheus metrics endpoint
pub async fn prometheus_metrics(State(state): State<AppState>) -> impl IntoResponse {
    update_metrics_from_state(&state).await;

    match metrics::encode_metrics() {
        Ok(output) => (
            StatusCode::OK,
            [(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
            output,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode Prometheus metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(axum::http::header::CONTENT_TYPE, "text/plain")],
                format!("Failed to encode metrics: {}", e),
            )
        }
    }
}

/// Refresh stored-document gauges from the backends
async fn update_metrics_from_state(state: &AppState) {
    match state.templates.list().await {
        Ok(drafts) => DraftMetrics::set_stored(drafts.len()),
        Err(e) => tracing::warn!(error = %e, "Failed to count template drafts"),
    }

    match state.flows.list(None).await {
        Ok(flows) => FlowMetrics::set_stored(flows.len()),
        Err(e) => tracing::warn!(error = %e, "Failed to count flows"),
    }
}
