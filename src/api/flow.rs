//! Flow endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::flow::{self, FlowPatch, FlowRecord, FlowSummary, FlowTemplate, PickerEntry};
use crate::server::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct FlowListQuery {
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFlowRequest {
    #[serde(default)]
    pub name: Option<String>,
    /// Catalog key to seed the flow from
    #[serde(default)]
    pub template_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FlowListResponse {
    pub flows: Vec<FlowSummary>,
    pub total: usize,
}

/// GET /api/v1/flows - List flows, optionally filtered by `?q=`
#[tracing::instrument(name = "http.list_flows", skip(state))]
pub async fn list_flows(
    State(state): State<AppState>,
    Query(query): Query<FlowListQuery>,
) -> Result<Json<FlowListResponse>> {
    let flows = state.flows.list(query.q.as_deref()).await?;
    let total = flows.len();
    Ok(Json(FlowListResponse { flows, total }))
}

/// POST /api/v1/flows - Create a blank flow or one seeded from the catalog
#[tracing::instrument(name = "http.create_flow", skip(state, request))]
pub async fn create_flow(
    State(state): State<AppState>,
    Json(request): Json<CreateFlowRequest>,
) -> Result<(StatusCode, Json<FlowRecord>)> {
    let record = match request.template_key.as_deref() {
        Some(key) => {
            state
                .flows
                .create_from_template(request.name.as_deref(), key)
                .await?
        }
        None => {
            let name = request
                .name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .ok_or_else(|| AppError::Validation("name is required".to_string()))?;
            state.flows.create(name).await?
        }
    };

    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/v1/flows/{id}
#[tracing::instrument(name = "http.get_flow", skip(state))]
pub async fn get_flow(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<FlowRecord>> {
    Ok(Json(state.flows.get(&id).await?))
}

/// PATCH /api/v1/flows/{id}
#[tracing::instrument(name = "http.update_flow", skip(state, patch))]
pub async fn update_flow(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<FlowPatch>,
) -> Result<Json<FlowRecord>> {
    Ok(Json(state.flows.save(&id, patch).await?))
}

/// DELETE /api/v1/flows/{id}
#[tracing::instrument(name = "http.delete_flow", skip(state))]
pub async fn delete_flow(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.flows.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/flows/picker - Flows selectable by a FLOW button
#[tracing::instrument(name = "http.flow_picker", skip(state))]
pub async fn flow_picker(State(state): State<AppState>) -> Result<Json<Vec<PickerEntry>>> {
    Ok(Json(state.flows.picker().await?))
}

/// GET /api/v1/flow-templates
pub async fn list_flow_templates() -> Json<&'static [FlowTemplate]> {
    Json(flow::list_flow_templates())
}
