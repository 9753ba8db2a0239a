//! Template draft endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::persistence::TemplateDraft;
use crate::server::AppState;
use crate::template::{
    normalize, project, validate, ButtonType, PreviewModel, TemplateSession, TemplateSpec,
    TextTarget, ValidationIssue,
};

#[derive(Debug, Serialize)]
pub struct TemplateListResponse {
    pub templates: Vec<TemplateDraft>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResponse {
    pub is_submittable: bool,
    pub has_errors: bool,
    pub issues: Vec<ValidationIssue>,
}

#[derive(Debug, Deserialize)]
pub struct AddButtonRequest {
    #[serde(rename = "type")]
    pub kind: ButtonType,
}

#[derive(Debug, Deserialize)]
pub struct InsertVariableRequest {
    pub target: TextTarget,
    #[serde(default)]
    pub cursor: Option<usize>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InsertVariableResponse {
    pub cursor: usize,
    pub document: TemplateSpec,
}

/// GET /api/v1/templates - List all drafts
#[tracing::instrument(name = "http.list_templates", skip(state))]
pub async fn list_templates(State(state): State<AppState>) -> Result<Json<TemplateListResponse>> {
    let templates = state.templates.list().await?;
    let total = templates.len();
    Ok(Json(TemplateListResponse { templates, total }))
}

/// POST /api/v1/templates - Create a draft from any template-shaped JSON
#[tracing::instrument(name = "http.create_template", skip(state, body))]
pub async fn create_template(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<TemplateDraft>)> {
    let draft = state.templates.create(normalize(&body)).await?;
    tracing::info!(draft_id = %draft.id, name = %draft.spec.name, "Template draft created");
    Ok((StatusCode::CREATED, Json(draft)))
}

/// GET /api/v1/templates/{id}
#[tracing::instrument(name = "http.get_template", skip(state))]
pub async fn get_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TemplateDraft>> {
    Ok(Json(state.templates.load(&id).await?))
}

/// PATCH /api/v1/templates/{id} - Merge a partial document and save
#[tracing::instrument(name = "http.update_template", skip(state, patch))]
pub async fn update_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<Map<String, Value>>,
) -> Result<Json<TemplateDraft>> {
    let mut session = TemplateSession::open(state.templates.clone(), &id).await?;
    session.editor_mut().apply_patch(&patch);
    session.save().await?;

    Ok(Json(state.templates.load(&id).await?))
}

/// DELETE /api/v1/templates/{id}
#[tracing::instrument(name = "http.delete_template", skip(state))]
pub async fn delete_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.templates.delete(&id).await?;
    tracing::info!(draft_id = %id, "Template draft deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/templates/{id}/preview
#[tracing::instrument(name = "http.preview_template", skip(state))]
pub async fn preview_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PreviewModel>> {
    let draft = state.templates.load(&id).await?;
    Ok(Json(project(&draft.spec)))
}

/// GET /api/v1/templates/{id}/validation
#[tracing::instrument(name = "http.validate_template", skip(state))]
pub async fn validate_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ValidationResponse>> {
    let draft = state.templates.load(&id).await?;
    let report = validate(&draft.spec);

    Ok(Json(ValidationResponse {
        is_submittable: report.is_submittable(),
        has_errors: report.has_errors(),
        issues: report.issues,
    }))
}

/// POST /api/v1/templates/{id}/buttons - Add a button through the admission gate
#[tracing::instrument(name = "http.add_template_button", skip(state))]
pub async fn add_template_button(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<AddButtonRequest>,
) -> Result<Json<TemplateSpec>> {
    let mut session = TemplateSession::open(state.templates.clone(), &id).await?;
    session.editor_mut().add_button(request.kind)?;
    let saved = session.save().await?;

    Ok(Json((*saved).clone()))
}

/// POST /api/v1/templates/{id}/variables - Insert the next placeholder
#[tracing::instrument(name = "http.insert_template_variable", skip(state))]
pub async fn insert_template_variable(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<InsertVariableRequest>,
) -> Result<Json<InsertVariableResponse>> {
    let mut session = TemplateSession::open(state.templates.clone(), &id).await?;
    let cursor = session.editor_mut().insert_variable(
        request.target,
        request.cursor,
        request.name.as_deref(),
    )?;
    let saved = session.save().await?;

    Ok(Json(InsertVariableResponse {
        cursor,
        document: (*saved).clone(),
    }))
}
