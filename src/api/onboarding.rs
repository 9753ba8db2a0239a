//! Onboarding progress endpoints.

use axum::{extract::State, Json};

use crate::error::Result;
use crate::onboarding::{OnboardingAction, OnboardingView};
use crate::server::AppState;

/// GET /api/v1/onboarding
pub async fn get_onboarding(State(state): State<AppState>) -> Json<OnboardingView> {
    Json(state.onboarding.view().await)
}

/// POST /api/v1/onboarding/actions - Apply one wizard action
#[tracing::instrument(name = "http.onboarding_action", skip(state))]
pub async fn apply_onboarding_action(
    State(state): State<AppState>,
    Json(action): Json<OnboardingAction>,
) -> Result<Json<OnboardingView>> {
    Ok(Json(state.onboarding.apply(&action).await?))
}

/// DELETE /api/v1/onboarding - Forget all progress
#[tracing::instrument(name = "http.reset_onboarding", skip(state))]
pub async fn reset_onboarding(State(state): State<AppState>) -> Result<Json<OnboardingView>> {
    Ok(Json(state.onboarding.reset().await?))
}
