use axum::{extract::State, Json};

use super::AppState;
use crate::{
    preferences::{Preferences, UpdatePreferencesRequest},
    ApiResponse, ApiResult,
};

#[utoipa::path(
    get,
    path = "/api/v1/preferences",
    summary = "Get preferences",
    responses(
        (status = 200, description = "Current preferences", body = ApiResponse<Preferences>),
    ),
    tag = "Preferences"
)]
pub async fn get_preferences(State(state): State<AppState>) -> ApiResult<Preferences> {
    let prefs = state.services.preferences.get()?;
    Ok(Json(ApiResponse::success(prefs)))
}

#[utoipa::path(
    put,
    path = "/api/v1/preferences",
    summary = "Update preferences",
    request_body = UpdatePreferencesRequest,
    responses(
        (status = 200, description = "Preferences saved", body = ApiResponse<Preferences>),
        (status = 400, description = "Invalid preferences", body = crate::errors::ErrorResponse),
        (status = 500, description = "Preferences could not be written", body = crate::errors::ErrorResponse),
    ),
    tag = "Preferences"
)]
pub async fn update_preferences(
    State(state): State<AppState>,
    Json(payload): Json<UpdatePreferencesRequest>,
) -> ApiResult<Preferences> {
    let prefs = state.services.preferences.update(payload)?;
    Ok(Json(ApiResponse::success(prefs)))
}

#[utoipa::path(
    post,
    path = "/api/v1/preferences/theme/toggle",
    summary = "Toggle theme",
    responses(
        (status = 200, description = "Theme switched", body = ApiResponse<Preferences>),
        (status = 500, description = "Preferences could not be written", body = crate::errors::ErrorResponse),
    ),
    tag = "Preferences"
)]
pub async fn toggle_theme(State(state): State<AppState>) -> ApiResult<Preferences> {
    let prefs = state.services.preferences.toggle_theme()?;
    Ok(Json(ApiResponse::success(prefs)))
}
