use axum::{extract::State, response::Response, Json};
use chrono::Utc;
use metrics::counter;
use tracing::{info, instrument, warn};

use super::{attachment_response, AppState};
use crate::{
    errors::ServiceError,
    reports::{export_material_analytics, ReportFormat},
    services::{analytics::AnalyticsReport, live_analytics::MetricsSnapshot},
    ApiResponse, ApiResult,
};

#[utoipa::path(
    get,
    path = "/api/v1/analytics/metrics",
    summary = "Material metrics",
    description = "Aggregate metrics over the most recently loaded records. Tables whose last fetch failed are listed in `stale_sources`.",
    responses(
        (status = 200, description = "Current metrics", body = ApiResponse<MetricsSnapshot>,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    tag = "Analytics"
)]
pub async fn get_metrics(State(state): State<AppState>) -> ApiResult<MetricsSnapshot> {
    let snapshot = state.services.analytics.snapshot()?;
    Ok(Json(ApiResponse::success(snapshot)))
}

#[utoipa::path(
    post,
    path = "/api/v1/analytics/refresh",
    summary = "Refresh metrics",
    description = "Re-fetches every analytics table and returns the resulting metrics.",
    responses(
        (status = 200, description = "Metrics after the refresh", body = ApiResponse<MetricsSnapshot>),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    tag = "Analytics"
)]
#[instrument(skip(state))]
pub async fn refresh_metrics(State(state): State<AppState>) -> ApiResult<MetricsSnapshot> {
    let outcome = state.services.analytics.refresh().await?;
    if !outcome.failed.is_empty() {
        warn!(failed = ?outcome.failed, "refresh left stale tables");
    }
    let snapshot = state.services.analytics.snapshot()?;
    Ok(Json(ApiResponse::success(snapshot)))
}

#[utoipa::path(
    get,
    path = "/api/v1/analytics/export/pdf",
    summary = "Export material analytics as PDF",
    responses(
        (status = 200, description = "PDF document", body = Vec<u8>, content_type = "application/pdf",
            headers(("Content-Disposition" = String, description = "attachment; filename=\"material-analytics-YYYY-MM-DD.pdf\""))
        ),
        (status = 500, description = "Rendering failed", body = crate::errors::ErrorResponse),
    ),
    tag = "Analytics"
)]
pub async fn export_pdf(State(state): State<AppState>) -> Result<Response, ServiceError> {
    export(state, ReportFormat::Pdf).await
}

#[utoipa::path(
    get,
    path = "/api/v1/analytics/export/csv",
    summary = "Export material analytics as CSV",
    responses(
        (status = 200, description = "CSV document", body = String, content_type = "text/csv",
            headers(("Content-Disposition" = String, description = "attachment; filename=\"material-analytics-YYYY-MM-DD.csv\""))
        ),
        (status = 500, description = "Rendering failed", body = crate::errors::ErrorResponse),
    ),
    tag = "Analytics"
)]
pub async fn export_csv(State(state): State<AppState>) -> Result<Response, ServiceError> {
    export(state, ReportFormat::Csv).await
}

#[instrument(skip(state))]
async fn export(state: AppState, format: ReportFormat) -> Result<Response, ServiceError> {
    let analytics = &state.services.analytics;
    let outcome = analytics.refresh().await?;
    if !outcome.failed.is_empty() {
        warn!(failed = ?outcome.failed, "exporting with stale tables");
    }

    let report = AnalyticsReport::new(analytics.records()?, Utc::now());
    let exported = export_material_analytics(&report, format, &state.config.report)?;

    counter!("bahan_baku.reports.exported", 1, "format" => format.extension());
    info!(filename = %exported.filename, bytes = exported.bytes.len(), "analytics exported");
    attachment_response(exported)
}
