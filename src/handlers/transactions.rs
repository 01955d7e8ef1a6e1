use axum::{extract::State, response::Response, Json};
use chrono::Utc;
use metrics::counter;
use tracing::info;

use super::{attachment_response, created_response, AppState};
use crate::{
    dto::CreateTransactionRequest,
    entities::TransactionModel,
    errors::ServiceError,
    reports::{export_transactions, ReportFormat},
    services::inventory::TransactionBoard,
    ApiResponse, ApiResult,
};

#[utoipa::path(
    get,
    path = "/api/v1/transactions",
    summary = "Transaction board",
    description = "Transactions newest first, split into approved, rejected and pending columns",
    responses(
        (status = 200, description = "Board retrieved", body = ApiResponse<TransactionBoard>),
        (status = 502, description = "Data source unavailable", body = crate::errors::ErrorResponse),
    ),
    tag = "Transactions"
)]
pub async fn transaction_board(State(state): State<AppState>) -> ApiResult<TransactionBoard> {
    let board = state.services.inventory.transaction_board().await?;
    Ok(Json(ApiResponse::success(board)))
}

#[utoipa::path(
    post,
    path = "/api/v1/transactions",
    summary = "Record transaction",
    request_body = CreateTransactionRequest,
    responses(
        (status = 201, description = "Transaction recorded", body = ApiResponse<TransactionModel>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
    ),
    tag = "Transactions"
)]
pub async fn create_transaction(
    State(state): State<AppState>,
    Json(payload): Json<CreateTransactionRequest>,
) -> Result<Response, ServiceError> {
    let transaction = state.services.inventory.create_transaction(payload).await?;
    Ok(created_response(transaction))
}

#[utoipa::path(
    get,
    path = "/api/v1/transactions/export/pdf",
    summary = "Export transactions as PDF",
    responses(
        (status = 200, description = "PDF document", body = Vec<u8>, content_type = "application/pdf"),
        (status = 500, description = "Rendering failed", body = crate::errors::ErrorResponse),
    ),
    tag = "Transactions"
)]
pub async fn export_pdf(State(state): State<AppState>) -> Result<Response, ServiceError> {
    export(state, ReportFormat::Pdf).await
}

#[utoipa::path(
    get,
    path = "/api/v1/transactions/export/csv",
    summary = "Export transactions as CSV",
    responses(
        (status = 200, description = "CSV document", body = String, content_type = "text/csv"),
        (status = 500, description = "Rendering failed", body = crate::errors::ErrorResponse),
    ),
    tag = "Transactions"
)]
pub async fn export_csv(State(state): State<AppState>) -> Result<Response, ServiceError> {
    export(state, ReportFormat::Csv).await
}

async fn export(state: AppState, format: ReportFormat) -> Result<Response, ServiceError> {
    let board = state.services.inventory.transaction_board().await?;
    let exported = export_transactions(&board, Utc::now(), format, &state.config.report)?;

    counter!("bahan_baku.reports.exported", 1, "format" => format.extension());
    info!(filename = %exported.filename, "transactions exported");
    attachment_response(exported)
}
