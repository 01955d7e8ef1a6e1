use axum::{
    extract::{Path, Query, State},
    response::Response,
    Json,
};
use uuid::Uuid;

use super::{created_response, AppState};
use crate::{
    commands::returns::CreateReturnCommand, entities::ReturnModel, errors::ServiceError,
    repositories::OrderQuery, ApiResponse, ApiResult,
};

#[utoipa::path(
    get,
    path = "/api/v1/returns",
    summary = "List returns",
    params(OrderQuery),
    responses(
        (status = 200, description = "Returns retrieved", body = ApiResponse<Vec<ReturnModel>>),
        (status = 502, description = "Data source unavailable", body = crate::errors::ErrorResponse),
    ),
    tag = "Returns"
)]
pub async fn list_returns(
    State(state): State<AppState>,
    Query(query): Query<OrderQuery>,
) -> ApiResult<Vec<ReturnModel>> {
    let returns = state.return_service().list_returns(query.order).await?;
    Ok(Json(ApiResponse::success(returns)))
}

#[utoipa::path(
    get,
    path = "/api/v1/returns/{id}",
    summary = "Get return",
    params(("id" = Uuid, Path, description = "Return id")),
    responses(
        (status = 200, description = "Return retrieved", body = ApiResponse<ReturnModel>),
        (status = 404, description = "Return not found", body = crate::errors::ErrorResponse),
    ),
    tag = "Returns"
)]
pub async fn get_return(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<ReturnModel> {
    let found = state.return_service().get_return(id).await?;
    Ok(Json(ApiResponse::success(found)))
}

#[utoipa::path(
    post,
    path = "/api/v1/returns",
    summary = "Create return",
    description = "Opens a return in `pending` with a generated `RET-<millis>` number",
    request_body = CreateReturnCommand,
    responses(
        (status = 201, description = "Return created", body = ApiResponse<ReturnModel>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 422, description = "Write rejected", body = crate::errors::ErrorResponse),
    ),
    tag = "Returns"
)]
pub async fn create_return(
    State(state): State<AppState>,
    Json(command): Json<CreateReturnCommand>,
) -> Result<Response, ServiceError> {
    let created = state.return_service().create_return(command).await?;
    Ok(created_response(created))
}
