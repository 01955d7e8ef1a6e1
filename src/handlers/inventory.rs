use axum::{
    extract::{Query, State},
    response::Response,
    Json,
};

use super::{created_response, AppState};
use crate::{
    dto::{CreateFoodConditionRequest, CreateProductRequest, CreateRejectedItemRequest},
    entities::{FoodConditionModel, ProductModel, RejectedItemModel},
    errors::ServiceError,
    repositories::OrderQuery,
    ApiResponse, ApiResult,
};

#[utoipa::path(
    get,
    path = "/api/v1/products",
    summary = "List products",
    description = "Raw materials in stock, ordered by creation time (newest first by default)",
    params(OrderQuery),
    responses(
        (status = 200, description = "Products retrieved", body = ApiResponse<Vec<ProductModel>>,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 400, description = "Stored rows failed validation", body = crate::errors::ErrorResponse),
        (status = 502, description = "Data source unavailable", body = crate::errors::ErrorResponse),
    ),
    tag = "Inventory"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<OrderQuery>,
) -> ApiResult<Vec<ProductModel>> {
    let products = state.services.inventory.list_products(query.order).await?;
    Ok(Json(ApiResponse::success(products)))
}

#[utoipa::path(
    post,
    path = "/api/v1/products",
    summary = "Record product",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product recorded", body = ApiResponse<ProductModel>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 422, description = "Write rejected", body = crate::errors::ErrorResponse),
    ),
    tag = "Inventory"
)]
pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<Response, ServiceError> {
    let product = state.services.inventory.create_product(payload).await?;
    Ok(created_response(product))
}

#[utoipa::path(
    get,
    path = "/api/v1/rejected-items",
    summary = "List rejected items",
    params(OrderQuery),
    responses(
        (status = 200, description = "Rejections retrieved", body = ApiResponse<Vec<RejectedItemModel>>),
        (status = 502, description = "Data source unavailable", body = crate::errors::ErrorResponse),
    ),
    tag = "Inventory"
)]
pub async fn list_rejected_items(
    State(state): State<AppState>,
    Query(query): Query<OrderQuery>,
) -> ApiResult<Vec<RejectedItemModel>> {
    let items = state
        .services
        .inventory
        .list_rejected_items(query.order)
        .await?;
    Ok(Json(ApiResponse::success(items)))
}

#[utoipa::path(
    post,
    path = "/api/v1/rejected-items",
    summary = "Record rejection",
    request_body = CreateRejectedItemRequest,
    responses(
        (status = 201, description = "Rejection recorded", body = ApiResponse<RejectedItemModel>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
    ),
    tag = "Inventory"
)]
pub async fn create_rejected_item(
    State(state): State<AppState>,
    Json(payload): Json<CreateRejectedItemRequest>,
) -> Result<Response, ServiceError> {
    let item = state.services.inventory.create_rejected_item(payload).await?;
    Ok(created_response(item))
}

#[utoipa::path(
    get,
    path = "/api/v1/food-conditions",
    summary = "List quality inspections",
    description = "Inspections ordered by inspection date",
    params(OrderQuery),
    responses(
        (status = 200, description = "Inspections retrieved", body = ApiResponse<Vec<FoodConditionModel>>),
        (status = 502, description = "Data source unavailable", body = crate::errors::ErrorResponse),
    ),
    tag = "Inventory"
)]
pub async fn list_food_conditions(
    State(state): State<AppState>,
    Query(query): Query<OrderQuery>,
) -> ApiResult<Vec<FoodConditionModel>> {
    let inspections = state
        .services
        .inventory
        .list_food_conditions(query.order)
        .await?;
    Ok(Json(ApiResponse::success(inspections)))
}

#[utoipa::path(
    post,
    path = "/api/v1/food-conditions",
    summary = "Record quality inspection",
    request_body = CreateFoodConditionRequest,
    responses(
        (status = 201, description = "Inspection recorded", body = ApiResponse<FoodConditionModel>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
    ),
    tag = "Inventory"
)]
pub async fn create_food_condition(
    State(state): State<AppState>,
    Json(payload): Json<CreateFoodConditionRequest>,
) -> Result<Response, ServiceError> {
    let inspection = state
        .services
        .inventory
        .create_food_condition(payload)
        .await?;
    Ok(created_response(inspection))
}
