use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    commands::returns::CreateReturnCommand,
    dto::{
        CreateFoodConditionRequest, CreateProductRequest, CreateRejectedItemRequest,
        CreateTransactionRequest,
    },
    entities::{
        FoodConditionModel, ProductModel, RejectedItemModel, ReturnModel, ReturnStatus,
        TransactionModel, TransactionStatus,
    },
    events::Table,
    preferences::{Preferences, Theme, UpdatePreferencesRequest},
    repositories::SortDirection,
    services::{
        analytics::{MaterialMetrics, TransactionSummary},
        inventory::TransactionBoard,
        live_analytics::MetricsSnapshot,
    },
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bahan Baku MBG API",
        version = "1.0.0",
        description = r#"
# Bahan Baku MBG

Raw material inventory for a meal programme kitchen: stock, rejections,
quality inspections, purchase transactions and returns.

## Analytics

`/analytics/metrics` serves aggregate figures computed from the most recently
loaded records. The service re-fetches on every change notification; a slow
fetch never overwrites the results of a newer one. Tables whose latest fetch
failed are named in `stale_sources`.

## Exports

PDF and CSV exports are served as attachments named
`material-analytics-YYYY-MM-DD.<ext>` and `transaction-report-YYYY-MM-DD.<ext>`.

## Error Handling

Failures use a single envelope:

```json
{
  "error": "Bad Request",
  "message": "Validation error: quantity must be a whole number",
  "request_id": "req-abc123xyz",
  "timestamp": "2024-01-01T00:00:00Z"
}
```
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Inventory", description = "Stock, rejection and inspection endpoints"),
        (name = "Transactions", description = "Purchase transaction endpoints"),
        (name = "Returns", description = "Return request endpoints"),
        (name = "Analytics", description = "Aggregate metrics and exports"),
        (name = "Preferences", description = "Shared UI preferences")
    ),
    paths(
        // Inventory
        crate::handlers::inventory::list_products,
        crate::handlers::inventory::create_product,
        crate::handlers::inventory::list_rejected_items,
        crate::handlers::inventory::create_rejected_item,
        crate::handlers::inventory::list_food_conditions,
        crate::handlers::inventory::create_food_condition,

        // Transactions
        crate::handlers::transactions::transaction_board,
        crate::handlers::transactions::create_transaction,
        crate::handlers::transactions::export_pdf,
        crate::handlers::transactions::export_csv,

        // Returns
        crate::handlers::returns::list_returns,
        crate::handlers::returns::get_return,
        crate::handlers::returns::create_return,

        // Analytics
        crate::handlers::analytics::get_metrics,
        crate::handlers::analytics::refresh_metrics,
        crate::handlers::analytics::export_pdf,
        crate::handlers::analytics::export_csv,

        // Preferences
        crate::handlers::preferences::get_preferences,
        crate::handlers::preferences::update_preferences,
        crate::handlers::preferences::toggle_theme,
    ),
    components(
        schemas(
            // Records
            ProductModel,
            RejectedItemModel,
            FoodConditionModel,
            TransactionModel,
            TransactionStatus,
            ReturnModel,
            ReturnStatus,

            // Requests
            CreateProductRequest,
            CreateRejectedItemRequest,
            CreateFoodConditionRequest,
            CreateTransactionRequest,
            CreateReturnCommand,
            UpdatePreferencesRequest,

            // Analytics types
            MetricsSnapshot,
            MaterialMetrics,
            TransactionSummary,
            TransactionBoard,
            Table,
            SortDirection,

            Preferences,
            Theme,

            // Error types
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
