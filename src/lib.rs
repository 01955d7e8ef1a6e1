//! Bahan Baku MBG API Library
//!
//! Raw material inventory with live analytics and PDF/CSV exports.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod commands;
pub mod config;
pub mod db;
pub mod dto;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod preferences;
pub mod reports;
pub mod repositories;
pub mod services;
pub mod tracing;

use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use http::HeaderValue;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
};
use utoipa::ToSchema;

use crate::{
    errors::ServiceError,
    events::EventSender,
    handlers::AppServices,
    preferences::PreferencesStore,
    repositories::{MaterialSource, SeaOrmMaterialSource},
};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: Arc<EventSender>,
    pub services: AppServices,
}

impl AppState {
    /// Wires every service over the database and opens the preferences file.
    pub fn new(config: config::AppConfig, db: Arc<DatabaseConnection>) -> Result<Self, ServiceError> {
        let source: Arc<dyn MaterialSource> =
            Arc::new(SeaOrmMaterialSource::new(db.clone(), config.fetch_timeout()));
        let event_sender = Arc::new(EventSender::new(config.event_channel_capacity));
        let preferences = Arc::new(PreferencesStore::open(&config.preferences_path)?);
        let services = AppServices::new(source, event_sender.clone(), preferences);

        Ok(Self {
            db,
            config,
            event_sender,
            services,
        })
    }

    pub fn return_service(&self) -> Arc<services::returns::ReturnService> {
        self.services.returns.clone()
    }

    pub fn analytics(&self) -> Arc<services::live_analytics::LiveAnalytics> {
        self.services.analytics.clone()
    }
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            meta: Some(ResponseMeta::capture()),
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

pub fn api_v1_routes() -> Router<AppState> {
    let inventory = Router::new()
        .route(
            "/products",
            get(handlers::inventory::list_products).post(handlers::inventory::create_product),
        )
        .route(
            "/rejected-items",
            get(handlers::inventory::list_rejected_items)
                .post(handlers::inventory::create_rejected_item),
        )
        .route(
            "/food-conditions",
            get(handlers::inventory::list_food_conditions)
                .post(handlers::inventory::create_food_condition),
        );

    let transactions = Router::new()
        .route(
            "/",
            get(handlers::transactions::transaction_board)
                .post(handlers::transactions::create_transaction),
        )
        .route("/export/pdf", get(handlers::transactions::export_pdf))
        .route("/export/csv", get(handlers::transactions::export_csv));

    let returns = Router::new()
        .route(
            "/",
            get(handlers::returns::list_returns).post(handlers::returns::create_return),
        )
        .route("/:id", get(handlers::returns::get_return));

    let analytics = Router::new()
        .route("/metrics", get(handlers::analytics::get_metrics))
        .route("/refresh", post(handlers::analytics::refresh_metrics))
        .route("/export/pdf", get(handlers::analytics::export_pdf))
        .route("/export/csv", get(handlers::analytics::export_csv));

    let preferences = Router::new()
        .route(
            "/",
            get(handlers::preferences::get_preferences)
                .put(handlers::preferences::update_preferences),
        )
        .route("/theme/toggle", post(handlers::preferences::toggle_theme));

    Router::new()
        .route("/status", get(api_status))
        .route("/health", get(health_check))
        .merge(inventory)
        .nest("/transactions", transactions)
        .nest("/returns", returns)
        .nest("/analytics", analytics)
        .nest("/preferences", preferences)
}

/// Builds the CORS layer from configuration.
pub fn cors_layer(cfg: &config::AppConfig) -> Result<CorsLayer, ServiceError> {
    let configured_origins: Option<Vec<HeaderValue>> = cfg
        .cors_allowed_origins
        .as_ref()
        .map(|raw| {
            raw.split(',')
                .filter_map(|origin| {
                    let trimmed = origin.trim();
                    if trimmed.is_empty() {
                        None
                    } else {
                        HeaderValue::from_str(trimmed).ok()
                    }
                })
                .collect::<Vec<_>>()
        })
        .filter(|origins| !origins.is_empty());

    if let Some(origins) = configured_origins {
        Ok(CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any))
    } else if cfg.should_allow_permissive_cors() {
        ::tracing::info!(
            "Using permissive CORS because explicit origins were not configured ({})",
            if cfg.is_development() {
                "development environment"
            } else {
                "explicit override enabled"
            }
        );
        Ok(CorsLayer::permissive())
    } else {
        Err(ServiceError::InternalError(
            "Missing CORS configuration: set APP__CORS_ALLOWED_ORIGINS or APP__CORS_ALLOW_ANY_ORIGIN=true"
                .to_string(),
        ))
    }
}

/// The complete HTTP application: v1 API, Swagger UI and middleware.
pub fn build_app(state: AppState) -> Result<Router, ServiceError> {
    let cors = cors_layer(&state.config)?;

    let app = Router::<AppState>::new()
        .route("/", get(|| async { "bahan-baku-api up" }))
        .nest("/api/v1", api_v1_routes())
        .merge(openapi::swagger_ui())
        // HTTP tracing layer for consistent request/response telemetry
        .layer(crate::tracing::configure_http_tracing())
        .layer(CompressionLayer::new())
        .layer(cors)
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
        .with_state(state);

    Ok(app)
}

async fn api_status(State(state): State<AppState>) -> ApiResult<Value> {
    let status_data = json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "bahan-baku-api",
        "timestamp": Utc::now().to_rfc3339(),
        "environment": state.config.environment,
        "change_subscribers": state.event_sender.subscriber_count(),
    });

    Ok(Json(ApiResponse::success(status_data)))
}

async fn health_check(State(state): State<AppState>) -> ApiResult<Value> {
    let db_status = match db::check_connection(&state.db).await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };
    let stale = state
        .services
        .analytics
        .snapshot()
        .map(|s| s.stale_sources)
        .unwrap_or_default();

    let health_data = json!({
        "status": if db_status == "healthy" && stale.is_empty() { "healthy" } else { "degraded" },
        "checks": {
            "database": db_status,
            "stale_sources": stale,
        },
        "timestamp": Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(health_data)))
}
