pub mod analytics;
pub mod inventory;
pub mod preferences;
pub mod returns;
pub mod transactions;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::{
    errors::ServiceError,
    events::EventSender,
    preferences::PreferencesStore,
    reports::ExportedReport,
    repositories::MaterialSource,
    services::{
        analytics::AnalyticsService, inventory::InventoryService, live_analytics::LiveAnalytics,
        returns::ReturnService,
    },
    ApiResponse,
};

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub inventory: Arc<InventoryService>,
    pub returns: Arc<ReturnService>,
    pub analytics: Arc<LiveAnalytics>,
    pub preferences: Arc<PreferencesStore>,
}

impl AppServices {
    pub fn new(
        source: Arc<dyn MaterialSource>,
        event_sender: Arc<EventSender>,
        preferences: Arc<PreferencesStore>,
    ) -> Self {
        let inventory = Arc::new(InventoryService::new(source.clone(), event_sender.clone()));
        let returns = Arc::new(ReturnService::new(source.clone(), event_sender));
        let analytics = Arc::new(LiveAnalytics::new(AnalyticsService::new(source)));

        Self {
            inventory,
            returns,
            analytics,
            preferences,
        }
    }
}

/// Standard created response
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(ApiResponse::success(data))).into_response()
}

/// Sends a rendered report as a file download.
pub fn attachment_response(report: ExportedReport) -> Result<Response, ServiceError> {
    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        report.filename
    ))
    .map_err(|e| ServiceError::ExportError(format!("invalid report filename: {}", e)))?;

    let mut response = Response::new(report.bytes.into());
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(report.content_type),
    );
    headers.insert(header::CONTENT_DISPOSITION, disposition);
    Ok(response)
}
