use crate::{
    commands::{returns::CreateReturnCommand, Command},
    entities::ReturnModel,
    errors::ServiceError,
    events::EventSender,
    repositories::{MaterialSource, SortDirection},
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Service for managing returns
///
/// Returns are only ever created here; approval and rejection belong to an
/// external reviewer.
#[derive(Clone)]
pub struct ReturnService {
    source: Arc<dyn MaterialSource>,
    event_sender: Arc<EventSender>,
}

impl ReturnService {
    /// Creates a new return service instance
    pub fn new(source: Arc<dyn MaterialSource>, event_sender: Arc<EventSender>) -> Self {
        Self {
            source,
            event_sender,
        }
    }

    /// Creates a new return in `pending`
    #[instrument(skip(self, command))]
    pub async fn create_return(
        &self,
        command: CreateReturnCommand,
    ) -> Result<ReturnModel, ServiceError> {
        let created = command
            .execute(self.source.clone(), self.event_sender.clone())
            .await?;
        info!(return_id = %created.id, "return request stored");
        Ok(created)
    }

    /// Gets a return by ID
    #[instrument(skip(self))]
    pub async fn get_return(&self, id: Uuid) -> Result<ReturnModel, ServiceError> {
        self.source
            .find_return(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Return {} not found", id)))
    }

    /// Lists returns by creation time
    pub async fn list_returns(&self, order: SortDirection) -> Result<Vec<ReturnModel>, ServiceError> {
        self.source.fetch_returns(order).await
    }
}
