use crate::{errors::ServiceError, events::EventSender, repositories::MaterialSource};
use async_trait::async_trait;
use std::sync::Arc;

/// Command trait for implementing the Command Pattern
///
/// A command carries everything needed for one write: it validates itself,
/// persists through the material source and announces the change.
#[async_trait]
pub trait Command: Send + Sync {
    /// The return type of the command when executed successfully
    type Result;

    /// Execute the command with the given dependencies
    ///
    /// # Arguments
    /// * `source` - Material data source used for persistence
    /// * `event_sender` - Change-notification stream to publish on
    async fn execute(
        &self,
        source: Arc<dyn MaterialSource>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError>;
}

pub mod returns;
