use crate::{
    commands::Command,
    dto::QuantityInput,
    entities::{material_return::next_return_number, ReturnModel, ReturnStatus},
    errors::ServiceError,
    events::{EventSender, Table},
    repositories::MaterialSource,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Opens a return for a material. New returns always start `pending`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateReturnCommand {
    #[validate(length(min = 1, max = 255, message = "Product name is required"))]
    pub product_name: String,

    /// Whole number, given as a number or a numeric string
    #[schema(value_type = Object, example = "5")]
    pub quantity: QuantityInput,

    #[validate(length(min = 1, max = 1000, message = "Reason cannot be empty"))]
    pub reason: String,
}

#[async_trait::async_trait]
impl Command for CreateReturnCommand {
    type Result = ReturnModel;

    #[instrument(skip(self, source, event_sender), fields(product_name = %self.product_name))]
    async fn execute(
        &self,
        source: Arc<dyn MaterialSource>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.validate().map_err(|e| {
            let msg = format!("Invalid input: {}", e);
            error!("{}", msg);
            ServiceError::ValidationError(msg)
        })?;

        let row = self.build_return()?;
        let saved = source.insert_return(row).await?;

        info!(
            return_number = %saved.return_number,
            quantity = saved.quantity,
            "Return created for {}. Reason: {}",
            saved.product_name,
            saved.reason
        );
        event_sender.notify(Table::Returns);

        Ok(saved)
    }
}

impl CreateReturnCommand {
    fn build_return(&self) -> Result<ReturnModel, ServiceError> {
        let quantity = self.quantity.parse("quantity", 1)?;
        let created_at = Utc::now();
        let row = ReturnModel {
            id: Uuid::new_v4(),
            return_number: next_return_number(created_at),
            product_name: self.product_name.trim().to_string(),
            quantity,
            reason: self.reason.trim().to_string(),
            status: ReturnStatus::Pending,
            created_at,
        };
        row.validate()?;
        Ok(row)
    }
}
