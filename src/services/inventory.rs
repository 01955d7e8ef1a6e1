use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        CreateFoodConditionRequest, CreateProductRequest, CreateRejectedItemRequest,
        CreateTransactionRequest,
    },
    entities::{
        FoodConditionModel, ProductModel, RejectedItemModel, TransactionModel, TransactionStatus,
    },
    errors::ServiceError,
    events::{EventSender, Table},
    repositories::{MaterialSource, SortDirection},
};

/// Transactions split into the three status columns of the board.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TransactionBoard {
    pub approved: Vec<TransactionModel>,
    pub rejected: Vec<TransactionModel>,
    pub pending: Vec<TransactionModel>,
}

impl TransactionBoard {
    /// Partitions by status, keeping the incoming order within each column.
    pub fn from_transactions(transactions: Vec<TransactionModel>) -> Self {
        let mut board = TransactionBoard::default();
        for tx in transactions {
            match tx.status {
                TransactionStatus::Approved => board.approved.push(tx),
                TransactionStatus::Rejected => board.rejected.push(tx),
                TransactionStatus::Pending => board.pending.push(tx),
            }
        }
        board
    }

    pub fn approved_amount(&self) -> Decimal {
        self.approved
            .iter()
            .map(|t| t.amount)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }
}

/// Reads and records stock, rejections, inspections and transactions.
///
/// Every successful write publishes a change notification for its table.
#[derive(Clone)]
pub struct InventoryService {
    source: Arc<dyn MaterialSource>,
    events: Arc<EventSender>,
}

impl InventoryService {
    pub fn new(source: Arc<dyn MaterialSource>, events: Arc<EventSender>) -> Self {
        Self { source, events }
    }

    pub async fn list_products(
        &self,
        order: SortDirection,
    ) -> Result<Vec<ProductModel>, ServiceError> {
        self.source.fetch_products(order).await
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_product(
        &self,
        request: CreateProductRequest,
    ) -> Result<ProductModel, ServiceError> {
        request.validate()?;
        let row = ProductModel {
            id: Uuid::new_v4(),
            quantity: request.quantity.parse("quantity", 0)?,
            name: request.name,
            category: request.category,
            color: request.color.filter(|c| !c.trim().is_empty()),
            price: request.price,
            created_at: Utc::now(),
        };
        row.validate()?;

        let saved = self.source.insert_product(row).await?;
        self.events.notify(Table::Products);
        info!(product_id = %saved.id, "product recorded");
        Ok(saved)
    }

    pub async fn list_rejected_items(
        &self,
        order: SortDirection,
    ) -> Result<Vec<RejectedItemModel>, ServiceError> {
        self.source.fetch_rejected_items(order).await
    }

    #[instrument(skip(self, request), fields(product_name = %request.product_name))]
    pub async fn create_rejected_item(
        &self,
        request: CreateRejectedItemRequest,
    ) -> Result<RejectedItemModel, ServiceError> {
        request.validate()?;
        let row = RejectedItemModel {
            id: Uuid::new_v4(),
            quantity: request.quantity.parse("quantity", 0)?,
            product_name: request.product_name,
            reason: request.reason,
            created_at: Utc::now(),
        };
        row.validate()?;

        let saved = self.source.insert_rejected_item(row).await?;
        self.events.notify(Table::RejectedItems);
        info!(rejected_item_id = %saved.id, "rejection recorded");
        Ok(saved)
    }

    pub async fn list_food_conditions(
        &self,
        order: SortDirection,
    ) -> Result<Vec<FoodConditionModel>, ServiceError> {
        self.source.fetch_food_conditions(order).await
    }

    #[instrument(skip(self, request), fields(product_name = %request.product_name))]
    pub async fn create_food_condition(
        &self,
        request: CreateFoodConditionRequest,
    ) -> Result<FoodConditionModel, ServiceError> {
        request.validate()?;
        let row = FoodConditionModel {
            id: Uuid::new_v4(),
            product_name: request.product_name,
            condition: request.condition,
            fit_for_processing: request.fit_for_processing,
            inspection_date: request.inspection_date.unwrap_or_else(Utc::now),
        };
        row.validate()?;

        let saved = self.source.insert_food_condition(row).await?;
        self.events.notify(Table::FoodConditions);
        info!(
            inspection_id = %saved.id,
            fit = saved.fit_for_processing,
            "inspection recorded"
        );
        Ok(saved)
    }

    /// Transactions newest first, partitioned by status.
    pub async fn transaction_board(&self) -> Result<TransactionBoard, ServiceError> {
        let transactions = self.source.fetch_transactions(SortDirection::Desc).await?;
        Ok(TransactionBoard::from_transactions(transactions))
    }

    #[instrument(skip(self, request), fields(product_name = %request.product_name))]
    pub async fn create_transaction(
        &self,
        request: CreateTransactionRequest,
    ) -> Result<TransactionModel, ServiceError> {
        request.validate()?;
        let row = TransactionModel {
            id: Uuid::new_v4(),
            quantity: request.quantity.parse("quantity", 0)?,
            product_name: request.product_name,
            amount: request.amount,
            status: request.status.unwrap_or(TransactionStatus::Pending),
            notes: request.notes.filter(|n| !n.trim().is_empty()),
            transaction_date: request.transaction_date.unwrap_or_else(Utc::now),
        };
        row.validate()?;

        let saved = self.source.insert_transaction(row).await?;
        self.events.notify(Table::Transactions);
        info!(transaction_id = %saved.id, status = %saved.status, "transaction recorded");
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::QuantityInput;
    use crate::repositories::testing::InMemorySource;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    fn service() -> (Arc<InMemorySource>, Arc<EventSender>, InventoryService) {
        let source = Arc::new(InMemorySource::default());
        let events = Arc::new(EventSender::new(16));
        let service = InventoryService::new(source.clone(), events.clone());
        (source, events, service)
    }

    fn product_request(quantity: QuantityInput, price: Decimal) -> CreateProductRequest {
        CreateProductRequest {
            name: "Beras".into(),
            category: "Bahan Pokok".into(),
            color: Some("  ".into()),
            quantity,
            price,
        }
    }

    #[tokio::test]
    async fn creating_a_product_notifies_subscribers() {
        let (source, events, service) = service();
        let mut sub = events.subscribe(&[Table::Products]);

        let saved = service
            .create_product(product_request(QuantityInput::Text("10".into()), dec!(12000)))
            .await
            .unwrap();

        assert_eq!(saved.quantity, 10);
        assert_eq!(saved.color, None);
        assert_eq!(source.products.lock().unwrap().len(), 1);
        assert_eq!(sub.changed().await, Some(Table::Products));
    }

    #[tokio::test]
    async fn negative_price_is_rejected_before_writing() {
        let (source, _events, service) = service();
        let err = service
            .create_product(product_request(QuantityInput::from(1), dec!(-5)))
            .await
            .unwrap_err();

        assert_matches!(err, ServiceError::ValidationError(_));
        assert!(source.products.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn price_beyond_the_money_column_is_rejected() {
        let (source, _events, service) = service();
        let err = service
            .create_product(product_request(QuantityInput::from(2), Decimal::MAX))
            .await
            .unwrap_err();

        assert_matches!(err, ServiceError::ValidationError(_));
        assert!(source.products.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn write_failures_surface_and_do_not_notify() {
        let (source, events, service) = service();
        let mut sub = events.subscribe(&[Table::RejectedItems]);
        source.fail(Table::RejectedItems);

        let err = service
            .create_rejected_item(CreateRejectedItemRequest {
                product_name: "Telur".into(),
                quantity: QuantityInput::from(3),
                reason: "pecah".into(),
            })
            .await
            .unwrap_err();
        assert_matches!(
            err,
            ServiceError::WriteFailure {
                table: Table::RejectedItems,
                ..
            }
        );

        source.recover(Table::RejectedItems);
        service
            .create_rejected_item(CreateRejectedItemRequest {
                product_name: "Telur".into(),
                quantity: QuantityInput::from(2),
                reason: "retak".into(),
            })
            .await
            .unwrap();
        // Only the successful write was announced
        assert_eq!(sub.changed().await, Some(Table::RejectedItems));
        assert_eq!(events.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn transactions_default_to_pending_and_partition_by_status() {
        let (_source, _events, service) = service();
        for status in [
            None,
            Some(TransactionStatus::Approved),
            Some(TransactionStatus::Rejected),
            Some(TransactionStatus::Approved),
        ] {
            service
                .create_transaction(CreateTransactionRequest {
                    product_name: "Minyak".into(),
                    quantity: QuantityInput::from(2),
                    amount: dec!(30000),
                    status,
                    notes: None,
                    transaction_date: None,
                })
                .await
                .unwrap();
        }

        let board = service.transaction_board().await.unwrap();
        assert_eq!(board.approved.len(), 2);
        assert_eq!(board.rejected.len(), 1);
        assert_eq!(board.pending.len(), 1);
        assert_eq!(board.approved_amount(), dec!(60000));
    }
}
