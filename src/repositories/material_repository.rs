use async_trait::async_trait;
use metrics::{counter, histogram};
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, QueryOrder, Set};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};
use uuid::Uuid;
use validator::Validate;

use super::SortDirection;
use crate::entities::{
    food_condition, material_return, product, rejected_item, transaction, FoodConditionModel,
    ProductModel, RejectedItemModel, ReturnModel, TransactionModel,
};
use crate::errors::ServiceError;
use crate::events::Table;

/// Point-in-time access to the material tables.
///
/// Every fetched row is validated before it is returned; a malformed row is a
/// `ValidationError`, never silently passed on to aggregation.
#[async_trait]
pub trait MaterialSource: Send + Sync {
    async fn fetch_products(&self, order: SortDirection)
        -> Result<Vec<ProductModel>, ServiceError>;

    async fn fetch_rejected_items(
        &self,
        order: SortDirection,
    ) -> Result<Vec<RejectedItemModel>, ServiceError>;

    async fn fetch_food_conditions(
        &self,
        order: SortDirection,
    ) -> Result<Vec<FoodConditionModel>, ServiceError>;

    async fn fetch_transactions(
        &self,
        order: SortDirection,
    ) -> Result<Vec<TransactionModel>, ServiceError>;

    async fn fetch_returns(&self, order: SortDirection) -> Result<Vec<ReturnModel>, ServiceError>;

    async fn find_return(&self, id: Uuid) -> Result<Option<ReturnModel>, ServiceError>;

    async fn insert_product(&self, row: ProductModel) -> Result<ProductModel, ServiceError>;

    async fn insert_rejected_item(
        &self,
        row: RejectedItemModel,
    ) -> Result<RejectedItemModel, ServiceError>;

    async fn insert_food_condition(
        &self,
        row: FoodConditionModel,
    ) -> Result<FoodConditionModel, ServiceError>;

    async fn insert_transaction(
        &self,
        row: TransactionModel,
    ) -> Result<TransactionModel, ServiceError>;

    async fn insert_return(&self, row: ReturnModel) -> Result<ReturnModel, ServiceError>;
}

/// Relational implementation backed by sea-orm.
#[derive(Debug, Clone)]
pub struct SeaOrmMaterialSource {
    db: Arc<DatabaseConnection>,
    fetch_timeout: Duration,
}

impl SeaOrmMaterialSource {
    pub fn new(db: Arc<DatabaseConnection>, fetch_timeout: Duration) -> Self {
        Self { db, fetch_timeout }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Runs one table query under the fetch timeout and validates every row.
    async fn fetch_rows<M, Fut>(&self, table: Table, query: Fut) -> Result<Vec<M>, ServiceError>
    where
        M: Validate,
        Fut: Future<Output = Result<Vec<M>, DbErr>>,
    {
        let start = Instant::now();
        let rows = match tokio::time::timeout(self.fetch_timeout, query).await {
            Ok(Ok(rows)) => rows,
            Ok(Err(e)) => {
                error!(table = %table, error = %e, "fetch failed");
                counter!("bahan_baku.fetch.failure", 1, "table" => table.as_str());
                return Err(ServiceError::fetch(table, e));
            }
            Err(_) => {
                warn!(table = %table, timeout = ?self.fetch_timeout, "fetch timed out");
                counter!("bahan_baku.fetch.timeout", 1, "table" => table.as_str());
                return Err(ServiceError::fetch(
                    table,
                    format!("timed out after {:?}", self.fetch_timeout),
                ));
            }
        };

        validate_rows(table, &rows)?;

        let elapsed = start.elapsed();
        histogram!("bahan_baku.fetch.duration", elapsed.as_secs_f64(), "table" => table.as_str());
        debug!(table = %table, rows = rows.len(), duration = ?elapsed, "fetched table");
        Ok(rows)
    }

    async fn insert_row<A, M>(&self, table: Table, active: A) -> Result<M, ServiceError>
    where
        A: ActiveModelTrait + sea_orm::ActiveModelBehavior + Send + 'static,
        <A::Entity as EntityTrait>::Model: sea_orm::IntoActiveModel<A> + Into<M>,
    {
        let saved = active.insert(self.db()).await.map_err(|e| {
            error!(table = %table, error = %e, "insert failed");
            counter!("bahan_baku.write.failure", 1, "table" => table.as_str());
            ServiceError::write(table, e)
        })?;
        counter!("bahan_baku.write.success", 1, "table" => table.as_str());
        Ok(saved.into())
    }
}

/// Rejects the whole fetch when any stored row breaks the record contract.
pub(crate) fn validate_rows<M: Validate>(table: Table, rows: &[M]) -> Result<(), ServiceError> {
    for (index, row) in rows.iter().enumerate() {
        if let Err(e) = row.validate() {
            warn!(table = %table, row = index, error = %e, "malformed row");
            counter!("bahan_baku.fetch.malformed_row", 1, "table" => table.as_str());
            return Err(ServiceError::ValidationError(format!(
                "malformed row {} in {}: {}",
                index, table, e
            )));
        }
    }
    Ok(())
}

macro_rules! ordered {
    ($entity:ty, $column:expr, $order:expr) => {
        match $order {
            SortDirection::Asc => <$entity>::find().order_by_asc($column),
            SortDirection::Desc => <$entity>::find().order_by_desc($column),
        }
    };
}

#[async_trait]
impl MaterialSource for SeaOrmMaterialSource {
    async fn fetch_products(
        &self,
        order: SortDirection,
    ) -> Result<Vec<ProductModel>, ServiceError> {
        let query = ordered!(product::Entity, product::Column::CreatedAt, order).all(self.db());
        self.fetch_rows(Table::Products, query).await
    }

    async fn fetch_rejected_items(
        &self,
        order: SortDirection,
    ) -> Result<Vec<RejectedItemModel>, ServiceError> {
        let query = ordered!(rejected_item::Entity, rejected_item::Column::CreatedAt, order)
            .all(self.db());
        self.fetch_rows(Table::RejectedItems, query).await
    }

    async fn fetch_food_conditions(
        &self,
        order: SortDirection,
    ) -> Result<Vec<FoodConditionModel>, ServiceError> {
        let query = ordered!(
            food_condition::Entity,
            food_condition::Column::InspectionDate,
            order
        )
        .all(self.db());
        self.fetch_rows(Table::FoodConditions, query).await
    }

    async fn fetch_transactions(
        &self,
        order: SortDirection,
    ) -> Result<Vec<TransactionModel>, ServiceError> {
        let query = ordered!(
            transaction::Entity,
            transaction::Column::TransactionDate,
            order
        )
        .all(self.db());
        self.fetch_rows(Table::Transactions, query).await
    }

    async fn fetch_returns(&self, order: SortDirection) -> Result<Vec<ReturnModel>, ServiceError> {
        let query = ordered!(
            material_return::Entity,
            material_return::Column::CreatedAt,
            order
        )
        .all(self.db());
        self.fetch_rows(Table::Returns, query).await
    }

    async fn find_return(&self, id: Uuid) -> Result<Option<ReturnModel>, ServiceError> {
        let query = material_return::Entity::find_by_id(id).one(self.db());
        let found = match tokio::time::timeout(self.fetch_timeout, query).await {
            Ok(result) => result.map_err(|e| ServiceError::fetch(Table::Returns, e))?,
            Err(_) => {
                return Err(ServiceError::fetch(
                    Table::Returns,
                    format!("timed out after {:?}", self.fetch_timeout),
                ))
            }
        };
        if let Some(row) = &found {
            validate_rows(Table::Returns, std::slice::from_ref(row))?;
        }
        Ok(found)
    }

    async fn insert_product(&self, row: ProductModel) -> Result<ProductModel, ServiceError> {
        let active = product::ActiveModel {
            id: Set(row.id),
            name: Set(row.name),
            category: Set(row.category),
            color: Set(row.color),
            quantity: Set(row.quantity),
            price: Set(row.price),
            created_at: Set(row.created_at),
        };
        self.insert_row(Table::Products, active).await
    }

    async fn insert_rejected_item(
        &self,
        row: RejectedItemModel,
    ) -> Result<RejectedItemModel, ServiceError> {
        let active = rejected_item::ActiveModel {
            id: Set(row.id),
            product_name: Set(row.product_name),
            quantity: Set(row.quantity),
            reason: Set(row.reason),
            created_at: Set(row.created_at),
        };
        self.insert_row(Table::RejectedItems, active).await
    }

    async fn insert_food_condition(
        &self,
        row: FoodConditionModel,
    ) -> Result<FoodConditionModel, ServiceError> {
        let active = food_condition::ActiveModel {
            id: Set(row.id),
            product_name: Set(row.product_name),
            condition: Set(row.condition),
            fit_for_processing: Set(row.fit_for_processing),
            inspection_date: Set(row.inspection_date),
        };
        self.insert_row(Table::FoodConditions, active).await
    }

    async fn insert_transaction(
        &self,
        row: TransactionModel,
    ) -> Result<TransactionModel, ServiceError> {
        let active = transaction::ActiveModel {
            id: Set(row.id),
            product_name: Set(row.product_name),
            quantity: Set(row.quantity),
            amount: Set(row.amount),
            status: Set(row.status),
            notes: Set(row.notes),
            transaction_date: Set(row.transaction_date),
        };
        self.insert_row(Table::Transactions, active).await
    }

    async fn insert_return(&self, row: ReturnModel) -> Result<ReturnModel, ServiceError> {
        let active = material_return::ActiveModel {
            id: Set(row.id),
            return_number: Set(row.return_number),
            product_name: Set(row.product_name),
            quantity: Set(row.quantity),
            reason: Set(row.reason),
            status: Set(row.status),
            created_at: Set(row.created_at),
        };
        self.insert_row(Table::Returns, active).await
    }
}
