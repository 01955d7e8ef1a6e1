//! In-memory material source for unit tests.

use async_trait::async_trait;
use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;
use std::time::Duration;
use uuid::Uuid;

use super::{MaterialSource, SortDirection};
use crate::entities::{
    FoodConditionModel, ProductModel, RejectedItemModel, ReturnModel, TransactionModel,
};
use crate::errors::ServiceError;
use crate::events::Table;

#[derive(Default)]
pub(crate) struct InMemorySource {
    pub products: Mutex<Vec<ProductModel>>,
    pub rejected_items: Mutex<Vec<RejectedItemModel>>,
    pub food_conditions: Mutex<Vec<FoodConditionModel>>,
    pub transactions: Mutex<Vec<TransactionModel>>,
    pub returns: Mutex<Vec<ReturnModel>>,
    failing: Mutex<HashSet<Table>>,
    product_delays: Mutex<VecDeque<Duration>>,
}

impl InMemorySource {
    pub fn fail(&self, table: Table) {
        self.failing.lock().unwrap().insert(table);
    }

    pub fn recover(&self, table: Table) {
        self.failing.lock().unwrap().remove(&table);
    }

    /// Queues a delay for the next product fetch.
    pub fn delay_next_product_fetch(&self, delay: Duration) {
        self.product_delays.lock().unwrap().push_back(delay);
    }

    fn check(&self, table: Table) -> Result<(), ServiceError> {
        if self.failing.lock().unwrap().contains(&table) {
            Err(ServiceError::fetch(table, "simulated outage"))
        } else {
            Ok(())
        }
    }

    fn check_write(&self, table: Table) -> Result<(), ServiceError> {
        if self.failing.lock().unwrap().contains(&table) {
            Err(ServiceError::write(table, "simulated outage"))
        } else {
            Ok(())
        }
    }
}

fn ordered<T: Clone, K: Ord>(rows: &[T], order: SortDirection, key: impl Fn(&T) -> K) -> Vec<T> {
    let mut rows = rows.to_vec();
    rows.sort_by_key(|r| key(r));
    if order == SortDirection::Desc {
        rows.reverse();
    }
    rows
}

#[async_trait]
impl MaterialSource for InMemorySource {
    async fn fetch_products(
        &self,
        order: SortDirection,
    ) -> Result<Vec<ProductModel>, ServiceError> {
        // Snapshot before sleeping so a delayed fetch returns the older state
        let rows = ordered(&self.products.lock().unwrap(), order, |r| r.created_at);
        let result = self.check(Table::Products).map(|_| rows);
        let delay = self.product_delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        result
    }

    async fn fetch_rejected_items(
        &self,
        order: SortDirection,
    ) -> Result<Vec<RejectedItemModel>, ServiceError> {
        self.check(Table::RejectedItems)?;
        Ok(ordered(&self.rejected_items.lock().unwrap(), order, |r| {
            r.created_at
        }))
    }

    async fn fetch_food_conditions(
        &self,
        order: SortDirection,
    ) -> Result<Vec<FoodConditionModel>, ServiceError> {
        self.check(Table::FoodConditions)?;
        Ok(ordered(&self.food_conditions.lock().unwrap(), order, |r| {
            r.inspection_date
        }))
    }

    async fn fetch_transactions(
        &self,
        order: SortDirection,
    ) -> Result<Vec<TransactionModel>, ServiceError> {
        self.check(Table::Transactions)?;
        Ok(ordered(&self.transactions.lock().unwrap(), order, |r| {
            r.transaction_date
        }))
    }

    async fn fetch_returns(&self, order: SortDirection) -> Result<Vec<ReturnModel>, ServiceError> {
        self.check(Table::Returns)?;
        Ok(ordered(&self.returns.lock().unwrap(), order, |r| r.created_at))
    }

    async fn find_return(&self, id: Uuid) -> Result<Option<ReturnModel>, ServiceError> {
        self.check(Table::Returns)?;
        Ok(self
            .returns
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn insert_product(&self, row: ProductModel) -> Result<ProductModel, ServiceError> {
        self.check_write(Table::Products)?;
        self.products.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn insert_rejected_item(
        &self,
        row: RejectedItemModel,
    ) -> Result<RejectedItemModel, ServiceError> {
        self.check_write(Table::RejectedItems)?;
        self.rejected_items.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn insert_food_condition(
        &self,
        row: FoodConditionModel,
    ) -> Result<FoodConditionModel, ServiceError> {
        self.check_write(Table::FoodConditions)?;
        self.food_conditions.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn insert_transaction(
        &self,
        row: TransactionModel,
    ) -> Result<TransactionModel, ServiceError> {
        self.check_write(Table::Transactions)?;
        self.transactions.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn insert_return(&self, row: ReturnModel) -> Result<ReturnModel, ServiceError> {
        self.check_write(Table::Returns)?;
        self.returns.lock().unwrap().push(row.clone());
        Ok(row)
    }
}
