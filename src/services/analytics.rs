use chrono::{DateTime, Utc};
use metrics::counter;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

use crate::{
    entities::{
        FoodConditionModel, ProductModel, RejectedItemModel, TransactionModel, TransactionStatus,
    },
    errors::ServiceError,
    events::Table,
    repositories::{MaterialSource, SortDirection},
};

/// Tables the analytics view is computed from.
pub const ANALYTICS_TABLES: [Table; 4] = [
    Table::Products,
    Table::RejectedItems,
    Table::FoodConditions,
    Table::Transactions,
];

/// The record sets loaded for one analytics view, in fetch order (newest first).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialRecords {
    pub products: Vec<ProductModel>,
    pub rejected_items: Vec<RejectedItemModel>,
    pub food_conditions: Vec<FoodConditionModel>,
    pub transactions: Vec<TransactionModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TransactionSummary {
    pub approved_count: usize,
    #[schema(value_type = String, example = "120000.00")]
    pub approved_amount: Decimal,
    pub rejected_count: usize,
    pub pending_count: usize,
}

/// Derived statistics over a [`MaterialRecords`] set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MaterialMetrics {
    /// Σ price × quantity over products
    #[schema(value_type = String, example = "120000")]
    pub total_value: Decimal,
    /// Σ quantity over products
    pub total_stock: i64,
    /// Σ quantity over rejected items
    pub total_rejected: i64,
    /// Percentage of inspections fit for processing, one decimal place
    #[schema(value_type = String, example = "50.0")]
    pub pass_rate: Decimal,
    pub product_count: usize,
    pub inspection_count: usize,
    pub fit_count: usize,
    pub transactions: TransactionSummary,
}

impl Default for MaterialMetrics {
    fn default() -> Self {
        aggregate(&MaterialRecords::default())
    }
}

/// Computes every metric by a full scan of `records`.
///
/// Pure; empty sets give zero values and an empty inspection set gives a pass
/// rate of `0.0`.
pub fn aggregate(records: &MaterialRecords) -> MaterialMetrics {
    let total_value = records
        .products
        .iter()
        .map(ProductModel::value)
        .fold(Decimal::ZERO, Decimal::saturating_add);
    let total_stock = records
        .products
        .iter()
        .map(|p| i64::from(p.quantity))
        .sum();
    let total_rejected = records
        .rejected_items
        .iter()
        .map(|r| i64::from(r.quantity))
        .sum();

    let inspection_count = records.food_conditions.len();
    let fit_count = records
        .food_conditions
        .iter()
        .filter(|c| c.fit_for_processing)
        .count();

    let mut transactions = TransactionSummary::default();
    for tx in &records.transactions {
        match tx.status {
            TransactionStatus::Approved => {
                transactions.approved_count += 1;
                transactions.approved_amount =
                    transactions.approved_amount.saturating_add(tx.amount);
            }
            TransactionStatus::Rejected => transactions.rejected_count += 1,
            TransactionStatus::Pending => transactions.pending_count += 1,
        }
    }

    MaterialMetrics {
        total_value,
        total_stock,
        total_rejected,
        pass_rate: pass_rate(fit_count, inspection_count),
        product_count: records.products.len(),
        inspection_count,
        fit_count,
        transactions,
    }
}

/// `fit / total × 100`, rounded half away from zero to one decimal place.
pub fn pass_rate(fit: usize, total: usize) -> Decimal {
    if total == 0 {
        let mut zero = Decimal::ZERO;
        zero.rescale(1);
        return zero;
    }
    let mut rate = (Decimal::from(fit as u64) * Decimal::ONE_HUNDRED / Decimal::from(total as u64))
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
    rate.rescale(1);
    rate
}

/// Per-table outcome of one concurrent fetch round.
#[derive(Debug)]
pub struct MaterialFetch {
    pub products: Result<Vec<ProductModel>, ServiceError>,
    pub rejected_items: Result<Vec<RejectedItemModel>, ServiceError>,
    pub food_conditions: Result<Vec<FoodConditionModel>, ServiceError>,
    pub transactions: Result<Vec<TransactionModel>, ServiceError>,
}

impl MaterialFetch {
    /// Tables whose fetch failed in this round.
    pub fn failed_tables(&self) -> Vec<Table> {
        let mut failed = Vec::new();
        if self.products.is_err() {
            failed.push(Table::Products);
        }
        if self.rejected_items.is_err() {
            failed.push(Table::RejectedItems);
        }
        if self.food_conditions.is_err() {
            failed.push(Table::FoodConditions);
        }
        if self.transactions.is_err() {
            failed.push(Table::Transactions);
        }
        failed
    }

    /// All four record sets, or the first failure.
    pub fn into_records(self) -> Result<MaterialRecords, ServiceError> {
        Ok(MaterialRecords {
            products: self.products?,
            rejected_items: self.rejected_items?,
            food_conditions: self.food_conditions?,
            transactions: self.transactions?,
        })
    }
}

/// Fetches the analytics tables and derives metrics from them.
#[derive(Clone)]
pub struct AnalyticsService {
    source: Arc<dyn MaterialSource>,
}

impl AnalyticsService {
    pub fn new(source: Arc<dyn MaterialSource>) -> Self {
        Self { source }
    }

    /// Fetches the four analytics tables concurrently, newest first.
    ///
    /// A failing table does not abort the others.
    #[instrument(skip(self))]
    pub async fn fetch_all(&self) -> MaterialFetch {
        let order = SortDirection::Desc;
        let (products, rejected_items, food_conditions, transactions) = tokio::join!(
            self.source.fetch_products(order),
            self.source.fetch_rejected_items(order),
            self.source.fetch_food_conditions(order),
            self.source.fetch_transactions(order),
        );

        let fetch = MaterialFetch {
            products,
            rejected_items,
            food_conditions,
            transactions,
        };

        let failed = fetch.failed_tables();
        if failed.is_empty() {
            counter!("bahan_baku.analytics.fetch_rounds", 1, "outcome" => "complete");
        } else {
            warn!(?failed, "analytics fetch round partially failed");
            counter!("bahan_baku.analytics.fetch_rounds", 1, "outcome" => "partial");
        }
        fetch
    }

    /// Loads every analytics table, failing if any of them fails.
    pub async fn load_records(&self) -> Result<MaterialRecords, ServiceError> {
        self.fetch_all().await.into_records()
    }

    /// Point-in-time metrics straight from the source.
    pub async fn compute_metrics(&self) -> Result<MaterialMetrics, ServiceError> {
        let records = self.load_records().await?;
        let metrics = aggregate(&records);
        info!(
            total_value = %metrics.total_value,
            total_stock = metrics.total_stock,
            pass_rate = %metrics.pass_rate,
            "computed material metrics"
        );
        Ok(metrics)
    }
}

/// Metrics plus the loaded records they were computed from.
#[derive(Debug, Clone)]
pub struct AnalyticsReport {
    pub records: MaterialRecords,
    pub metrics: MaterialMetrics,
    pub generated_at: DateTime<Utc>,
}

impl AnalyticsReport {
    pub fn new(records: MaterialRecords, generated_at: DateTime<Utc>) -> Self {
        let metrics = aggregate(&records);
        Self {
            records,
            metrics,
            generated_at,
        }
    }
}
