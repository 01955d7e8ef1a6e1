//! Live analytics snapshot kept current by table change notifications.
//!
//! Refreshes may overlap when notifications arrive in bursts. Every refresh
//! takes a ticket from a monotonic counter, and per table only a result with a
//! ticket newer than the last applied one may replace the loaded records. A
//! slow older fetch therefore never overwrites fresher state.

use chrono::{DateTime, Utc};
use metrics::counter;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};
use utoipa::ToSchema;

use super::analytics::{
    aggregate, AnalyticsService, MaterialFetch, MaterialMetrics, MaterialRecords, ANALYTICS_TABLES,
};
use crate::errors::ServiceError;
use crate::events::{Subscription, Table};

/// What a client sees at `/analytics/metrics`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MetricsSnapshot {
    pub metrics: MaterialMetrics,
    /// Tables whose latest fetch failed; their records are from an earlier fetch
    pub stale_sources: Vec<Table>,
    pub refreshed_at: Option<DateTime<Utc>>,
    /// Ticket of the newest refresh applied to any table
    pub sequence: u64,
}

/// Result of applying one refresh to the snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyOutcome {
    pub applied: Vec<Table>,
    pub discarded: Vec<Table>,
    pub failed: Vec<Table>,
}

#[derive(Debug, Default)]
struct SnapshotState {
    records: MaterialRecords,
    /// Per table, the ticket of the last result (success or failure) applied
    applied_seq: BTreeMap<Table, u64>,
    stale: BTreeSet<Table>,
    refreshed_at: Option<DateTime<Utc>>,
}

pub struct LiveAnalytics {
    service: AnalyticsService,
    state: RwLock<SnapshotState>,
    next_ticket: AtomicU64,
}

impl LiveAnalytics {
    pub fn new(service: AnalyticsService) -> Self {
        Self {
            service,
            state: RwLock::new(SnapshotState::default()),
            next_ticket: AtomicU64::new(0),
        }
    }

    /// Issues the ticket for a new refresh request.
    pub fn issue_ticket(&self) -> u64 {
        self.next_ticket.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Fetches every analytics table and applies the results under the
    /// sequence guard.
    pub async fn refresh(&self) -> Result<ApplyOutcome, ServiceError> {
        let ticket = self.issue_ticket();
        debug!(ticket, "analytics refresh started");
        let fetch = self.service.fetch_all().await;
        self.apply(ticket, fetch)
    }

    /// Applies a fetch round carrying `ticket`.
    ///
    /// Per table: a result older than (or equal to) the last applied ticket is
    /// discarded; a newer success replaces the records and clears staleness; a
    /// newer failure keeps the previous records and marks the table stale.
    pub fn apply(&self, ticket: u64, fetch: MaterialFetch) -> Result<ApplyOutcome, ServiceError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| ServiceError::InternalError("analytics snapshot lock poisoned".into()))?;
        let mut outcome = ApplyOutcome::default();

        let MaterialFetch {
            products,
            rejected_items,
            food_conditions,
            transactions,
        } = fetch;

        apply_table(&mut state, &mut outcome, ticket, Table::Products, products, |s, rows| {
            s.records.products = rows
        });
        apply_table(
            &mut state,
            &mut outcome,
            ticket,
            Table::RejectedItems,
            rejected_items,
            |s, rows| s.records.rejected_items = rows,
        );
        apply_table(
            &mut state,
            &mut outcome,
            ticket,
            Table::FoodConditions,
            food_conditions,
            |s, rows| s.records.food_conditions = rows,
        );
        apply_table(
            &mut state,
            &mut outcome,
            ticket,
            Table::Transactions,
            transactions,
            |s, rows| s.records.transactions = rows,
        );

        if !outcome.applied.is_empty() || !outcome.failed.is_empty() {
            state.refreshed_at = Some(Utc::now());
        }
        if !outcome.discarded.is_empty() {
            counter!(
                "bahan_baku.analytics.stale_discarded",
                outcome.discarded.len() as u64
            );
            debug!(ticket, discarded = ?outcome.discarded, "discarded out-of-order results");
        }
        counter!("bahan_baku.analytics.refreshes", 1);

        Ok(outcome)
    }

    /// Current metrics, recomputed from the loaded records.
    pub fn snapshot(&self) -> Result<MetricsSnapshot, ServiceError> {
        let state = self
            .state
            .read()
            .map_err(|_| ServiceError::InternalError("analytics snapshot lock poisoned".into()))?;
        Ok(MetricsSnapshot {
            metrics: aggregate(&state.records),
            stale_sources: state.stale.iter().copied().collect(),
            refreshed_at: state.refreshed_at,
            sequence: state.applied_seq.values().copied().max().unwrap_or(0),
        })
    }

    /// Copy of the records currently loaded.
    pub fn records(&self) -> Result<MaterialRecords, ServiceError> {
        self.state
            .read()
            .map(|s| s.records.clone())
            .map_err(|_| ServiceError::InternalError("analytics snapshot lock poisoned".into()))
    }

    /// Starts refreshing on every change notification from `subscription`.
    ///
    /// Refreshes run concurrently; the returned handle stops the loop and any
    /// in-flight refresh when dropped, and the subscription is released with it.
    pub fn spawn_refresh_loop(self: Arc<Self>, mut subscription: Subscription) -> RefreshHandle {
        let task = tokio::spawn(async move {
            let mut in_flight = JoinSet::new();
            info!(tables = ?subscription.tables(), "analytics refresh loop started");
            loop {
                tokio::select! {
                    changed = subscription.changed() => match changed {
                        Some(table) => {
                            debug!(table = %table, "table changed; refreshing analytics");
                            let live = Arc::clone(&self);
                            in_flight.spawn(async move {
                                if let Err(e) = live.refresh().await {
                                    warn!(error = %e, "analytics refresh failed");
                                }
                            });
                        }
                        None => break,
                    },
                    Some(_) = in_flight.join_next(), if !in_flight.is_empty() => {}
                }
            }
            while in_flight.join_next().await.is_some() {}
            info!("analytics refresh loop stopped");
        });
        RefreshHandle { task }
    }
}

fn apply_table<T>(
    state: &mut SnapshotState,
    outcome: &mut ApplyOutcome,
    ticket: u64,
    table: Table,
    result: Result<Vec<T>, ServiceError>,
    replace: impl FnOnce(&mut SnapshotState, Vec<T>),
) {
    let last = state.applied_seq.get(&table).copied().unwrap_or(0);
    if ticket <= last {
        outcome.discarded.push(table);
        return;
    }
    state.applied_seq.insert(table, ticket);

    match result {
        Ok(rows) => {
            replace(state, rows);
            state.stale.remove(&table);
            outcome.applied.push(table);
        }
        Err(e) => {
            warn!(table = %table, ticket, error = %e, "keeping previous records after failed fetch");
            state.stale.insert(table);
            outcome.failed.push(table);
        }
    }
}

/// Owns the background refresh task; dropping it aborts the task.
#[derive(Debug)]
pub struct RefreshHandle {
    task: JoinHandle<()>,
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Tables the refresh loop should subscribe to.
pub fn watched_tables() -> &'static [Table] {
    &ANALYTICS_TABLES
}
