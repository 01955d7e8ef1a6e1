//! Table change notifications.
//!
//! Writers publish a [`Event::TableChanged`] after every successful insert;
//! readers hold a [`Subscription`] scoped to the tables they render and
//! re-fetch on each notification. Events carry no diff payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;
use tracing::{debug, warn};
use utoipa::ToSchema;

/// The tables exposed by the material data source.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Products,
    RejectedItems,
    FoodConditions,
    Transactions,
    Returns,
}

impl Table {
    pub const ALL: [Table; 5] = [
        Table::Products,
        Table::RejectedItems,
        Table::FoodConditions,
        Table::Transactions,
        Table::Returns,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Products => "products",
            Table::RejectedItems => "rejected_items",
            Table::FoodConditions => "food_conditions",
            Table::Transactions => "transactions",
            Table::Returns => "returns",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    TableChanged {
        table: Table,
        timestamp: DateTime<Utc>,
    },
}

impl Event {
    pub fn table_changed(table: Table) -> Self {
        Event::TableChanged {
            table,
            timestamp: Utc::now(),
        }
    }

    pub fn table(&self) -> Table {
        match self {
            Event::TableChanged { table, .. } => *table,
        }
    }
}

/// Publishing side of the change-notification stream.
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: broadcast::Sender<Event>,
}

impl EventSender {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes a change for `table`.
    ///
    /// Having no subscriber is not an error: nothing is rendering that table.
    pub fn notify(&self, table: Table) {
        match self.sender.send(Event::table_changed(table)) {
            Ok(receivers) => debug!(table = %table, receivers, "table change published"),
            Err(_) => debug!(table = %table, "table change published with no subscribers"),
        }
    }

    /// Opens a subscription for the given tables. Dropping the handle releases it.
    pub fn subscribe(&self, tables: &[Table]) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
            tables: tables.to_vec(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// A live subscription to changes on a set of tables.
#[derive(Debug)]
pub struct Subscription {
    receiver: broadcast::Receiver<Event>,
    tables: Vec<Table>,
}

impl Subscription {
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Waits for the next change on a watched table.
    ///
    /// Returns `None` once every sender is gone. When the subscriber lagged and
    /// notifications were dropped, the first watched table is reported so the
    /// caller still re-fetches.
    pub async fn changed(&mut self) -> Option<Table> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.tables.contains(&event.table()) => return Some(event.table()),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "change subscription lagged; forcing refresh");
                    return self.tables.first().copied();
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscription_only_sees_watched_tables() {
        let sender = EventSender::new(16);
        let mut sub = sender.subscribe(&[Table::Products, Table::RejectedItems]);

        sender.notify(Table::Returns);
        sender.notify(Table::RejectedItems);

        assert_eq!(sub.changed().await, Some(Table::RejectedItems));
    }

    #[tokio::test]
    async fn dropping_subscription_releases_it() {
        let sender = EventSender::new(16);
        let sub = sender.subscribe(&Table::ALL);
        assert_eq!(sender.subscriber_count(), 1);

        drop(sub);
        assert_eq!(sender.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn closed_stream_ends_subscription() {
        let sender = EventSender::new(4);
        let mut sub = sender.subscribe(&[Table::Products]);
        drop(sender);

        assert_eq!(sub.changed().await, None);
    }

    #[tokio::test]
    async fn lagged_subscription_still_triggers_refresh() {
        let sender = EventSender::new(1);
        let mut sub = sender.subscribe(&[Table::FoodConditions]);

        sender.notify(Table::FoodConditions);
        sender.notify(Table::FoodConditions);
        sender.notify(Table::FoodConditions);

        assert_eq!(sub.changed().await, Some(Table::FoodConditions));
    }

    #[test]
    fn table_names_match_storage() {
        let names: Vec<_> = Table::ALL.iter().map(Table::as_str).collect();
        assert_eq!(
            names,
            vec![
                "products",
                "rejected_items",
                "food_conditions",
                "transactions",
                "returns"
            ]
        );
    }
}
