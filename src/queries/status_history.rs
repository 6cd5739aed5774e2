use super::Query;
use crate::{
    db::supports_row_locks,
    errors::ServiceError,
    models::{shipment, shipment_status_history, tracking, ShipmentStatus},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    AccessMode, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, IsolationLevel,
    QueryFilter, QueryOrder, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::iter::Peekable;
use std::vec;
use tracing::{debug, error};

/// One entry of a shipment's merged status history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEvent {
    pub status: ShipmentStatus,
    pub timestamp: DateTime<Utc>,
    /// Present when the entry came from a tracking row
    pub location: Option<String>,
}

/// Time-ordered merge of a shipment's tracking and status-history rows.
///
/// A tracking row and a history row with the same status and timestamp are
/// the two halves of one transition and yield a single [`StatusEvent`]
/// carrying the tracking location. Rows with equal timestamps otherwise keep
/// insertion order, tracking first.
#[derive(Debug)]
pub struct StatusHistory {
    tracking: Peekable<vec::IntoIter<tracking::Model>>,
    history: Peekable<vec::IntoIter<shipment_status_history::Model>>,
}

impl StatusHistory {
    /// Both inputs must be sorted by `(timestamp, id)`.
    pub fn new(
        tracking: Vec<tracking::Model>,
        history: Vec<shipment_status_history::Model>,
    ) -> Self {
        Self {
            tracking: tracking.into_iter().peekable(),
            history: history.into_iter().peekable(),
        }
    }

    fn from_tracking(row: tracking::Model) -> StatusEvent {
        StatusEvent {
            status: row.status,
            timestamp: row.timestamp,
            location: row.location,
        }
    }

    fn from_history(row: shipment_status_history::Model) -> StatusEvent {
        StatusEvent {
            status: row.status,
            timestamp: row.timestamp,
            location: None,
        }
    }
}

impl Iterator for StatusHistory {
    type Item = StatusEvent;

    fn next(&mut self) -> Option<StatusEvent> {
        let take_tracking = match (self.tracking.peek(), self.history.peek()) {
            (None, None) => return None,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (Some(t), Some(h)) => {
                let paired = t.timestamp == h.timestamp && t.status == h.status;
                let tracking_first = t.timestamp <= h.timestamp;
                if paired {
                    self.history.next();
                }
                tracking_first
            }
        };

        if take_tracking {
            self.tracking.next().map(Self::from_tracking)
        } else {
            self.history.next().map(Self::from_history)
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (t, _) = self.tracking.size_hint();
        let (h, _) = self.history.size_hint();
        (t.max(h), Some(t + h))
    }
}

/// Loads the status history of one shipment. Every execution reads the store afresh.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GetStatusHistoryQuery {
    pub shipment_id: i32,
}

#[async_trait]
impl Query for GetStatusHistoryQuery {
    type Result = StatusHistory;

    async fn execute(&self, db_pool: &DatabaseConnection) -> Result<Self::Result, ServiceError> {
        // all three reads share one snapshot
        let txn = if supports_row_locks(db_pool) {
            db_pool
                .begin_with_config(
                    Some(IsolationLevel::RepeatableRead),
                    Some(AccessMode::ReadOnly),
                )
                .await
        } else {
            db_pool.begin().await
        }
        .map_err(|e| {
            error!("Failed to open read transaction for status history: {:?}", e);
            ServiceError::db_error(e)
        })?;

        let history = self.load(&txn).await?;
        txn.commit().await.map_err(ServiceError::db_error)?;
        Ok(history)
    }
}

impl GetStatusHistoryQuery {
    async fn load(&self, conn: &DatabaseTransaction) -> Result<StatusHistory, ServiceError> {
        let exists = shipment::Entity::find_by_id(self.shipment_id)
            .one(conn)
            .await
            .map_err(|e| {
                error!("Database error in GetStatusHistoryQuery: {:?}", e);
                ServiceError::db_error(e)
            })?
            .is_some();
        if !exists {
            return Err(ServiceError::not_found("shipment", self.shipment_id));
        }

        let tracking = tracking::Entity::find()
            .filter(tracking::Column::ShipmentId.eq(self.shipment_id))
            .order_by_asc(tracking::Column::Timestamp)
            .order_by_asc(tracking::Column::Id)
            .all(conn)
            .await
            .map_err(ServiceError::db_error)?;

        let history = shipment_status_history::Entity::find()
            .filter(shipment_status_history::Column::ShipmentId.eq(self.shipment_id))
            .order_by_asc(shipment_status_history::Column::Timestamp)
            .order_by_asc(shipment_status_history::Column::Id)
            .all(conn)
            .await
            .map_err(ServiceError::db_error)?;

        debug!(
            shipment_id = self.shipment_id,
            tracking_rows = tracking.len(),
            history_rows = history.len(),
            "Loaded status history"
        );

        Ok(StatusHistory::new(tracking, history))
    }
}
