use crate::{
    commands::Command,
    common::normalize_timestamp,
    db::{supports_row_locks, with_transaction, DbPool, RetryConfig},
    errors::ServiceError,
    events::{Event, EventSender},
    models::{shipment, shipment_status_history, tracking, ShipmentStatus},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics::counter;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use validator::Validate;

/// Moves a shipment to a new status and records it in both audit logs.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TransitionShipmentStatusCommand {
    pub shipment_id: i32,
    pub new_status: ShipmentStatus,
    #[validate(length(min = 1, max = 200))]
    pub location: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[async_trait]
impl Command for TransitionShipmentStatusCommand {
    type Result = shipment::Model;

    #[instrument(skip(self, db_pool, event_sender, retry), fields(shipment_id = self.shipment_id, new_status = %self.new_status))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        retry: &RetryConfig,
    ) -> Result<Self::Result, ServiceError> {
        self.validate().map_err(|e| {
            error!("Validation failed: {:?}", e);
            ServiceError::ValidationError(e.to_string())
        })?;

        let command = Self {
            timestamp: normalize_timestamp(self.timestamp),
            ..self.clone()
        };
        let moved = command.clone();
        let (previous_status, updated) =
            with_transaction(&db_pool, retry, "transition_shipment_status", move |txn| {
                let command = moved.clone();
                Box::pin(async move { command.apply(txn).await })
            })
            .await
            .map_err(|e| {
                match &e {
                    ServiceError::InvalidTransition { .. } | ServiceError::NotFound(_) => {
                        warn!("Shipment transition rejected: {}", e)
                    }
                    _ => error!("Transaction failed for shipment transition: {}", e),
                }
                e
            })?;

        counter!(
            "logistics_shipments.transitions",
            1,
            "to" => updated.status.to_string()
        );
        command
            .log_and_trigger_event(&event_sender, previous_status, &updated)
            .await;

        Ok(updated)
    }
}

impl TransitionShipmentStatusCommand {
    /// Validates against the current row, compare-and-sets the status and
    /// appends one tracking row and one history row.
    async fn apply(
        &self,
        txn: &DatabaseTransaction,
    ) -> Result<(ShipmentStatus, shipment::Model), ServiceError> {
        let mut query = shipment::Entity::find_by_id(self.shipment_id);
        if supports_row_locks(txn) {
            query = query.lock_exclusive();
        }
        let current = query
            .one(txn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::not_found("shipment", self.shipment_id))?;

        current.validate_transition(self.new_status, self.timestamp)?;

        let result = shipment::Entity::update_many()
            .set(shipment::ActiveModel {
                status: Set(self.new_status),
                updated_at: Set(self.timestamp),
                ..Default::default()
            })
            .filter(shipment::Column::Id.eq(current.id))
            .filter(shipment::Column::Status.eq(current.status))
            .exec(txn)
            .await
            .map_err(ServiceError::db_error)?;

        if result.rows_affected == 0 {
            return Err(ServiceError::ConcurrentModification {
                entity: "shipment",
                id: current.id,
            });
        }

        tracking::ActiveModel {
            shipment_id: Set(current.id),
            status: Set(self.new_status),
            location: Set(self.location.clone()),
            timestamp: Set(self.timestamp),
            ..Default::default()
        }
        .insert(txn)
        .await
        .map_err(ServiceError::db_error)?;

        shipment_status_history::ActiveModel {
            shipment_id: Set(current.id),
            status: Set(self.new_status),
            timestamp: Set(self.timestamp),
            ..Default::default()
        }
        .insert(txn)
        .await
        .map_err(ServiceError::db_error)?;

        let previous_status = current.status;
        let updated = shipment::Model {
            status: self.new_status,
            updated_at: self.timestamp,
            ..current
        };

        Ok((previous_status, updated))
    }

    async fn log_and_trigger_event(
        &self,
        event_sender: &EventSender,
        previous_status: ShipmentStatus,
        shipment: &shipment::Model,
    ) {
        info!(
            shipment_id = shipment.id,
            from = %previous_status,
            to = %shipment.status,
            "Shipment status updated"
        );
        event_sender
            .publish(Event::ShipmentStatusChanged {
                shipment_id: shipment.id,
                old_status: previous_status,
                new_status: shipment.status,
                location: self.location.clone(),
                timestamp: self.timestamp,
            })
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_length_is_bounded() {
        let mut command = TransitionShipmentStatusCommand {
            shipment_id: 1,
            new_status: ShipmentStatus::InTransit,
            location: Some("Central Warehouse".into()),
            timestamp: Utc::now(),
        };
        assert!(command.validate().is_ok());

        command.location = None;
        assert!(command.validate().is_ok());

        command.location = Some(String::new());
        assert!(command.validate().is_err());

        command.location = Some("x".repeat(201));
        assert!(command.validate().is_err());
    }
}
