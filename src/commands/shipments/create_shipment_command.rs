use crate::{
    commands::{ensure_exists, Command},
    common::{normalize_timestamp, now},
    db::{with_transaction, DbPool, RetryConfig},
    errors::ServiceError,
    events::{Event, EventSender},
    models::{customer, driver, route, shipment, vehicle, warehouse, ShipmentStatus},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics::counter;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use validator::{Validate, ValidationError};

/// Largest amount a NUMERIC(12, 2) column holds
const MAX_TOTAL_AMOUNT: Decimal = dec!(9999999999.99);

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreateShipmentCommand {
    pub customer_id: Option<i32>,
    pub warehouse_id: Option<i32>,
    pub route_id: Option<i32>,
    pub driver_id: Option<i32>,
    pub vehicle_id: Option<i32>,
    #[validate(custom = "validate_total_amount")]
    pub total_amount: Decimal,
    pub estimated_delivery: Option<DateTime<Utc>>,
}

fn validate_total_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if *amount < Decimal::ZERO {
        let mut err = ValidationError::new("negative_amount");
        err.message = Some("total_amount must not be negative".into());
        return Err(err);
    }
    if amount.normalize().scale() > 2 {
        let mut err = ValidationError::new("amount_precision");
        err.message = Some("total_amount has at most two decimal places".into());
        return Err(err);
    }
    if *amount > MAX_TOTAL_AMOUNT {
        let mut err = ValidationError::new("amount_range");
        err.message = Some("total_amount exceeds 9999999999.99".into());
        return Err(err);
    }
    Ok(())
}

#[async_trait]
impl Command for CreateShipmentCommand {
    type Result = shipment::Model;

    #[instrument(skip(self, db_pool, event_sender, retry))]
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

        let command = self.clone();
        let saved_shipment = with_transaction(&db_pool, retry, "create_shipment", move |txn| {
            let command = command.clone();
            Box::pin(async move { command.create_shipment(txn).await })
        })
        .await
        .map_err(|e| {
            error!("Transaction failed for creating shipment: {}", e);
            e
        })?;

        counter!("logistics_shipments.created", 1);
        self.log_and_trigger_event(&event_sender, &saved_shipment)
            .await;

        Ok(saved_shipment)
    }
}

impl CreateShipmentCommand {
    async fn create_shipment(
        &self,
        txn: &DatabaseTransaction,
    ) -> Result<shipment::Model, ServiceError> {
        ensure_exists::<customer::Entity>(txn, "customer", self.customer_id).await?;
        ensure_exists::<warehouse::Entity>(txn, "warehouse", self.warehouse_id).await?;
        ensure_exists::<route::Entity>(txn, "route", self.route_id).await?;
        ensure_exists::<driver::Entity>(txn, "driver", self.driver_id).await?;
        ensure_exists::<vehicle::Entity>(txn, "vehicle", self.vehicle_id).await?;

        if let Some(driver_id) = self.driver_id {
            let open = shipment::Entity::find()
                .filter(shipment::Column::DriverId.eq(driver_id))
                .filter(shipment::Column::Status.is_not_in(ShipmentStatus::terminal_statuses()))
                .count(txn)
                .await
                .map_err(ServiceError::db_error)?;
            if open > 0 {
                return Err(ServiceError::Conflict(format!(
                    "Driver {} already has {} open shipment(s)",
                    driver_id, open
                )));
            }
        }

        let created_at = now();
        let new_shipment = shipment::ActiveModel {
            customer_id: Set(self.customer_id),
            warehouse_id: Set(self.warehouse_id),
            route_id: Set(self.route_id),
            driver_id: Set(self.driver_id),
            vehicle_id: Set(self.vehicle_id),
            status: Set(ShipmentStatus::Pending),
            total_amount: Set(self.total_amount),
            created_at: Set(created_at),
            updated_at: Set(created_at),
            estimated_delivery: Set(self.estimated_delivery.map(normalize_timestamp)),
            ..Default::default()
        };

        new_shipment.insert(txn).await.map_err(|e| {
            error!("Failed to create shipment: {}", e);
            ServiceError::db_error(e)
        })
    }

    async fn log_and_trigger_event(&self, event_sender: &EventSender, shipment: &shipment::Model) {
        info!(
            shipment_id = shipment.id,
            customer_id = ?shipment.customer_id,
            "Shipment created"
        );
        event_sender
            .publish(Event::ShipmentCreated {
                shipment_id: shipment.id,
                customer_id: shipment.customer_id,
                total_amount: shipment.total_amount,
            })
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_create_shipment_command() {
        let valid = CreateShipmentCommand {
            total_amount: dec!(125.50),
            ..Default::default()
        };
        assert!(valid.validate().is_ok());

        let zero = CreateShipmentCommand::default();
        assert!(zero.validate().is_ok());

        let negative = CreateShipmentCommand {
            total_amount: dec!(-0.01),
            ..Default::default()
        };
        assert!(negative.validate().is_err());

        let too_precise = CreateShipmentCommand {
            total_amount: dec!(1.005),
            ..Default::default()
        };
        assert!(too_precise.validate().is_err());

        let trailing_zeros = CreateShipmentCommand {
            total_amount: dec!(1.500),
            ..Default::default()
        };
        assert!(trailing_zeros.validate().is_ok());

        let too_large = CreateShipmentCommand {
            total_amount: dec!(10000000000.00),
            ..Default::default()
        };
        assert!(too_large.validate().is_err());
    }
}
