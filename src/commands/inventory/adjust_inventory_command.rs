use crate::{
    commands::Command,
    common::now,
    db::{supports_row_locks, with_transaction, DbPool, RetryConfig},
    errors::ServiceError,
    events::{Event, EventSender},
    models::inventory,
};
use async_trait::async_trait;
use metrics::counter;
use sea_orm::{ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, QuerySelect, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AdjustInventoryCommand {
    pub warehouse_id: i32,
    #[validate(length(min = 1, max = 100))]
    pub item_name: String,
    /// Signed change; negative values remove stock
    pub delta: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustInventoryResult {
    pub inventory_id: i32,
    pub previous_quantity: i32,
    pub new_quantity: i32,
    pub item: inventory::Model,
}

#[async_trait]
impl Command for AdjustInventoryCommand {
    type Result = AdjustInventoryResult;

    #[instrument(skip(self, db_pool, event_sender, retry), fields(warehouse_id = self.warehouse_id, item_name = %self.item_name, delta = self.delta))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        retry: &RetryConfig,
    ) -> Result<Self::Result, ServiceError> {
        self.validate().map_err(|e| {
            counter!("logistics_inventory.adjustment_failures", 1, "error_type" => "validation_error");
            let msg = format!("Invalid input: {}", e);
            error!("{}", msg);
            ServiceError::ValidationError(msg)
        })?;

        let command = self.clone();
        let result = with_transaction(&db_pool, retry, "adjust_inventory", move |txn| {
            let command = command.clone();
            Box::pin(async move { command.apply(txn).await })
        })
        .await
        .map_err(|e| {
            counter!("logistics_inventory.adjustment_failures", 1, "error_type" => e.code());
            match &e {
                ServiceError::InsufficientStock { .. } | ServiceError::NotFound(_) => {
                    warn!("Inventory adjustment rejected: {}", e)
                }
                _ => error!("Transaction failed for inventory adjustment: {}", e),
            }
            e
        })?;

        counter!("logistics_inventory.adjustments", 1);
        info!(
            inventory_id = result.inventory_id,
            previous_quantity = result.previous_quantity,
            new_quantity = result.new_quantity,
            "Inventory adjusted"
        );

        event_sender
            .publish(Event::InventoryAdjusted {
                inventory_id: result.inventory_id,
                warehouse_id: self.warehouse_id,
                item_name: self.item_name.clone(),
                old_quantity: result.previous_quantity,
                new_quantity: result.new_quantity,
            })
            .await;

        Ok(result)
    }
}

impl AdjustInventoryCommand {
    async fn apply(&self, txn: &DatabaseTransaction) -> Result<AdjustInventoryResult, ServiceError> {
        let mut query = inventory::Entity::find()
            .filter(inventory::Column::WarehouseId.eq(self.warehouse_id))
            .filter(inventory::Column::ItemName.eq(self.item_name.as_str()));
        if supports_row_locks(txn) {
            query = query.lock_exclusive();
        }
        let current = query
            .one(txn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Inventory item '{}' in warehouse {} not found",
                    self.item_name, self.warehouse_id
                ))
            })?;

        let new_quantity = current
            .quantity
            .checked_add(self.delta)
            .ok_or_else(|| {
                ServiceError::ValidationError(format!(
                    "Adjusting {} by {} overflows the quantity column",
                    current.quantity, self.delta
                ))
            })?;

        if new_quantity < 0 {
            return Err(ServiceError::InsufficientStock {
                item_name: current.item_name.clone(),
                available: current.quantity,
                requested: self.delta,
            });
        }

        let last_updated = now();
        let result = inventory::Entity::update_many()
            .set(inventory::ActiveModel {
                quantity: Set(new_quantity),
                last_updated: Set(last_updated),
                ..Default::default()
            })
            .filter(inventory::Column::Id.eq(current.id))
            .filter(inventory::Column::Quantity.eq(current.quantity))
            .exec(txn)
            .await
            .map_err(ServiceError::db_error)?;

        if result.rows_affected == 0 {
            return Err(ServiceError::ConcurrentModification {
                entity: "inventory",
                id: current.id,
            });
        }

        let previous_quantity = current.quantity;
        Ok(AdjustInventoryResult {
            inventory_id: current.id,
            previous_quantity,
            new_quantity,
            item: inventory::Model {
                quantity: new_quantity,
                last_updated,
                ..current
            },
        })
    }
}
