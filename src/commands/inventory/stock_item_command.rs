use crate::{
    commands::{ensure_exists, Command},
    common::now,
    db::{with_transaction, DbPool, RetryConfig},
    errors::ServiceError,
    events::{Event, EventSender},
    models::{inventory, warehouse},
};
use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use validator::Validate;

/// Opens a stock line for an item in a warehouse
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StockItemCommand {
    pub warehouse_id: i32,
    #[validate(length(min = 1, max = 100))]
    pub item_name: String,
    #[validate(range(min = 0))]
    pub quantity: i32,
}

#[async_trait]
impl Command for StockItemCommand {
    type Result = inventory::Model;

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
        let item = with_transaction(&db_pool, retry, "stock_item", move |txn| {
            let command = command.clone();
            Box::pin(async move { command.insert_item(txn).await })
        })
        .await?;

        info!(
            inventory_id = item.id,
            warehouse_id = item.warehouse_id,
            item_name = %item.item_name,
            quantity = item.quantity,
            "Inventory item stocked"
        );
        event_sender
            .publish(Event::InventoryStocked {
                inventory_id: item.id,
                warehouse_id: item.warehouse_id,
                item_name: item.item_name.clone(),
                quantity: item.quantity,
            })
            .await;

        Ok(item)
    }
}

impl StockItemCommand {
    async fn insert_item(&self, txn: &DatabaseTransaction) -> Result<inventory::Model, ServiceError> {
        ensure_exists::<warehouse::Entity>(txn, "warehouse", Some(self.warehouse_id)).await?;

        let existing = inventory::Entity::find()
            .filter(inventory::Column::WarehouseId.eq(self.warehouse_id))
            .filter(inventory::Column::ItemName.eq(self.item_name.as_str()))
            .one(txn)
            .await
            .map_err(ServiceError::db_error)?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Item '{}' is already stocked in warehouse {}",
                self.item_name, self.warehouse_id
            )));
        }

        inventory::ActiveModel {
            warehouse_id: Set(self.warehouse_id),
            item_name: Set(self.item_name.clone()),
            quantity: Set(self.quantity),
            last_updated: Set(now()),
            ..Default::default()
        }
        .insert(txn)
        .await
        .map_err(ServiceError::db_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_opening_quantity_is_invalid() {
        let command = StockItemCommand {
            warehouse_id: 1,
            item_name: "Widget".into(),
            quantity: -1,
        };
        assert!(command.validate().is_err());
        assert!(StockItemCommand { quantity: 0, ..command }.validate().is_ok());
    }
}
