use crate::{
    commands::inventory::{
        adjust_inventory_command::AdjustInventoryCommand, stock_item_command::StockItemCommand,
    },
    commands::Command,
    db::{DbPool, RetryConfig},
    errors::ServiceError,
    events::EventSender,
    models::inventory,
    queries::{
        inventory_queries::{GetInventoryItemQuery, GetWarehouseInventoryQuery},
        Query,
    },
};
use std::sync::Arc;
use tracing::instrument;

/// Per-warehouse item quantities that never go negative
#[derive(Clone)]
pub struct InventoryService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    retry: RetryConfig,
}

impl InventoryService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
            retry: RetryConfig::default(),
        }
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Opens a stock line; the warehouse must exist and the item must be new to it
    #[instrument(skip(self))]
    pub async fn stock_item(
        &self,
        warehouse_id: i32,
        item_name: &str,
        quantity: i32,
    ) -> Result<inventory::Model, ServiceError> {
        StockItemCommand {
            warehouse_id,
            item_name: item_name.to_string(),
            quantity,
        }
        .execute(self.db_pool.clone(), self.event_sender.clone(), &self.retry)
        .await
    }

    /// Applies `delta` and returns the new quantity.
    ///
    /// Fails with `InsufficientStock`, leaving the row untouched, when the
    /// result would be negative.
    #[instrument(skip(self))]
    pub async fn adjust_quantity(
        &self,
        warehouse_id: i32,
        item_name: &str,
        delta: i32,
    ) -> Result<i32, ServiceError> {
        let result = AdjustInventoryCommand {
            warehouse_id,
            item_name: item_name.to_string(),
            delta,
        }
        .execute(self.db_pool.clone(), self.event_sender.clone(), &self.retry)
        .await?;
        Ok(result.new_quantity)
    }

    pub async fn get_item(
        &self,
        warehouse_id: i32,
        item_name: &str,
    ) -> Result<Option<inventory::Model>, ServiceError> {
        GetInventoryItemQuery {
            warehouse_id,
            item_name: item_name.to_string(),
        }
        .execute(&self.db_pool)
        .await
    }

    pub async fn list_for_warehouse(
        &self,
        warehouse_id: i32,
    ) -> Result<Vec<inventory::Model>, ServiceError> {
        GetWarehouseInventoryQuery { warehouse_id }
            .execute(&self.db_pool)
            .await
    }
}
