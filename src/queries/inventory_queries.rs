use super::Query;
use crate::{errors::ServiceError, models::inventory};
use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetInventoryItemQuery {
    pub warehouse_id: i32,
    pub item_name: String,
}

#[async_trait]
impl Query for GetInventoryItemQuery {
    type Result = Option<inventory::Model>;

    async fn execute(&self, db_pool: &DatabaseConnection) -> Result<Self::Result, ServiceError> {
        inventory::Entity::find()
            .filter(inventory::Column::WarehouseId.eq(self.warehouse_id))
            .filter(inventory::Column::ItemName.eq(self.item_name.as_str()))
            .one(db_pool)
            .await
            .map_err(ServiceError::db_error)
    }
}

/// Every stock line of a warehouse, by item name
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GetWarehouseInventoryQuery {
    pub warehouse_id: i32,
}

#[async_trait]
impl Query for GetWarehouseInventoryQuery {
    type Result = Vec<inventory::Model>;

    async fn execute(&self, db_pool: &DatabaseConnection) -> Result<Self::Result, ServiceError> {
        inventory::Entity::find()
            .filter(inventory::Column::WarehouseId.eq(self.warehouse_id))
            .order_by_asc(inventory::Column::ItemName)
            .all(db_pool)
            .await
            .map_err(ServiceError::db_error)
    }
}
