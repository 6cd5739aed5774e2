use super::Query;
use crate::{
    common::Pagination,
    errors::ServiceError,
    models::{shipment, ShipmentStatus},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};
use tracing::error;
use validator::Validate;

/// Struct to get a specific shipment by ID.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GetShipmentByIdQuery {
    pub shipment_id: i32,
}

#[async_trait]
impl Query for GetShipmentByIdQuery {
    type Result = Option<shipment::Model>;

    async fn execute(&self, db_pool: &DatabaseConnection) -> Result<Self::Result, ServiceError> {
        shipment::Entity::find_by_id(self.shipment_id)
            .one(db_pool)
            .await
            .map_err(|e| {
                error!("Database error in GetShipmentByIdQuery: {:?}", e);
                ServiceError::db_error(e)
            })
    }
}

/// One page of shipments, newest first, optionally filtered by status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListShipmentsQuery {
    pub pagination: Pagination,
    pub status: Option<ShipmentStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentPage {
    pub shipments: Vec<shipment::Model>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

#[async_trait]
impl Query for ListShipmentsQuery {
    type Result = ShipmentPage;

    async fn execute(&self, db_pool: &DatabaseConnection) -> Result<Self::Result, ServiceError> {
        self.pagination.validate()?;

        let mut query = shipment::Entity::find();
        if let Some(status) = self.status {
            query = query.filter(shipment::Column::Status.eq(status));
        }

        let paginator = query
            .order_by_desc(shipment::Column::CreatedAt)
            .order_by_desc(shipment::Column::Id)
            .paginate(db_pool, self.pagination.limit);

        let total = paginator.num_items().await.map_err(|e| {
            error!("Database error in ListShipmentsQuery: {:?}", e);
            ServiceError::db_error(e)
        })?;
        let shipments = paginator
            .fetch_page(self.pagination.page_index())
            .await
            .map_err(ServiceError::db_error)?;

        Ok(ShipmentPage {
            shipments,
            total,
            page: self.pagination.page,
            limit: self.pagination.limit,
        })
    }
}

/// Foreign key a shipment lookup goes through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentReference {
    Customer,
    Warehouse,
    Route,
    Driver,
    Vehicle,
}

impl ShipmentReference {
    fn column(self) -> shipment::Column {
        match self {
            ShipmentReference::Customer => shipment::Column::CustomerId,
            ShipmentReference::Warehouse => shipment::Column::WarehouseId,
            ShipmentReference::Route => shipment::Column::RouteId,
            ShipmentReference::Driver => shipment::Column::DriverId,
            ShipmentReference::Vehicle => shipment::Column::VehicleId,
        }
    }
}

/// All shipments pointing at one customer, warehouse, route, driver or vehicle, oldest first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GetShipmentsByReferenceQuery {
    pub reference: ShipmentReference,
    pub id: i32,
}

#[async_trait]
impl Query for GetShipmentsByReferenceQuery {
    type Result = Vec<shipment::Model>;

    async fn execute(&self, db_pool: &DatabaseConnection) -> Result<Self::Result, ServiceError> {
        shipment::Entity::find()
            .filter(self.reference.column().eq(self.id))
            .order_by_asc(shipment::Column::CreatedAt)
            .order_by_asc(shipment::Column::Id)
            .all(db_pool)
            .await
            .map_err(|e| {
                error!("Database error in GetShipmentsByReferenceQuery: {:?}", e);
                ServiceError::db_error(e)
            })
    }
}

/// Open shipments whose estimated delivery lies before `as_of`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GetOverdueShipmentsQuery {
    pub as_of: DateTime<Utc>,
}

#[async_trait]
impl Query for GetOverdueShipmentsQuery {
    type Result = Vec<shipment::Model>;

    async fn execute(&self, db_pool: &DatabaseConnection) -> Result<Self::Result, ServiceError> {
        let candidates = shipment::Entity::find()
            .filter(shipment::Column::Status.is_not_in(ShipmentStatus::terminal_statuses()))
            .filter(shipment::Column::EstimatedDelivery.is_not_null())
            .order_by_asc(shipment::Column::EstimatedDelivery)
            .all(db_pool)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(candidates
            .into_iter()
            .filter(|s| s.is_overdue(self.as_of))
            .collect())
    }
}
