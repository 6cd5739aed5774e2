use crate::{
    commands::shipments::{
        create_shipment_command::CreateShipmentCommand,
        transition_shipment_status_command::TransitionShipmentStatusCommand,
    },
    commands::Command,
    common::Pagination,
    db::{DbPool, RetryConfig},
    errors::ServiceError,
    events::EventSender,
    models::{shipment, ShipmentStatus},
    queries::{
        shipment_queries::{
            GetOverdueShipmentsQuery, GetShipmentByIdQuery, GetShipmentsByReferenceQuery,
            ListShipmentsQuery, ShipmentPage, ShipmentReference,
        },
        status_history::{GetStatusHistoryQuery, StatusHistory},
        Query,
    },
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::instrument;

/// Service for the shipment lifecycle
#[derive(Clone)]
pub struct ShipmentService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    retry: RetryConfig,
}

impl ShipmentService {
    /// Creates a new shipment service instance
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

    /// Creates a shipment in `pending` after checking every supplied reference
    #[instrument(skip(self))]
    pub async fn create_shipment(
        &self,
        command: CreateShipmentCommand,
    ) -> Result<shipment::Model, ServiceError> {
        command
            .execute(self.db_pool.clone(), self.event_sender.clone(), &self.retry)
            .await
    }

    /// Moves a shipment to `new_status` at `timestamp`, appending to both audit logs
    #[instrument(skip(self, location))]
    pub async fn transition_status(
        &self,
        shipment_id: i32,
        new_status: ShipmentStatus,
        location: Option<String>,
        timestamp: DateTime<Utc>,
    ) -> Result<shipment::Model, ServiceError> {
        TransitionShipmentStatusCommand {
            shipment_id,
            new_status,
            location,
            timestamp,
        }
        .execute(self.db_pool.clone(), self.event_sender.clone(), &self.retry)
        .await
    }

    /// Same as [`Self::transition_status`] for a status given as text
    pub async fn transition_status_str(
        &self,
        shipment_id: i32,
        new_status: &str,
        location: Option<String>,
        timestamp: DateTime<Utc>,
    ) -> Result<shipment::Model, ServiceError> {
        let new_status = ShipmentStatus::parse(new_status)?;
        self.transition_status(shipment_id, new_status, location, timestamp)
            .await
    }

    /// Merged tracking and status history, oldest first; re-queried on every call
    #[instrument(skip(self))]
    pub async fn get_status_history(&self, shipment_id: i32) -> Result<StatusHistory, ServiceError> {
        GetStatusHistoryQuery { shipment_id }
            .execute(&self.db_pool)
            .await
    }

    /// Gets a shipment by ID
    #[instrument(skip(self))]
    pub async fn get_shipment(&self, shipment_id: i32) -> Result<Option<shipment::Model>, ServiceError> {
        GetShipmentByIdQuery { shipment_id }
            .execute(&self.db_pool)
            .await
    }

    /// Lists shipments with pagination, newest first
    #[instrument(skip(self))]
    pub async fn list_shipments(
        &self,
        page: u64,
        limit: u64,
        status: Option<ShipmentStatus>,
    ) -> Result<ShipmentPage, ServiceError> {
        ListShipmentsQuery {
            pagination: Pagination::new(page, limit),
            status,
        }
        .execute(&self.db_pool)
        .await
    }

    pub async fn shipments_for_customer(
        &self,
        customer_id: i32,
    ) -> Result<Vec<shipment::Model>, ServiceError> {
        self.by_reference(ShipmentReference::Customer, customer_id)
            .await
    }

    pub async fn shipments_for_warehouse(
        &self,
        warehouse_id: i32,
    ) -> Result<Vec<shipment::Model>, ServiceError> {
        self.by_reference(ShipmentReference::Warehouse, warehouse_id)
            .await
    }

    pub async fn shipments_for_route(
        &self,
        route_id: i32,
    ) -> Result<Vec<shipment::Model>, ServiceError> {
        self.by_reference(ShipmentReference::Route, route_id).await
    }

    pub async fn shipments_for_driver(
        &self,
        driver_id: i32,
    ) -> Result<Vec<shipment::Model>, ServiceError> {
        self.by_reference(ShipmentReference::Driver, driver_id).await
    }

    pub async fn shipments_for_vehicle(
        &self,
        vehicle_id: i32,
    ) -> Result<Vec<shipment::Model>, ServiceError> {
        self.by_reference(ShipmentReference::Vehicle, vehicle_id)
            .await
    }

    /// Open shipments past their estimated delivery
    pub async fn overdue_shipments(
        &self,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<shipment::Model>, ServiceError> {
        GetOverdueShipmentsQuery { as_of }
            .execute(&self.db_pool)
            .await
    }

    async fn by_reference(
        &self,
        reference: ShipmentReference,
        id: i32,
    ) -> Result<Vec<shipment::Model>, ServiceError> {
        GetShipmentsByReferenceQuery { reference, id }
            .execute(&self.db_pool)
            .await
    }
}
