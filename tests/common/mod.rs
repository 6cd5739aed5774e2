#![allow(dead_code)]

use std::sync::Arc;

use logistics_tracking::{
    commands::shipments::create_shipment_command::CreateShipmentCommand,
    config::AppConfig,
    db,
    events::{process_events, EventSender},
    models::{customer, driver, route, shipment, vehicle, warehouse},
    services::directory::{NewCustomer, NewDriver, NewRoute, NewVehicle, NewWarehouse},
    AppState,
};
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use tempfile::TempDir;

/// Application state backed by a fresh, migrated SQLite database.
pub struct TestApp {
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<()>,
    _db_dir: Option<TempDir>,
}

/// One row of every entity a shipment can reference
pub struct Directory {
    pub customer: customer::Model,
    pub warehouse: warehouse::Model,
    pub route: route::Model,
    pub driver: driver::Model,
    pub vehicle: vehicle::Model,
}

impl TestApp {
    /// In-memory database; the pool holds a single connection.
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new("sqlite::memory:".to_string(), "test".to_string());
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;
        cfg.db_retry_max_attempts = 5;
        cfg.db_retry_initial_delay_ms = 1;
        cfg.db_retry_max_delay_ms = 10;
        Self::start(cfg, None).await
    }

    /// File-backed database shared by `connections` pooled connections, so
    /// transactions genuinely overlap.
    pub async fn file_backed(connections: u32) -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("logistics.db").display());

        let mut cfg = AppConfig::new(url, "test".to_string());
        cfg.db_max_connections = connections;
        cfg.db_min_connections = 1;
        cfg.db_acquire_timeout_secs = 30;
        cfg.db_retry_max_attempts = 50;
        cfg.db_retry_initial_delay_ms = 1;
        cfg.db_retry_max_delay_ms = 25;
        Self::start(cfg, Some(dir)).await
    }

    async fn start(cfg: AppConfig, db_dir: Option<TempDir>) -> Self {
        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations");

        let (sender, rx) = EventSender::channel(cfg.event_channel_capacity);
        let event_task = tokio::spawn(process_events(rx));

        Self {
            state: AppState::new(Arc::new(pool), cfg, Arc::new(sender)),
            _event_task: event_task,
            _db_dir: db_dir,
        }
    }

    /// Registers one customer, warehouse, route, driver and vehicle.
    ///
    /// `tag` keeps unique columns distinct when called more than once.
    pub async fn directory(&self, tag: &str) -> Directory {
        let dir = &self.state.directory;
        Directory {
            customer: dir
                .register_customer(NewCustomer {
                    name: "Alice Smith".into(),
                    email: format!("alice+{tag}@example.com"),
                    phone: Some("123-456-7890".into()),
                })
                .await
                .expect("customer"),
            warehouse: dir
                .register_warehouse(NewWarehouse {
                    name: "Central Warehouse".into(),
                    location: "123 Main St".into(),
                })
                .await
                .expect("warehouse"),
            route: dir
                .register_route(NewRoute {
                    origin: "City A".into(),
                    destination: "City B".into(),
                    distance_km: Some(120.5),
                })
                .await
                .expect("route"),
            driver: dir
                .register_driver(NewDriver {
                    name: "Bob Driver".into(),
                    phone: Some("555-1234".into()),
                    license_number: Some(format!("LIC-{tag}")),
                })
                .await
                .expect("driver"),
            vehicle: dir
                .register_vehicle(NewVehicle {
                    plate_number: format!("ABC-{tag}"),
                    vehicle_type: Some("Truck".into()),
                    capacity: Some(1000),
                })
                .await
                .expect("vehicle"),
        }
    }

    pub async fn pending_shipment(&self, directory: &Directory) -> shipment::Model {
        self.state
            .shipments
            .create_shipment(CreateShipmentCommand {
                customer_id: Some(directory.customer.id),
                warehouse_id: Some(directory.warehouse.id),
                route_id: Some(directory.route.id),
                driver_id: Some(directory.driver.id),
                vehicle_id: Some(directory.vehicle.id),
                total_amount: dec!(125.50),
                estimated_delivery: None,
            })
            .await
            .expect("create shipment")
    }

    /// A shipment with no references at all
    pub async fn bare_shipment(&self) -> shipment::Model {
        self.state
            .shipments
            .create_shipment(CreateShipmentCommand::default())
            .await
            .expect("create shipment")
    }

    /// (tracking rows, status history rows) stored for a shipment
    pub async fn audit_row_counts(&self, shipment_id: i32) -> (u64, u64) {
        use logistics_tracking::models::{shipment_status_history, tracking};

        let db = self.state.db.as_ref();
        let tracking = tracking::Entity::find()
            .filter(tracking::Column::ShipmentId.eq(shipment_id))
            .count(db)
            .await
            .expect("count tracking");
        let history = shipment_status_history::Entity::find()
            .filter(shipment_status_history::Column::ShipmentId.eq(shipment_id))
            .count(db)
            .await
            .expect("count history");
        (tracking, history)
    }
}
