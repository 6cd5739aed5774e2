//! Demo data for development and test databases.

use crate::{
    commands::shipments::create_shipment_command::CreateShipmentCommand,
    errors::ServiceError,
    models::UserRole,
    services::directory::{NewCustomer, NewDriver, NewRoute, NewVehicle, NewWarehouse},
    AppState,
};
use rust_decimal_macros::dec;
use serde::Serialize;
use tracing::info;

pub const DEMO_CUSTOMER_EMAIL: &str = "alice@example.com";
pub const DEMO_ADMIN_USERNAME: &str = "admin";

/// Ids of the rows a seeding run created
#[derive(Debug, Clone, Serialize)]
pub struct SeedSummary {
    pub customer_id: i32,
    pub warehouse_id: i32,
    pub route_id: i32,
    pub driver_id: i32,
    pub vehicle_id: i32,
    pub user_id: i32,
    pub shipment_id: i32,
    pub inventory_ids: Vec<i32>,
}

/// Inserts one of each directory entity, an admin user, a pending shipment
/// and opening stock. Fails with `Conflict` when the demo customer exists.
pub async fn seed_demo_data(
    state: &AppState,
    admin_password: &str,
) -> Result<SeedSummary, ServiceError> {
    if state
        .directory
        .find_customer_by_email(DEMO_CUSTOMER_EMAIL)
        .await?
        .is_some()
    {
        return Err(ServiceError::Conflict(
            "Demo data is already present".to_string(),
        ));
    }

    let customer = state
        .directory
        .register_customer(NewCustomer {
            name: "Alice Smith".into(),
            email: DEMO_CUSTOMER_EMAIL.into(),
            phone: Some("123-456-7890".into()),
        })
        .await?;
    let warehouse = state
        .directory
        .register_warehouse(NewWarehouse {
            name: "Central Warehouse".into(),
            location: "123 Main St".into(),
        })
        .await?;
    let route = state
        .directory
        .register_route(NewRoute {
            origin: "City A".into(),
            destination: "City B".into(),
            distance_km: Some(120.5),
        })
        .await?;
    let driver = state
        .directory
        .register_driver(NewDriver {
            name: "Bob Driver".into(),
            phone: Some("555-1234".into()),
            license_number: Some("LIC12345".into()),
        })
        .await?;
    let vehicle = state
        .directory
        .register_vehicle(NewVehicle {
            plate_number: "ABC-123".into(),
            vehicle_type: Some("Truck".into()),
            capacity: Some(1000),
        })
        .await?;
    let user = state
        .users
        .create_user(DEMO_ADMIN_USERNAME, admin_password, UserRole::Admin)
        .await?;

    let shipment = state
        .shipments
        .create_shipment(CreateShipmentCommand {
            customer_id: Some(customer.id),
            warehouse_id: Some(warehouse.id),
            route_id: Some(route.id),
            driver_id: Some(driver.id),
            vehicle_id: Some(vehicle.id),
            total_amount: dec!(250.00),
            estimated_delivery: None,
        })
        .await?;

    let mut inventory_ids = Vec::new();
    for (item_name, quantity) in [("Widget", 3), ("Pallet", 40)] {
        let item = state
            .inventory
            .stock_item(warehouse.id, item_name, quantity)
            .await?;
        inventory_ids.push(item.id);
    }

    info!(shipment_id = shipment.id, "Demo data seeded");

    Ok(SeedSummary {
        customer_id: customer.id,
        warehouse_id: warehouse.id,
        route_id: route.id,
        driver_id: driver.id,
        vehicle_id: vehicle.id,
        user_id: user.id,
        shipment_id: shipment.id,
        inventory_ids,
    })
}
