use crate::{
    db::DbPool,
    errors::ServiceError,
    models::{customer, driver, route, vehicle, warehouse},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewCustomer {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email, length(max = 100))]
    pub email: String,
    #[validate(length(min = 1, max = 20))]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewWarehouse {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 200))]
    pub location: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewRoute {
    #[validate(length(min = 1, max = 200))]
    pub origin: String,
    #[validate(length(min = 1, max = 200))]
    pub destination: String,
    #[validate(custom = "validate_distance")]
    pub distance_km: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewDriver {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 20))]
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub license_number: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewVehicle {
    #[validate(length(min = 1, max = 20))]
    pub plate_number: String,
    #[validate(length(min = 1, max = 50))]
    pub vehicle_type: Option<String>,
    #[validate(range(min = 0))]
    pub capacity: Option<i32>,
}

fn validate_distance(distance: f64) -> Result<(), ValidationError> {
    if distance.is_finite() && distance >= 0.0 {
        Ok(())
    } else {
        let mut err = ValidationError::new("distance");
        err.message = Some("distance_km must be a finite, non-negative number".into());
        Err(err)
    }
}

/// Registration and lookup of the entities shipments reference
#[derive(Clone)]
pub struct DirectoryService {
    db_pool: Arc<DbPool>,
}

impl DirectoryService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn register_customer(&self, input: NewCustomer) -> Result<customer::Model, ServiceError> {
        input.validate()?;
        let email = input.email.trim().to_string();

        if self.find_customer_by_email(&email).await?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Customer with email {} already exists",
                email
            )));
        }

        let customer = customer::ActiveModel {
            name: Set(input.name),
            email: Set(email),
            phone: Set(input.phone),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await
        .map_err(ServiceError::db_error)?;

        info!(customer_id = customer.id, "Customer registered");
        Ok(customer)
    }

    #[instrument(skip(self))]
    pub async fn register_warehouse(&self, input: NewWarehouse) -> Result<warehouse::Model, ServiceError> {
        input.validate()?;

        let warehouse = warehouse::ActiveModel {
            name: Set(input.name),
            location: Set(input.location),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await
        .map_err(ServiceError::db_error)?;

        info!(warehouse_id = warehouse.id, "Warehouse registered");
        Ok(warehouse)
    }

    #[instrument(skip(self))]
    pub async fn register_route(&self, input: NewRoute) -> Result<route::Model, ServiceError> {
        input.validate()?;

        let route = route::ActiveModel {
            origin: Set(input.origin),
            destination: Set(input.destination),
            distance_km: Set(input.distance_km),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await
        .map_err(ServiceError::db_error)?;

        info!(route_id = route.id, "Route registered");
        Ok(route)
    }

    #[instrument(skip(self))]
    pub async fn register_driver(&self, input: NewDriver) -> Result<driver::Model, ServiceError> {
        input.validate()?;

        if let Some(license) = &input.license_number {
            let taken = driver::Entity::find()
                .filter(driver::Column::LicenseNumber.eq(license.as_str()))
                .one(&*self.db_pool)
                .await
                .map_err(ServiceError::db_error)?;
            if taken.is_some() {
                return Err(ServiceError::Conflict(format!(
                    "Driver with license {} already exists",
                    license
                )));
            }
        }

        let driver = driver::ActiveModel {
            name: Set(input.name),
            phone: Set(input.phone),
            license_number: Set(input.license_number),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await
        .map_err(ServiceError::db_error)?;

        info!(driver_id = driver.id, "Driver registered");
        Ok(driver)
    }

    #[instrument(skip(self))]
    pub async fn register_vehicle(&self, input: NewVehicle) -> Result<vehicle::Model, ServiceError> {
        input.validate()?;

        let taken = vehicle::Entity::find()
            .filter(vehicle::Column::PlateNumber.eq(input.plate_number.as_str()))
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?;
        if taken.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Vehicle with plate {} already exists",
                input.plate_number
            )));
        }

        let vehicle = vehicle::ActiveModel {
            plate_number: Set(input.plate_number),
            vehicle_type: Set(input.vehicle_type),
            capacity: Set(input.capacity),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await
        .map_err(ServiceError::db_error)?;

        info!(vehicle_id = vehicle.id, "Vehicle registered");
        Ok(vehicle)
    }

    pub async fn get_customer(&self, id: i32) -> Result<Option<customer::Model>, ServiceError> {
        customer::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)
    }

    pub async fn find_customer_by_email(
        &self,
        email: &str,
    ) -> Result<Option<customer::Model>, ServiceError> {
        customer::Entity::find()
            .filter(customer::Column::Email.eq(email.trim()))
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)
    }

    pub async fn get_warehouse(&self, id: i32) -> Result<Option<warehouse::Model>, ServiceError> {
        warehouse::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)
    }

    pub async fn get_route(&self, id: i32) -> Result<Option<route::Model>, ServiceError> {
        route::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)
    }

    pub async fn get_driver(&self, id: i32) -> Result<Option<driver::Model>, ServiceError> {
        driver::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)
    }

    pub async fn get_vehicle(&self, id: i32) -> Result<Option<vehicle::Model>, ServiceError> {
        vehicle::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn customer_email_must_be_valid() {
        let customer = NewCustomer {
            name: "Alice Smith".into(),
            email: "alice@example.com".into(),
            phone: Some("123-456-7890".into()),
        };
        assert!(customer.validate().is_ok());

        let bad = NewCustomer {
            email: "not-an-email".into(),
            ..customer
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn route_distance_must_be_non_negative() {
        let route = NewRoute {
            origin: "City A".into(),
            destination: "City B".into(),
            distance_km: Some(120.5),
        };
        assert!(route.validate().is_ok());
        assert!(NewRoute {
            distance_km: None,
            ..route.clone()
        }
        .validate()
        .is_ok());
        assert!(NewRoute {
            distance_km: Some(-1.0),
            ..route.clone()
        }
        .validate()
        .is_err());
        assert!(NewRoute {
            distance_km: Some(f64::NAN),
            ..route
        }
        .validate()
        .is_err());
    }

    #[test]
    fn vehicle_capacity_and_plate_bounds() {
        let vehicle = NewVehicle {
            plate_number: "ABC-123".into(),
            vehicle_type: Some("Truck".into()),
            capacity: Some(1000),
        };
        assert!(vehicle.validate().is_ok());
        assert!(NewVehicle {
            capacity: Some(-5),
            ..vehicle.clone()
        }
        .validate()
        .is_err());
        assert!(NewVehicle {
            plate_number: "X".repeat(21),
            ..vehicle
        }
        .validate()
        .is_err());
    }
}
