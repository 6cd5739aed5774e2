use crate::errors::ServiceError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Shipment status enumeration
///
/// Lifecycle:
///
/// ```text
/// pending    -> in_transit, cancelled
/// in_transit -> delivered, delayed, cancelled
/// delayed    -> in_transit, cancelled
/// delivered, cancelled: terminal
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    DeriveActiveEnum,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ShipmentStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "in_transit")]
    InTransit,
    #[sea_orm(string_value = "delivered")]
    Delivered,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    #[sea_orm(string_value = "delayed")]
    Delayed,
}

impl Default for ShipmentStatus {
    fn default() -> Self {
        ShipmentStatus::Pending
    }
}

impl ShipmentStatus {
    /// Statuses reachable in one step from `self`.
    pub fn allowed_transitions(self) -> &'static [ShipmentStatus] {
        use ShipmentStatus::*;
        match self {
            Pending => &[InTransit, Cancelled],
            InTransit => &[Delivered, Delayed, Cancelled],
            Delayed => &[InTransit, Cancelled],
            Delivered | Cancelled => &[],
        }
    }

    /// Re-entering the current status is never allowed.
    pub fn can_transition_to(self, next: ShipmentStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }

    pub fn is_terminal(self) -> bool {
        self.allowed_transitions().is_empty()
    }

    pub fn terminal_statuses() -> [ShipmentStatus; 2] {
        [ShipmentStatus::Delivered, ShipmentStatus::Cancelled]
    }

    /// Parses an external status string, rejecting anything outside the lifecycle.
    pub fn parse(input: &str) -> Result<Self, ServiceError> {
        input.trim().parse().map_err(|_| {
            ServiceError::ValidationError(format!(
                "Unknown shipment status '{}', expected one of: pending, in_transit, delivered, cancelled, delayed",
                input
            ))
        })
    }
}

/// Shipment entity model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "shipments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub customer_id: Option<i32>,

    pub warehouse_id: Option<i32>,

    pub route_id: Option<i32>,

    pub driver_id: Option<i32>,

    pub vehicle_id: Option<i32>,

    pub status: ShipmentStatus,

    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub total_amount: Decimal,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    pub estimated_delivery: Option<DateTime<Utc>>,
}

/// Database relations
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id"
    )]
    Customer,

    #[sea_orm(
        belongs_to = "super::warehouse::Entity",
        from = "Column::WarehouseId",
        to = "super::warehouse::Column::Id"
    )]
    Warehouse,

    #[sea_orm(
        belongs_to = "super::route::Entity",
        from = "Column::RouteId",
        to = "super::route::Column::Id"
    )]
    Route,

    #[sea_orm(
        belongs_to = "super::driver::Entity",
        from = "Column::DriverId",
        to = "super::driver::Column::Id"
    )]
    Driver,

    #[sea_orm(
        belongs_to = "super::vehicle::Entity",
        from = "Column::VehicleId",
        to = "super::vehicle::Column::Id"
    )]
    Vehicle,

    #[sea_orm(has_many = "super::tracking::Entity")]
    Trackings,

    #[sea_orm(has_many = "super::shipment_status_history::Entity")]
    StatusHistories,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::warehouse::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Warehouse.def()
    }
}

impl Related<super::route::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Route.def()
    }
}

impl Related<super::driver::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Driver.def()
    }
}

impl Related<super::vehicle::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vehicle.def()
    }
}

impl Related<super::tracking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Trackings.def()
    }
}

impl Related<super::shipment_status_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StatusHistories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Checks that moving to `next` at `at` keeps the lifecycle invariants.
    ///
    /// The status must be reachable per [`ShipmentStatus::allowed_transitions`],
    /// and `at` may precede neither `created_at` nor the last mutation.
    pub fn validate_transition(
        &self,
        next: ShipmentStatus,
        at: DateTime<Utc>,
    ) -> Result<(), ServiceError> {
        if !self.status.can_transition_to(next) {
            return Err(ServiceError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }

        if at < self.created_at {
            return Err(ServiceError::ValidationError(format!(
                "Transition timestamp {} precedes shipment {} creation at {}",
                at, self.id, self.created_at
            )));
        }

        if at < self.updated_at {
            return Err(ServiceError::ValidationError(format!(
                "Transition timestamp {} precedes last update of shipment {} at {}",
                at, self.id, self.updated_at
            )));
        }

        Ok(())
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Estimated delivery has passed while the shipment is still open
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        match self.estimated_delivery {
            Some(estimated) => !self.is_terminal() && now > estimated,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{Duration, TimeZone};
    use rstest::rstest;
    use sea_orm::Iterable;
    use std::str::FromStr;
    use ShipmentStatus::*;

    fn shipment(status: ShipmentStatus) -> Model {
        let created = Utc.with_ymd_and_hms(2025, 1, 10, 8, 0, 0).unwrap();
        Model {
            id: 1,
            customer_id: None,
            warehouse_id: None,
            route_id: None,
            driver_id: None,
            vehicle_id: None,
            status,
            total_amount: Decimal::new(12_500, 2),
            created_at: created,
            updated_at: created + Duration::hours(1),
            estimated_delivery: Some(created + Duration::days(2)),
        }
    }

    #[rstest]
    #[case(Pending, InTransit, true)]
    #[case(Pending, Cancelled, true)]
    #[case(Pending, Delivered, false)]
    #[case(Pending, Delayed, false)]
    #[case(InTransit, Delivered, true)]
    #[case(InTransit, Delayed, true)]
    #[case(InTransit, Cancelled, true)]
    #[case(InTransit, Pending, false)]
    #[case(Delayed, InTransit, true)]
    #[case(Delayed, Cancelled, true)]
    #[case(Delayed, Delivered, false)]
    #[case(Delivered, Cancelled, false)]
    #[case(Delivered, InTransit, false)]
    #[case(Cancelled, Pending, false)]
    fn transition_table(
        #[case] from: ShipmentStatus,
        #[case] to: ShipmentStatus,
        #[case] allowed: bool,
    ) {
        assert_eq!(from.can_transition_to(to), allowed);
    }

    #[rstest]
    #[case(Pending)]
    #[case(InTransit)]
    #[case(Delayed)]
    #[case(Delivered)]
    #[case(Cancelled)]
    fn same_state_is_rejected(#[case] status: ShipmentStatus) {
        assert!(!status.can_transition_to(status));
    }

    #[test]
    fn only_delivered_and_cancelled_are_terminal() {
        for status in ShipmentStatus::iter() {
            assert_eq!(
                status.is_terminal(),
                ShipmentStatus::terminal_statuses().contains(&status),
                "{status}"
            );
        }
    }

    #[test]
    fn status_strings_round_trip() {
        for status in ShipmentStatus::iter() {
            assert_eq!(ShipmentStatus::from_str(status.as_ref()).unwrap(), status);
        }
        assert_eq!(ShipmentStatus::from_str("in_transit").unwrap(), InTransit);
        assert!(ShipmentStatus::from_str("lost").is_err());
        assert_eq!(ShipmentStatus::default(), Pending);
        assert_eq!(ShipmentStatus::parse(" delayed ").unwrap(), Delayed);
        assert_matches!(
            ShipmentStatus::parse("In Transit"),
            Err(ServiceError::ValidationError(_))
        );
    }

    #[test]
    fn validate_transition_rejects_illegal_status() {
        let model = shipment(Delivered);
        let at = model.updated_at + Duration::minutes(1);
        assert_matches!(
            model.validate_transition(Cancelled, at),
            Err(ServiceError::InvalidTransition {
                from: Delivered,
                to: Cancelled
            })
        );
    }

    #[test]
    fn validate_transition_rejects_backdated_timestamps() {
        let model = shipment(Pending);
        assert_matches!(
            model.validate_transition(InTransit, model.created_at - Duration::seconds(1)),
            Err(ServiceError::ValidationError(_))
        );
        assert_matches!(
            model.validate_transition(InTransit, model.updated_at - Duration::seconds(1)),
            Err(ServiceError::ValidationError(_))
        );
        assert!(model.validate_transition(InTransit, model.updated_at).is_ok());
    }

    #[test]
    fn overdue_only_while_open() {
        let open = shipment(InTransit);
        let late = open.estimated_delivery.unwrap() + Duration::hours(1);
        assert!(open.is_overdue(late));
        assert!(!open.is_overdue(open.created_at));
        assert!(!shipment(Delivered).is_overdue(late));
    }
}
