//! Property-based tests for the shipment lifecycle and status history merge.
//!
//! These run against plain models, no database required.

use chrono::{Duration, TimeZone, Utc};
use logistics_tracking::{
    commands::shipments::create_shipment_command::CreateShipmentCommand,
    models::{shipment, shipment_status_history, tracking, ShipmentStatus},
    queries::status_history::StatusHistory,
};
use proptest::prelude::*;
use rust_decimal::Decimal;
use validator::Validate;

fn status_strategy() -> impl Strategy<Value = ShipmentStatus> {
    prop_oneof![
        Just(ShipmentStatus::Pending),
        Just(ShipmentStatus::InTransit),
        Just(ShipmentStatus::Delivered),
        Just(ShipmentStatus::Cancelled),
        Just(ShipmentStatus::Delayed),
    ]
}

fn pending_shipment() -> shipment::Model {
    let created = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
    shipment::Model {
        id: 1,
        customer_id: None,
        warehouse_id: None,
        route_id: None,
        driver_id: None,
        vehicle_id: None,
        status: ShipmentStatus::Pending,
        total_amount: Decimal::ZERO,
        created_at: created,
        updated_at: created,
        estimated_delivery: None,
    }
}

/// Applies each request in order the way the transition command does,
/// returning the accepted (status, minute) pairs.
fn replay(
    requests: &[(ShipmentStatus, i64)],
) -> (shipment::Model, Vec<(ShipmentStatus, chrono::DateTime<Utc>)>) {
    let mut model = pending_shipment();
    let mut accepted = Vec::new();
    let mut clock = model.created_at;
    for &(status, step) in requests {
        clock += Duration::minutes(step);
        if model.validate_transition(status, clock).is_ok() {
            model.status = status;
            model.updated_at = clock;
            accepted.push((status, clock));
        }
    }
    (model, accepted)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn accepted_transitions_follow_the_lifecycle(
        requests in prop::collection::vec((status_strategy(), 0i64..30), 0..20)
    ) {
        let (model, accepted) = replay(&requests);

        let mut previous = ShipmentStatus::Pending;
        let mut previous_at = model.created_at;
        for &(status, at) in &accepted {
            prop_assert!(previous.can_transition_to(status));
            prop_assert_ne!(previous, status);
            prop_assert!(at >= previous_at);
            previous = status;
            previous_at = at;
        }

        prop_assert_eq!(model.status, previous);
        prop_assert!(model.updated_at >= model.created_at);
        if let Some(pos) = accepted.iter().position(|(s, _)| s.is_terminal()) {
            prop_assert_eq!(pos, accepted.len() - 1, "nothing follows a terminal status");
        }
    }

    #[test]
    fn merged_history_has_one_event_per_transition(
        requests in prop::collection::vec((status_strategy(), 0i64..5), 0..20)
    ) {
        let (_, accepted) = replay(&requests);

        let mut trackings = Vec::new();
        let mut histories = Vec::new();
        for (i, &(status, timestamp)) in accepted.iter().enumerate() {
            let id = i as i32 + 1;
            trackings.push(tracking::Model {
                id,
                shipment_id: 1,
                status,
                location: Some(format!("hub {id}")),
                timestamp,
            });
            histories.push(shipment_status_history::Model {
                id,
                shipment_id: 1,
                status,
                timestamp,
            });
        }

        let merged: Vec<_> = StatusHistory::new(trackings, histories).collect();
        prop_assert_eq!(merged.len(), accepted.len());
        for (i, (event, (status, timestamp))) in merged.iter().zip(&accepted).enumerate() {
            prop_assert_eq!(event.status, *status);
            prop_assert_eq!(event.timestamp, *timestamp);
            prop_assert_eq!(event.location.clone(), Some(format!("hub {}", i + 1)));
        }
    }

    #[test]
    fn status_text_round_trips(status in status_strategy()) {
        prop_assert_eq!(ShipmentStatus::parse(&status.to_string()).unwrap(), status);
        prop_assert_eq!(
            ShipmentStatus::parse(&format!("  {}\t", status)).unwrap(),
            status
        );
    }

    #[test]
    fn unknown_status_text_is_rejected(s in "[a-z_]{1,12}") {
        let known = ["pending", "in_transit", "delivered", "cancelled", "delayed"];
        if !known.contains(&s.as_str()) {
            prop_assert!(ShipmentStatus::parse(&s).is_err());
        }
    }

    #[test]
    fn two_decimal_amounts_are_accepted(cents in 0i64..999_999_999_999) {
        let command = CreateShipmentCommand {
            total_amount: Decimal::new(cents, 2),
            ..Default::default()
        };
        prop_assert!(command.validate().is_ok());
    }

    #[test]
    fn negative_amounts_are_rejected(cents in -1_000_000i64..0) {
        let command = CreateShipmentCommand {
            total_amount: Decimal::new(cents, 2),
            ..Default::default()
        };
        prop_assert!(command.validate().is_err());
    }
}
