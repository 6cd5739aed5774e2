mod common;

use assert_matches::assert_matches;
use common::TestApp;
use logistics_tracking::errors::ServiceError;
use rstest::rstest;

#[tokio::test]
async fn overdrawing_stock_leaves_quantity_untouched() {
    let app = TestApp::new().await;
    let directory = app.directory("inv").await;
    let inventory = &app.state.inventory;
    let warehouse_id = directory.warehouse.id;

    inventory.stock_item(warehouse_id, "Widget", 3).await.unwrap();

    let result = inventory.adjust_quantity(warehouse_id, "Widget", -5).await;
    assert_matches!(
        result,
        Err(ServiceError::InsufficientStock {
            available: 3,
            requested: -5,
            ..
        })
    );

    let item = inventory
        .get_item(warehouse_id, "Widget")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(item.quantity, 3);
}

#[rstest]
#[case(3, 4, 7)]
#[case(3, -3, 0)]
#[case(0, 0, 0)]
#[case(40, -15, 25)]
#[tokio::test]
async fn adjustments_apply_the_delta(#[case] initial: i32, #[case] delta: i32, #[case] expected: i32) {
    let app = TestApp::new().await;
    let directory = app.directory("delta").await;
    let inventory = &app.state.inventory;
    let warehouse_id = directory.warehouse.id;

    let stocked = inventory
        .stock_item(warehouse_id, "Pallet", initial)
        .await
        .unwrap();

    let quantity = inventory
        .adjust_quantity(warehouse_id, "Pallet", delta)
        .await
        .unwrap();
    assert_eq!(quantity, expected);

    let item = inventory
        .get_item(warehouse_id, "Pallet")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(item.id, stocked.id);
    assert_eq!(item.quantity, expected);
    assert!(item.last_updated >= stocked.last_updated);
}

#[tokio::test]
async fn unknown_item_is_not_found() {
    let app = TestApp::new().await;
    let directory = app.directory("nf").await;

    assert_matches!(
        app.state
            .inventory
            .adjust_quantity(directory.warehouse.id, "Gadget", 1)
            .await,
        Err(ServiceError::NotFound(_))
    );
    assert!(app
        .state
        .inventory
        .get_item(directory.warehouse.id, "Gadget")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn overflowing_adjustment_is_rejected() {
    let app = TestApp::new().await;
    let directory = app.directory("ovf").await;
    let inventory = &app.state.inventory;

    inventory
        .stock_item(directory.warehouse.id, "Widget", i32::MAX - 1)
        .await
        .unwrap();
    assert_matches!(
        inventory
            .adjust_quantity(directory.warehouse.id, "Widget", 2)
            .await,
        Err(ServiceError::ValidationError(_))
    );
}

#[tokio::test]
async fn stocking_rules() {
    let app = TestApp::new().await;
    let directory = app.directory("stock").await;
    let other = app.directory("stock-2").await;
    let inventory = &app.state.inventory;

    inventory
        .stock_item(directory.warehouse.id, "Widget", 3)
        .await
        .unwrap();

    assert_matches!(
        inventory
            .stock_item(directory.warehouse.id, "Widget", 1)
            .await,
        Err(ServiceError::Conflict(_))
    );
    assert_matches!(
        inventory.stock_item(9999, "Widget", 1).await,
        Err(ServiceError::InvalidReference {
            entity: "warehouse",
            id: 9999
        })
    );
    assert_matches!(
        inventory.stock_item(directory.warehouse.id, "Crate", -1).await,
        Err(ServiceError::ValidationError(_))
    );

    // the same item may be stocked in another warehouse
    inventory
        .stock_item(other.warehouse.id, "Widget", 10)
        .await
        .unwrap();

    inventory
        .stock_item(directory.warehouse.id, "Bolt", 100)
        .await
        .unwrap();
    let names: Vec<_> = inventory
        .list_for_warehouse(directory.warehouse.id)
        .await
        .unwrap()
        .into_iter()
        .map(|i| i.item_name)
        .collect();
    assert_eq!(names, vec!["Bolt".to_string(), "Widget".to_string()]);
}
