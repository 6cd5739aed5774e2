use sea_orm_migration::prelude::*;

use super::m20250601_000002_create_shipments_table::Shipments;
use super::m20250601_000003_create_shipment_audit_tables::{ShipmentStatusHistories, Trackings};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Status history reads walk both audit tables in time order
        manager
            .create_index(
                Index::create()
                    .name("idx_trackings_shipment_timestamp")
                    .table(Trackings::Table)
                    .col(Trackings::ShipmentId)
                    .col(Trackings::Timestamp)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_shipment_status_histories_shipment_timestamp")
                    .table(ShipmentStatusHistories::Table)
                    .col(ShipmentStatusHistories::ShipmentId)
                    .col(ShipmentStatusHistories::Timestamp)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_shipments_status_created")
                    .table(Shipments::Table)
                    .col(Shipments::Status)
                    .col((Shipments::CreatedAt, IndexOrder::Desc))
                    .to_owned(),
            )
            .await?;

        // Driver exclusivity check filters on driver and status
        manager
            .create_index(
                Index::create()
                    .name("idx_shipments_driver_status")
                    .table(Shipments::Table)
                    .col(Shipments::DriverId)
                    .col(Shipments::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_shipments_customer_id")
                    .table(Shipments::Table)
                    .col(Shipments::CustomerId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_shipments_customer_id")
                    .table(Shipments::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_shipments_driver_status")
                    .table(Shipments::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_shipments_status_created")
                    .table(Shipments::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_shipment_status_histories_shipment_timestamp")
                    .table(ShipmentStatusHistories::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_trackings_shipment_timestamp")
                    .table(Trackings::Table)
                    .to_owned(),
            )
            .await
    }
}
