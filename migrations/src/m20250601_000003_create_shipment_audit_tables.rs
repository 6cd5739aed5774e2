use sea_orm_migration::prelude::*;

use super::m20250601_000002_create_shipments_table::Shipments;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Located tracking observations
        manager
            .create_table(
                Table::create()
                    .table(Trackings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Trackings::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Trackings::ShipmentId).integer().not_null())
                    .col(ColumnDef::new(Trackings::Status).string_len(50).not_null())
                    .col(ColumnDef::new(Trackings::Location).string_len(200).null())
                    .col(
                        ColumnDef::new(Trackings::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trackings_shipment_id")
                            .from(Trackings::Table, Trackings::ShipmentId)
                            .to(Shipments::Table, Shipments::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Status change audit trail
        manager
            .create_table(
                Table::create()
                    .table(ShipmentStatusHistories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ShipmentStatusHistories::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ShipmentStatusHistories::ShipmentId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ShipmentStatusHistories::Status)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ShipmentStatusHistories::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shipment_status_histories_shipment_id")
                            .from(
                                ShipmentStatusHistories::Table,
                                ShipmentStatusHistories::ShipmentId,
                            )
                            .to(Shipments::Table, Shipments::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(ShipmentStatusHistories::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(Trackings::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Trackings {
    Table,
    Id,
    ShipmentId,
    Status,
    Location,
    Timestamp,
}

#[derive(DeriveIden)]
pub enum ShipmentStatusHistories {
    Table,
    Id,
    ShipmentId,
    Status,
    Timestamp,
}
