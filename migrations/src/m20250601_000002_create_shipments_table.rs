use sea_orm_migration::prelude::*;

use super::m20250601_000001_create_directory_tables::{
    Customers, Drivers, Routes, Vehicles, Warehouses,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Shipments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Shipments::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Shipments::CustomerId).integer().null())
                    .col(ColumnDef::new(Shipments::WarehouseId).integer().null())
                    .col(ColumnDef::new(Shipments::RouteId).integer().null())
                    .col(ColumnDef::new(Shipments::DriverId).integer().null())
                    .col(ColumnDef::new(Shipments::VehicleId).integer().null())
                    .col(
                        ColumnDef::new(Shipments::Status)
                            .string_len(50)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Shipments::TotalAmount)
                            .decimal_len(12, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Shipments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Shipments::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Shipments::EstimatedDelivery)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shipments_customer_id")
                            .from(Shipments::Table, Shipments::CustomerId)
                            .to(Customers::Table, Customers::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shipments_warehouse_id")
                            .from(Shipments::Table, Shipments::WarehouseId)
                            .to(Warehouses::Table, Warehouses::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shipments_route_id")
                            .from(Shipments::Table, Shipments::RouteId)
                            .to(Routes::Table, Routes::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shipments_driver_id")
                            .from(Shipments::Table, Shipments::DriverId)
                            .to(Drivers::Table, Drivers::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shipments_vehicle_id")
                            .from(Shipments::Table, Shipments::VehicleId)
                            .to(Vehicles::Table, Vehicles::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Shipments::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Shipments {
    Table,
    Id,
    CustomerId,
    WarehouseId,
    RouteId,
    DriverId,
    VehicleId,
    Status,
    TotalAmount,
    CreatedAt,
    UpdatedAt,
    EstimatedDelivery,
}
