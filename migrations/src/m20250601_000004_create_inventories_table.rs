use sea_orm_migration::prelude::*;

use super::m20250601_000001_create_directory_tables::Warehouses;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Inventories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Inventories::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Inventories::WarehouseId).integer().not_null())
                    .col(
                        ColumnDef::new(Inventories::ItemName)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Inventories::Quantity)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Inventories::LastUpdated)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_inventories_warehouse_id")
                            .from(Inventories::Table, Inventories::WarehouseId)
                            .to(Warehouses::Table, Warehouses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One row per item in each warehouse
        manager
            .create_index(
                Index::create()
                    .name("idx_inventories_warehouse_item")
                    .table(Inventories::Table)
                    .col(Inventories::WarehouseId)
                    .col(Inventories::ItemName)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Inventories::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Inventories {
    Table,
    Id,
    WarehouseId,
    ItemName,
    Quantity,
    LastUpdated,
}
