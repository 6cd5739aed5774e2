pub use sea_orm_migration::prelude::*;

mod m20250601_000001_create_directory_tables;
mod m20250601_000002_create_shipments_table;
mod m20250601_000003_create_shipment_audit_tables;
mod m20250601_000004_create_inventories_table;
mod m20250601_000005_create_users_table;
mod m20250601_000006_add_shipment_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_directory_tables::Migration),
            Box::new(m20250601_000002_create_shipments_table::Migration),
            Box::new(m20250601_000003_create_shipment_audit_tables::Migration),
            Box::new(m20250601_000004_create_inventories_table::Migration),
            Box::new(m20250601_000005_create_users_table::Migration),
            Box::new(m20250601_000006_add_shipment_indexes::Migration),
        ]
    }
}
