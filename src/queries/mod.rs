use crate::errors::ServiceError;
use async_trait::async_trait;
use sea_orm::DatabaseConnection;

/// Trait representing a generic asynchronous query.
#[async_trait]
pub trait Query: Send + Sync {
    type Result: Send;

    /// Executes the query using the provided database pool.
    async fn execute(&self, db_pool: &DatabaseConnection) -> Result<Self::Result, ServiceError>;
}

pub mod inventory_queries;
pub mod shipment_queries;
pub mod status_history;
