use crate::{
    db::{supports_row_locks, DbPool, RetryConfig},
    errors::ServiceError,
    events::EventSender,
};
use async_trait::async_trait;
use sea_orm::{DatabaseTransaction, EntityTrait, PrimaryKeyTrait, QuerySelect};
use std::sync::Arc;

/// Command trait for implementing the Command Pattern
///
/// A command carries everything one business operation needs, validates
/// itself, runs as one retried transaction and publishes its domain events
/// once the transaction has committed.
#[async_trait]
pub trait Command: Send + Sync {
    /// The return type of the command when executed successfully
    type Result;

    /// Execute the command with the given dependencies
    ///
    /// # Arguments
    /// * `db_pool` - Database connection pool for persistence operations
    /// * `event_sender` - Channel to publish domain events
    /// * `retry` - Backoff policy for transient store failures
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        retry: &RetryConfig,
    ) -> Result<Self::Result, ServiceError>;
}

/// Fails with `InvalidReference` when a supplied id has no row.
///
/// On backends with row locks the referenced row is share-locked until the
/// transaction ends, so it cannot be deleted before the dependent insert.
pub(crate) async fn ensure_exists<E>(
    txn: &DatabaseTransaction,
    entity: &'static str,
    id: Option<i32>,
) -> Result<(), ServiceError>
where
    E: EntityTrait,
    i32: Into<<E::PrimaryKey as PrimaryKeyTrait>::ValueType>,
{
    let Some(id) = id else {
        return Ok(());
    };

    let mut query = E::find_by_id(id);
    if supports_row_locks(txn) {
        query = query.lock_shared();
    }
    let found = query
        .one(txn)
        .await
        .map_err(ServiceError::db_error)?;

    match found {
        Some(_) => Ok(()),
        None => Err(ServiceError::InvalidReference { entity, id }),
    }
}

pub mod inventory;
pub mod shipments;
