/*!
 * Transaction Helper Utilities
 *
 * Every mutating unit of work runs inside one sea-orm closure transaction,
 * which commits on `Ok`, rolls back on `Err` and releases its connection on
 * every exit path. Transient failures replay the whole closure.
 */

use super::retry::{with_retry, RetryConfig, TransientErrors};
use crate::errors::ServiceError;
use futures::future::BoxFuture;
use metrics::{counter, histogram};
use sea_orm::{ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbBackend, TransactionTrait};
use std::time::Instant;
use tracing::{debug, warn};

/// Runs `f` in a transaction, retrying the whole transaction on transient errors.
///
/// `f` may be invoked more than once, so it must rebuild any owned state it
/// moves into its future.
///
/// # Example
///
/// ```rust,ignore
/// let shipment = with_transaction(&db, &retry, "transition_status", |txn| {
///     let location = location.clone();
///     Box::pin(async move { apply_transition(txn, id, next, location, at).await })
/// })
/// .await?;
/// ```
pub async fn with_transaction<F, T>(
    db: &DatabaseConnection,
    retry: &RetryConfig,
    operation: &'static str,
    f: F,
) -> Result<T, ServiceError>
where
    F: for<'c> Fn(&'c DatabaseTransaction) -> BoxFuture<'c, Result<T, ServiceError>> + Send + Sync,
    T: Send,
{
    let f = &f;
    with_retry(retry, TransientErrors, || async move {
        run_once(db, operation, f).await
    })
    .await
}

/// SQLite has no `SELECT ... FOR UPDATE`; it serializes writers per database instead.
pub fn supports_row_locks<C: ConnectionTrait>(conn: &C) -> bool {
    conn.get_database_backend() != DbBackend::Sqlite
}

async fn run_once<F, T>(
    db: &DatabaseConnection,
    operation: &'static str,
    f: &F,
) -> Result<T, ServiceError>
where
    F: for<'c> Fn(&'c DatabaseTransaction) -> BoxFuture<'c, Result<T, ServiceError>> + Send + Sync,
    T: Send,
{
    let start = Instant::now();
    debug!(operation, "Starting database transaction");

    let result = db
        .transaction::<_, T, ServiceError>(|txn| f(txn))
        .await
        .map_err(ServiceError::from);

    let elapsed = start.elapsed();
    histogram!("logistics_db.transaction.duration", elapsed, "operation" => operation);

    match &result {
        Ok(_) => {
            counter!("logistics_db.transaction.committed", 1, "operation" => operation);
            debug!(operation, "Transaction committed in {:?}", elapsed);
        }
        Err(e) => {
            counter!("logistics_db.transaction.rolled_back", 1, "operation" => operation);
            warn!(operation, error = %e, "Transaction rolled back after {:?}", elapsed);
        }
    }

    result
}
