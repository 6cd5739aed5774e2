use crate::models::shipment::ShipmentStatus;
use sea_orm::error::{DbErr, SqlErr};
use sea_orm::TransactionError;
use serde::Serialize;

/// Substrings of driver messages that mark a failure as worth retrying.
const TRANSIENT_DB_MARKERS: &[&str] = &[
    "deadlock",
    "lock timeout",
    "lock wait timeout",
    "could not serialize",
    "database is locked",
    "database table is locked",
    "connection reset",
    "broken pipe",
];

#[derive(Debug, thiserror::Error, Serialize)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(
        #[from]
        #[serde(skip)]
        DbErr,
    ),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid reference: {entity} {id} does not exist")]
    InvalidReference { entity: &'static str, id: i32 },

    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        from: ShipmentStatus,
        to: ShipmentStatus,
    },

    #[error("Insufficient stock for '{item_name}': {available} on hand, change of {requested}")]
    InsufficientStock {
        item_name: String,
        available: i32,
        requested: i32,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Concurrent modification of {entity} {id}")]
    ConcurrentModification { entity: &'static str, id: i32 },

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Hash error: {0}")]
    HashError(String),

    #[error("Event error: {0}")]
    EventError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl From<TransactionError<ServiceError>> for ServiceError {
    fn from(err: TransactionError<ServiceError>) -> Self {
        match err {
            TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
            TransactionError::Transaction(service_err) => service_err,
        }
    }
}

impl ServiceError {
    /// Normalizes a store error, surfacing constraint violations as domain errors.
    pub fn db_error(error: DbErr) -> Self {
        match error.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg)) => ServiceError::Conflict(msg),
            Some(SqlErr::ForeignKeyConstraintViolation(msg)) => {
                ServiceError::ValidationError(format!("foreign key violation: {}", msg))
            }
            _ => ServiceError::DatabaseError(error),
        }
    }

    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        ServiceError::NotFound(format!("{} {} not found", entity, id))
    }

    /// Whether repeating the whole unit of work may succeed.
    ///
    /// Connection loss, pool exhaustion, deadlocks, lock timeouts and lost
    /// compare-and-set races are transient. Domain errors never are: replaying
    /// an invalid transition would fail the same way.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::DatabaseError(err) => db_err_is_transient(err),
            Self::ConcurrentModification { .. } => true,
            _ => false,
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::DatabaseError(_) => "database_error",
            Self::NotFound(_) => "not_found",
            Self::InvalidReference { .. } => "invalid_reference",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::InsufficientStock { .. } => "insufficient_stock",
            Self::ValidationError(_) => "validation_error",
            Self::Conflict(_) => "conflict",
            Self::ConcurrentModification { .. } => "concurrent_modification",
            Self::AuthError(_) => "authentication_failed",
            Self::HashError(_) | Self::EventError(_) | Self::InternalError(_) => "internal_error",
        }
    }
}

fn db_err_is_transient(err: &DbErr) -> bool {
    match err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => true,
        DbErr::Exec(runtime) | DbErr::Query(runtime) => {
            let message = runtime.to_string().to_lowercase();
            TRANSIENT_DB_MARKERS
                .iter()
                .any(|marker| message.contains(marker))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::error::{ConnAcquireErr, RuntimeErr};

    #[test]
    fn domain_errors_are_not_transient() {
        let invalid = ServiceError::InvalidTransition {
            from: ShipmentStatus::Delivered,
            to: ShipmentStatus::Cancelled,
        };
        assert!(!invalid.is_transient());
        assert!(!ServiceError::NotFound("x".into()).is_transient());
        assert!(!ServiceError::InvalidReference {
            entity: "customer",
            id: 7
        }
        .is_transient());
        assert!(!ServiceError::InsufficientStock {
            item_name: "Widget".into(),
            available: 3,
            requested: -5
        }
        .is_transient());
    }

    #[test]
    fn connection_and_lock_failures_are_transient() {
        assert!(ServiceError::DatabaseError(DbErr::ConnectionAcquire(ConnAcquireErr::Timeout))
            .is_transient());
        assert!(ServiceError::DatabaseError(DbErr::Exec(RuntimeErr::Internal(
            "ERROR: deadlock detected".into()
        )))
        .is_transient());
        assert!(ServiceError::DatabaseError(DbErr::Query(RuntimeErr::Internal(
            "database is locked".into()
        )))
        .is_transient());
        assert!(ServiceError::ConcurrentModification {
            entity: "shipment",
            id: 1
        }
        .is_transient());
    }

    #[test]
    fn constraint_errors_are_permanent() {
        assert!(!ServiceError::DatabaseError(DbErr::Exec(RuntimeErr::Internal(
            "syntax error at or near".into()
        )))
        .is_transient());
        assert!(!ServiceError::DatabaseError(DbErr::RecordNotFound("gone".into())).is_transient());
    }

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(
            ServiceError::InvalidTransition {
                from: ShipmentStatus::Pending,
                to: ShipmentStatus::Delivered
            }
            .code(),
            "invalid_transition"
        );
        assert_eq!(
            ServiceError::InvalidReference {
                entity: "route",
                id: 3
            }
            .code(),
            "invalid_reference"
        );
        assert_eq!(ServiceError::not_found("shipment", 9).code(), "not_found");
        assert_eq!(ServiceError::Conflict("dup".into()).code(), "conflict");
    }

    #[test]
    fn messages_name_both_states() {
        let err = ServiceError::InvalidTransition {
            from: ShipmentStatus::InTransit,
            to: ShipmentStatus::Pending,
        };
        assert_eq!(
            err.to_string(),
            "Invalid status transition from in_transit to pending"
        );
        assert_eq!(
            ServiceError::not_found("shipment", 42).to_string(),
            "Not found: shipment 42 not found"
        );
    }

    #[test]
    fn transaction_errors_unwrap_to_service_errors() {
        let inner = ServiceError::Conflict("taken".into());
        let err: ServiceError = TransactionError::Transaction(inner).into();
        assert!(matches!(err, ServiceError::Conflict(_)));

        let err: ServiceError =
            TransactionError::<ServiceError>::Connection(DbErr::Conn(RuntimeErr::Internal(
                "connection reset by peer".into(),
            )))
            .into();
        assert!(err.is_transient());
    }
}
