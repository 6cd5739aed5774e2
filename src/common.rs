/// Common types and utilities shared across services and commands
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Default page size for list queries
pub const DEFAULT_PAGE_SIZE: u64 = 50;

/// Largest page a caller may request
pub const MAX_PAGE_SIZE: u64 = 500;

/// Truncates a timestamp to the microsecond precision every supported store keeps.
pub fn normalize_timestamp(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.trunc_subsecs(6)
}

/// Current time at store precision
pub fn now() -> DateTime<Utc> {
    normalize_timestamp(Utc::now())
}

/// One-based pagination parameters for list queries
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Validate)]
pub struct Pagination {
    #[validate(range(min = 1, message = "Page numbers start at 1"))]
    pub page: u64,
    #[validate(range(min = 1, max = 500, message = "Page size must be between 1 and 500"))]
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    pub fn new(page: u64, limit: u64) -> Self {
        Self { page, limit }
    }

    /// Zero-based page index as expected by sea-orm paginators
    pub fn page_index(&self) -> u64 {
        self.page.saturating_sub(1)
    }
}
