//! Store Errors
//!
//! Error types for storage operations.

use uuid::Uuid;

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in the store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Optimistic concurrency conflict
    #[error("Concurrency conflict for {entity} {id}: expected version {expected}")]
    Conflict {
        entity: &'static str,
        id: Uuid,
        expected: i64,
    },

    /// Record referenced by a write does not exist
    #[error("{entity} not found: {id}")]
    Missing { entity: &'static str, id: Uuid },

    /// Unique field already in use
    #[error("Duplicate value for {0}")]
    Duplicate(&'static str),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Stored row could not be turned back into a domain value
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

