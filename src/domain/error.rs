//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use thiserror::Error;

use super::WeddingStatus;

/// Domain-specific errors
///
/// These errors represent business rule violations and domain invariant failures.
/// They are independent of the web/infrastructure layer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Balance is below the credits a publish or upgrade needs
    #[error("Insufficient credits. Required: {required}, Available: {available}")]
    InsufficientCredits { required: i64, available: i64 },

    /// Invalid credit amount (zero or negative)
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Publish attempted before a design was selected
    #[error("Please select a design before publishing")]
    DesignRequired,

    /// Re-publish of a wedding that is already live
    #[error("Wedding is already published")]
    AlreadyPublished,

    /// Upgrade attempted on a wedding that was never published
    #[error("Wedding has not been published yet")]
    NotPublished,

    /// Status change not allowed by the wedding lifecycle
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: WeddingStatus,
        to: WeddingStatus,
    },

    /// Archived weddings are read-only
    #[error("Wedding is archived")]
    WeddingArchived,

    /// Slug contains characters outside [a-z0-9_-] or is empty
    #[error("Slug must contain only alphanumeric characters, hyphens, and underscores")]
    InvalidSlug,

    /// Balance arithmetic left the representable range
    #[error("Balance overflow")]
    BalanceOverflow,

    /// Price table contains a negative or oversized cost
    #[error("Invalid price for '{key}': {cost}")]
    InvalidPrice { key: String, cost: i64 },
}

impl DomainError {
    /// Create an insufficient credits error
    pub fn insufficient_credits(required: i64, available: i64) -> Self {
        Self::InsufficientCredits {
            required,
            available,
        }
    }

    /// Check if this is a client error (caller's fault)
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::BalanceOverflow | Self::InvalidPrice { .. })
    }
}
