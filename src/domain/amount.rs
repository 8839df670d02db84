//! Credit amount types
//!
//! Domain primitives for credit quantities. All values are validated at
//! construction time, so a negative balance or a non-positive ledger amount
//! cannot exist in the system.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::DomainError;

/// A strictly positive number of credits.
///
/// # Invariants
/// - Value is always > 0
///
/// # Example
/// ```
/// use wedding_credits::domain::Credits;
///
/// let credits = Credits::new(45).unwrap();
/// assert_eq!(credits.value(), 45);
/// assert!(Credits::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Credits(i64);

impl Credits {
    /// Create a new positive credit amount.
    ///
    /// # Errors
    /// `DomainError::InvalidAmount` if value <= 0
    pub fn new(value: i64) -> Result<Self, DomainError> {
        if value <= 0 {
            return Err(DomainError::InvalidAmount(format!(
                "amount must be positive (got {})",
                value
            )));
        }
        Ok(Self(value))
    }

    /// Get the underlying value.
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Credits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for Credits {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Credits::new(value)
    }
}

impl From<Credits> for i64 {
    fn from(credits: Credits) -> Self {
        credits.0
    }
}

/// Balance represents an admin's available credits (zero or positive).
/// Unlike Credits, Balance can be zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Balance(i64);

impl Balance {
    /// Create a new balance (zero or positive)
    pub fn new(value: i64) -> Result<Self, DomainError> {
        if value < 0 {
            return Err(DomainError::InvalidAmount(format!(
                "balance cannot be negative (got {})",
                value
            )));
        }
        Ok(Self(value))
    }

    /// Create a balance from a value that cannot be negative
    pub const fn from_u32(value: u32) -> Self {
        Self(value as i64)
    }

    /// Create a zero balance
    pub fn zero() -> Self {
        Self(0)
    }

    /// Get the underlying value
    pub const fn value(&self) -> i64 {
        self.0
    }

    /// Check if balance covers a deduction of `required` credits
    pub fn covers(&self, required: i64) -> bool {
        self.0 >= required
    }

    /// Add credits to the balance
    pub fn credit(&self, amount: Credits) -> Result<Balance, DomainError> {
        self.0
            .checked_add(amount.value())
            .map(Balance)
            .ok_or(DomainError::BalanceOverflow)
    }

    /// Subtract credits from the balance
    pub fn debit(&self, amount: Credits) -> Result<Balance, DomainError> {
        if !self.covers(amount.value()) {
            return Err(DomainError::insufficient_credits(amount.value(), self.0));
        }
        Ok(Balance(self.0 - amount.value()))
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for Balance {
    fn default() -> Self {
        Self::zero()
    }
}

impl TryFrom<i64> for Balance {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Balance::new(value)
    }
}

impl From<Balance> for i64 {
    fn from(balance: Balance) -> Self {
        balance.0
    }
}
