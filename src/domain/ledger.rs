//! Credit ledger
//!
//! Immutable records of every balance change. Entries are only ever appended;
//! replaying an admin's entries from the initial grant must land on the
//! admin's current balance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::{Balance, Credits, INITIAL_CREDITS};

/// Direction of a ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreditTransactionType {
    Credit,
    Deduct,
}

impl CreditTransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CreditTransactionType::Credit => "CREDIT",
            CreditTransactionType::Deduct => "DEDUCT",
        }
    }
}

impl fmt::Display for CreditTransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CreditTransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREDIT" => Ok(CreditTransactionType::Credit),
            "DEDUCT" => Ok(CreditTransactionType::Deduct),
            other => Err(format!("unknown transaction type '{}'", other)),
        }
    }
}

/// One balance change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditLedgerEntry {
    pub id: Uuid,
    pub admin_id: Uuid,
    pub transaction_type: CreditTransactionType,
    pub amount: Credits,
    pub balance_after: Balance,
    pub description: String,
    pub wedding_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl CreditLedgerEntry {
    /// Entry for credits added to an admin
    pub fn credit(
        admin_id: Uuid,
        amount: Credits,
        balance_after: Balance,
        description: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            admin_id,
            transaction_type: CreditTransactionType::Credit,
            amount,
            balance_after,
            description,
            wedding_id: None,
            created_at: Utc::now(),
        }
    }

    /// Entry for credits spent on a wedding
    pub fn deduct(
        admin_id: Uuid,
        amount: Credits,
        balance_after: Balance,
        description: String,
        wedding_id: Uuid,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            admin_id,
            transaction_type: CreditTransactionType::Deduct,
            amount,
            balance_after,
            description,
            wedding_id: Some(wedding_id),
            created_at: Utc::now(),
        }
    }

    /// Signed effect on the balance
    pub fn signed_amount(&self) -> i64 {
        match self.transaction_type {
            CreditTransactionType::Credit => self.amount.value(),
            CreditTransactionType::Deduct => -self.amount.value(),
        }
    }
}

/// Outcome of replaying a ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayReport {
    /// Balance implied by the initial grant plus every entry
    pub replayed_balance: i64,
    /// Number of entries replayed
    pub entries: usize,
    /// First entry whose `balance_after` disagrees with the running total
    pub first_mismatch: Option<Uuid>,
}

impl ReplayReport {
    pub fn is_consistent_with(&self, available_credits: Balance) -> bool {
        self.first_mismatch.is_none() && self.replayed_balance == available_credits.value()
    }
}

/// Replay entries in creation order, starting from the initial grant.
pub fn replay<'a, I>(entries: I) -> ReplayReport
where
    I: IntoIterator<Item = &'a CreditLedgerEntry>,
{
    let mut running = INITIAL_CREDITS;
    let mut count = 0;
    let mut first_mismatch = None;

    for entry in entries {
        running += entry.signed_amount();
        count += 1;
        if first_mismatch.is_none() && entry.balance_after.value() != running {
            first_mismatch = Some(entry.id);
        }
    }

    ReplayReport {
        replayed_balance: running,
        entries: count,
        first_mismatch,
    }
}
