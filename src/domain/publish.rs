//! Publish / upgrade state machine
//!
//! Pure decision logic: given a wedding, the price table and the owner's
//! balance, work out what a publish costs and apply it to the in-memory
//! entities. Persisting the result as one commit is the handler's job.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::{Admin, Balance, CostBreakdown, Credits, DomainError, PriceTable, Wedding, WeddingStatus};

/// Which operation is asking for the charge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishMode {
    /// First publish. A PUBLISHED wedding is rejected unless `allow_upgrade`
    /// is set, in which case the call is charged as an upgrade.
    Publish { allow_upgrade: bool },
    /// Re-publish of a live wedding, charging only the cost increase.
    Upgrade,
}

/// Credits owed for a selection costing `total_cost`.
///
/// The first publish pays the full cost; once `published_at` is set only
/// the increase over the last published cost is charged, never a refund.
pub fn credits_to_deduct(wedding: &Wedding, total_cost: i64) -> i64 {
    if wedding.published_at().is_some() {
        (total_cost - wedding.total_credit_cost()).max(0)
    } else {
        total_cost
    }
}

/// A validated, priced publish that has not been applied yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishPlan {
    pub cost: CostBreakdown,
    pub credits_to_deduct: i64,
    pub is_upgrade: bool,
}

impl PublishPlan {
    /// Check the wedding's state and price its current selection.
    ///
    /// Does not look at the balance; see [`PublishPlan::check_funds`].
    pub fn prepare(
        wedding: &Wedding,
        prices: &PriceTable,
        mode: PublishMode,
    ) -> Result<Self, DomainError> {
        let status = wedding.status();
        if status == WeddingStatus::Archived {
            return Err(DomainError::InvalidTransition {
                from: status,
                to: WeddingStatus::Published,
            });
        }

        let is_upgrade = match mode {
            PublishMode::Publish { allow_upgrade } => {
                if status == WeddingStatus::Published && !allow_upgrade {
                    return Err(DomainError::AlreadyPublished);
                }
                wedding.published_at().is_some()
            }
            PublishMode::Upgrade => {
                if status != WeddingStatus::Published || wedding.published_at().is_none() {
                    return Err(DomainError::NotPublished);
                }
                true
            }
        };

        let design_key = wedding
            .selected_design_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(DomainError::DesignRequired)?;

        let cost = prices.compute_cost(design_key, &wedding.selected_features);
        let credits_to_deduct = credits_to_deduct(wedding, cost.total_cost);

        Ok(Self {
            cost,
            credits_to_deduct,
            is_upgrade,
        })
    }

    /// Fail with `InsufficientCredits` if `available` cannot cover the plan
    pub fn check_funds(&self, available: Balance) -> Result<(), DomainError> {
        if !available.covers(self.credits_to_deduct) {
            return Err(DomainError::insufficient_credits(
                self.credits_to_deduct,
                available.value(),
            ));
        }
        Ok(())
    }

    /// Apply the plan to the loaded entities.
    ///
    /// Returns the credits actually charged, `None` when the plan is free.
    /// On error neither entity is modified.
    pub fn apply(&self, admin: &mut Admin, wedding: &mut Wedding) -> Result<Option<Credits>, DomainError> {
        self.check_funds(admin.available_credits())?;

        let charged = if self.credits_to_deduct > 0 {
            let amount = Credits::new(self.credits_to_deduct)?;
            admin.spend(amount)?;
            Some(amount)
        } else {
            None
        };

        wedding.mark_published(self.cost.total_cost, Utc::now());
        Ok(charged)
    }

    /// Ledger description for the charge
    pub fn description(&self, wedding: &Wedding) -> String {
        if self.is_upgrade {
            format!("Upgraded wedding: {}", wedding.title)
        } else {
            format!("Published wedding: {}", wedding.title)
        }
    }
}
