//! Publish Handler
//!
//! Charges credits for publishing or upgrading a wedding. The balance
//! update, the DEDUCT entry and the new wedding state land in one store
//! commit.

use std::sync::Arc;

use crate::domain::{CreditLedgerEntry, OperationContext, PriceTable, PublishMode, PublishPlan};
use crate::error::AppError;
use crate::store::{CreditChange, Store};

use super::{authenticated, AdminLocks, PublishCommand, PublishResult};

/// Handler for publish and upgrade
pub struct PublishHandler {
    store: Arc<dyn Store>,
    prices: Arc<PriceTable>,
    locks: AdminLocks,
    allow_published_upgrade: bool,
}

impl PublishHandler {
    pub fn new(
        store: Arc<dyn Store>,
        prices: Arc<PriceTable>,
        locks: AdminLocks,
        allow_published_upgrade: bool,
    ) -> Self {
        Self {
            store,
            prices,
            locks,
            allow_published_upgrade,
        }
    }

    /// Execute the publish command
    pub async fn execute(
        &self,
        command: PublishCommand,
        context: &OperationContext,
    ) -> Result<PublishResult, AppError> {
        let admin_id = authenticated(context)?;

        // Held until the commit lands
        let _guard = self.locks.lock(admin_id).await;

        let mut wedding = self
            .store
            .find_wedding(command.wedding_id)
            .await?
            .ok_or(AppError::WeddingNotFound(command.wedding_id))?;

        if !wedding.is_owned_by(admin_id) {
            return Err(AppError::Forbidden(
                "Only the owner can publish this wedding".to_string(),
            ));
        }

        let mode = if command.upgrade {
            PublishMode::Upgrade
        } else {
            PublishMode::Publish {
                allow_upgrade: self.allow_published_upgrade,
            }
        };
        let plan = PublishPlan::prepare(&wedding, &self.prices, mode)?;

        let mut admin = self
            .store
            .find_admin(admin_id)
            .await?
            .ok_or(AppError::AdminNotFound(admin_id))?;

        let charged = plan.apply(&mut admin, &mut wedding).map_err(|e| {
            tracing::warn!(
                admin_id = %admin_id,
                wedding_id = %wedding.id,
                required = plan.credits_to_deduct,
                available = admin.available_credits().value(),
                "Publish rejected: {}",
                e
            );
            e
        })?;

        let entry = charged.map(|amount| {
            CreditLedgerEntry::deduct(
                admin.id,
                amount,
                admin.available_credits(),
                plan.description(&wedding),
                wedding.id,
            )
        });

        let committed = self
            .store
            .apply_credit_change(CreditChange {
                admin,
                entry,
                wedding: Some(wedding),
            })
            .await?;

        let admin = committed.admin;
        let wedding = committed
            .wedding
            .ok_or_else(|| AppError::Internal("Commit returned no wedding".to_string()))?;

        tracing::info!(
            admin_id = %admin.id,
            wedding_id = %wedding.id,
            upgrade = plan.is_upgrade,
            credits_deducted = plan.credits_to_deduct,
            balance = admin.available_credits().value(),
            client_ip = ?context.client_ip,
            "Wedding published"
        );

        let message = if plan.is_upgrade {
            "Wedding upgraded successfully"
        } else {
            "Wedding published successfully"
        };

        Ok(PublishResult {
            message: message.to_string(),
            wedding_id: wedding.id,
            credits_deducted: plan.credits_to_deduct,
            remaining_credits: admin.available_credits().value(),
            total_cost: plan.cost.total_cost,
            wedding_url: wedding.url_path(),
        })
    }
}
