//! Grant Credits Handler
//!
//! Super-admin top-ups.

use std::sync::Arc;

use crate::domain::{CreditLedgerEntry, Credits, OperationContext};
use crate::error::AppError;
use crate::store::{CreditChange, Store};

use super::{authenticated, AdminLocks, GrantCreditsCommand, GrantCreditsResult};

/// Handler for credit grants
pub struct GrantCreditsHandler {
    store: Arc<dyn Store>,
    locks: AdminLocks,
}

impl GrantCreditsHandler {
    pub fn new(store: Arc<dyn Store>, locks: AdminLocks) -> Self {
        Self { store, locks }
    }

    /// Execute the grant command
    pub async fn execute(
        &self,
        command: GrantCreditsCommand,
        context: &OperationContext,
    ) -> Result<GrantCreditsResult, AppError> {
        let granter_id = authenticated(context)?;
        if !context.is_super_admin() {
            return Err(AppError::Forbidden(
                "Only super admins can add credits".to_string(),
            ));
        }

        let amount = Credits::new(command.amount)?;

        let granter = self
            .store
            .find_admin(granter_id)
            .await?
            .ok_or(AppError::AdminNotFound(granter_id))?;

        let _guard = self.locks.lock(command.admin_id).await;

        let mut admin = self
            .store
            .find_admin(command.admin_id)
            .await?
            .ok_or(AppError::AdminNotFound(command.admin_id))?;

        let new_balance = admin.grant(amount)?;
        let entry = CreditLedgerEntry::credit(
            admin.id,
            amount,
            new_balance,
            format!("Credits added by Super Admin {}", granter.full_name),
        );

        let committed = self
            .store
            .apply_credit_change(CreditChange {
                admin,
                entry: Some(entry),
                wedding: None,
            })
            .await?;

        tracing::info!(
            admin_id = %committed.admin.id,
            granted_by = %granter_id,
            amount = amount.value(),
            balance = committed.admin.available_credits().value(),
            client_ip = ?context.client_ip,
            "Credits granted"
        );

        Ok(GrantCreditsResult {
            message: format!("Added {} credits", amount),
            admin_id: committed.admin.id,
            amount: amount.value(),
            new_balance: committed.admin.available_credits().value(),
        })
    }
}
