//! Credit Query Handler
//!
//! Balance, ledger history and ledger reconciliation for the calling admin.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{replay, Admin, CreditLedgerEntry, OperationContext};
use crate::error::AppError;
use crate::store::Store;

use super::{authenticated, BalanceResult, ReconcileResult};

/// Read-only credit queries
pub struct CreditQueryHandler {
    store: Arc<dyn Store>,
}

impl CreditQueryHandler {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Ledger entries, newest first
    pub async fn ledger(
        &self,
        context: &OperationContext,
    ) -> Result<Vec<CreditLedgerEntry>, AppError> {
        let admin_id = authenticated(context)?;
        Ok(self.store.ledger_for_admin(admin_id).await?)
    }

    pub async fn balance(&self, context: &OperationContext) -> Result<BalanceResult, AppError> {
        let admin = self.load(authenticated(context)?).await?;
        Ok(BalanceResult {
            admin_id: admin.id,
            full_name: admin.full_name.clone(),
            available_credits: admin.available_credits().value(),
        })
    }

    /// Replay the ledger from the initial grant and compare with the balance
    pub async fn reconcile(
        &self,
        context: &OperationContext,
    ) -> Result<ReconcileResult, AppError> {
        let admin_id = authenticated(context)?;
        let (admin, entries) = self
            .store
            .admin_with_ledger(admin_id)
            .await?
            .ok_or(AppError::AdminNotFound(admin_id))?;

        let report = replay(entries.iter().rev());
        let consistent = report.is_consistent_with(admin.available_credits());
        if !consistent {
            tracing::error!(
                admin_id = %admin.id,
                available = admin.available_credits().value(),
                replayed = report.replayed_balance,
                first_mismatch = ?report.first_mismatch,
                "Ledger does not match balance"
            );
        }

        Ok(ReconcileResult {
            admin_id: admin.id,
            available_credits: admin.available_credits().value(),
            replayed_balance: report.replayed_balance,
            entries: report.entries,
            consistent,
            first_mismatch: report.first_mismatch,
        })
    }

    async fn load(&self, admin_id: Uuid) -> Result<Admin, AppError> {
        self.store
            .find_admin(admin_id)
            .await?
            .ok_or(AppError::AdminNotFound(admin_id))
    }
}
