//! Storage module
//!
//! Repository traits for admins, weddings and the credit ledger, plus the
//! one write that spans all three: [`Store::apply_credit_change`].
//!
//! Every balance change goes through `apply_credit_change`, which lands the
//! admin's new balance, the ledger entry and the wedding update together or
//! not at all. It compares the admin's and wedding's `version` against the
//! stored ones first, so a commit planned from stale state is refused with
//! [`StoreError::Conflict`] instead of overwriting a newer balance.

mod error;
mod memory;
mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Admin, CreditLedgerEntry, Wedding};

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Identity store
#[async_trait]
pub trait AdminRepository: Send + Sync {
    /// Insert a new admin. Fails with `Duplicate("email")` if the email is taken.
    async fn insert_admin(&self, admin: &Admin) -> StoreResult<()>;

    async fn find_admin(&self, admin_id: Uuid) -> StoreResult<Option<Admin>>;

    async fn find_admin_by_email(&self, email: &str) -> StoreResult<Option<Admin>>;

    async fn list_admins(&self) -> StoreResult<Vec<Admin>>;
}

/// Wedding store
#[async_trait]
pub trait WeddingRepository: Send + Sync {
    /// Insert a new wedding. Fails with `Duplicate("slug")` if the slug is taken.
    async fn insert_wedding(&self, wedding: &Wedding) -> StoreResult<()>;

    async fn find_wedding(&self, wedding_id: Uuid) -> StoreResult<Option<Wedding>>;

    async fn find_wedding_by_slug(&self, slug: &str) -> StoreResult<Option<Wedding>>;

    /// All weddings, or only those of `owner`, oldest first
    async fn list_weddings(&self, owner: Option<Uuid>) -> StoreResult<Vec<Wedding>>;

    /// Persist edits to a wedding loaded at `wedding.version`.
    ///
    /// Returns the stored wedding with its bumped version.
    async fn update_wedding(&self, wedding: &Wedding) -> StoreResult<Wedding>;
}

/// Ledger store (read side; appends go through `apply_credit_change`)
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Entries for one admin, newest first
    async fn ledger_for_admin(&self, admin_id: Uuid) -> StoreResult<Vec<CreditLedgerEntry>>;

    /// An admin and its entries (newest first) read from one snapshot, so no
    /// commit can land between the balance and the ledger
    async fn admin_with_ledger(
        &self,
        admin_id: Uuid,
    ) -> StoreResult<Option<(Admin, Vec<CreditLedgerEntry>)>>;
}

/// A balance change and everything that must land with it
#[derive(Debug, Clone)]
pub struct CreditChange {
    /// Admin with its new balance, `version` still the one it was loaded at
    pub admin: Admin,
    /// Ledger entry to append; `None` when nothing was charged
    pub entry: Option<CreditLedgerEntry>,
    /// Wedding with its new state, `version` still the one it was loaded at
    pub wedding: Option<Wedding>,
}

/// Result of a committed credit change
#[derive(Debug, Clone)]
pub struct CommittedChange {
    pub admin: Admin,
    pub wedding: Option<Wedding>,
}

/// Full storage interface
#[async_trait]
pub trait Store: AdminRepository + WeddingRepository + LedgerRepository {
    /// Atomically apply a balance change, its ledger entry and wedding update.
    async fn apply_credit_change(&self, change: CreditChange) -> StoreResult<CommittedChange>;

    /// Backend name for logs
    fn backend(&self) -> &'static str;
}
