//! In-memory store
//!
//! Keeps everything behind one `RwLock`, so a credit change is a single
//! critical section. Used for local development and tests.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{Admin, CreditLedgerEntry, Wedding};

use super::{
    AdminRepository, CommittedChange, CreditChange, LedgerRepository, Store, StoreError,
    StoreResult, WeddingRepository,
};

#[derive(Debug, Default)]
struct State {
    admins: HashMap<Uuid, Admin>,
    weddings: HashMap<Uuid, Wedding>,
    /// Append order
    ledger: Vec<CreditLedgerEntry>,
}

/// Process-local store
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl State {
    fn ledger_for(&self, admin_id: Uuid) -> Vec<CreditLedgerEntry> {
        self.ledger
            .iter()
            .rev()
            .filter(|e| e.admin_id == admin_id)
            .cloned()
            .collect()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AdminRepository for MemoryStore {
    async fn insert_admin(&self, admin: &Admin) -> StoreResult<()> {
        let mut state = self.state.write().await;
        if state.admins.values().any(|a| a.email == admin.email) {
            return Err(StoreError::Duplicate("email"));
        }
        state.admins.insert(admin.id, admin.clone());
        Ok(())
    }

    async fn find_admin(&self, admin_id: Uuid) -> StoreResult<Option<Admin>> {
        Ok(self.state.read().await.admins.get(&admin_id).cloned())
    }

    async fn find_admin_by_email(&self, email: &str) -> StoreResult<Option<Admin>> {
        let state = self.state.read().await;
        Ok(state.admins.values().find(|a| a.email == email).cloned())
    }

    async fn list_admins(&self) -> StoreResult<Vec<Admin>> {
        let state = self.state.read().await;
        let mut admins: Vec<Admin> = state.admins.values().cloned().collect();
        admins.sort_by_key(|a| a.created_at);
        Ok(admins)
    }
}

#[async_trait]
impl WeddingRepository for MemoryStore {
    async fn insert_wedding(&self, wedding: &Wedding) -> StoreResult<()> {
        let mut state = self.state.write().await;
        if state.weddings.values().any(|w| w.slug == wedding.slug) {
            return Err(StoreError::Duplicate("slug"));
        }
        state.weddings.insert(wedding.id, wedding.clone());
        Ok(())
    }

    async fn find_wedding(&self, wedding_id: Uuid) -> StoreResult<Option<Wedding>> {
        Ok(self.state.read().await.weddings.get(&wedding_id).cloned())
    }

    async fn find_wedding_by_slug(&self, slug: &str) -> StoreResult<Option<Wedding>> {
        let state = self.state.read().await;
        Ok(state
            .weddings
            .values()
            .find(|w| w.slug.as_str() == slug)
            .cloned())
    }

    async fn list_weddings(&self, owner: Option<Uuid>) -> StoreResult<Vec<Wedding>> {
        let state = self.state.read().await;
        let mut weddings: Vec<Wedding> = state
            .weddings
            .values()
            .filter(|w| owner.map_or(true, |id| w.admin_id == id))
            .cloned()
            .collect();
        weddings.sort_by_key(|w| w.created_at);
        Ok(weddings)
    }

    async fn update_wedding(&self, wedding: &Wedding) -> StoreResult<Wedding> {
        let mut state = self.state.write().await;
        check_wedding(&state, wedding)?;
        if state
            .weddings
            .values()
            .any(|w| w.id != wedding.id && w.slug == wedding.slug)
        {
            return Err(StoreError::Duplicate("slug"));
        }

        let mut stored = wedding.clone();
        stored.version += 1;
        state.weddings.insert(stored.id, stored.clone());
        Ok(stored)
    }
}

#[async_trait]
impl LedgerRepository for MemoryStore {
    async fn ledger_for_admin(&self, admin_id: Uuid) -> StoreResult<Vec<CreditLedgerEntry>> {
        let state = self.state.read().await;
        Ok(state.ledger_for(admin_id))
    }

    async fn admin_with_ledger(
        &self,
        admin_id: Uuid,
    ) -> StoreResult<Option<(Admin, Vec<CreditLedgerEntry>)>> {
        let state = self.state.read().await;
        Ok(state
            .admins
            .get(&admin_id)
            .map(|admin| (admin.clone(), state.ledger_for(admin_id))))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn apply_credit_change(&self, change: CreditChange) -> StoreResult<CommittedChange> {
        let mut state = self.state.write().await;

        // Validate everything before touching anything
        let current = state
            .admins
            .get(&change.admin.id)
            .ok_or(StoreError::Missing {
                entity: "admin",
                id: change.admin.id,
            })?;
        if current.version != change.admin.version {
            return Err(StoreError::Conflict {
                entity: "admin",
                id: change.admin.id,
                expected: change.admin.version,
            });
        }
        if let Some(wedding) = &change.wedding {
            check_wedding(&state, wedding)?;
        }

        let mut admin = change.admin;
        admin.version += 1;
        state.admins.insert(admin.id, admin.clone());

        if let Some(entry) = change.entry {
            state.ledger.push(entry);
        }

        let wedding = change.wedding.map(|mut wedding| {
            wedding.version += 1;
            state.weddings.insert(wedding.id, wedding.clone());
            wedding
        });

        Ok(CommittedChange { admin, wedding })
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

fn check_wedding(state: &State, wedding: &Wedding) -> StoreResult<()> {
    let current = state.weddings.get(&wedding.id).ok_or(StoreError::Missing {
        entity: "wedding",
        id: wedding.id,
    })?;
    if current.version != wedding.version {
        return Err(StoreError::Conflict {
            entity: "wedding",
            id: wedding.id,
            expected: wedding.version,
        });
    }
    Ok(())
}
