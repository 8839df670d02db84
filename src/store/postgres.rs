//! PostgreSQL store
//!
//! Credit changes run in one transaction. The admin row is updated first
//! with a `version` guard, which also takes its row lock, so concurrent
//! commits against the same admin queue up and the later ones miss the
//! version check instead of overdrawing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::domain::{
    Admin, AdminRole, Balance, CreditLedgerEntry, CreditTransactionType, Credits, Slug, Wedding,
    WeddingStatus,
};

use super::{
    AdminRepository, CommittedChange, CreditChange, LedgerRepository, Store, StoreError,
    StoreResult, WeddingRepository,
};

/// Store backed by a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a new PgStore with a database pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// =========================================================================
// Row mapping
// =========================================================================

#[derive(sqlx::FromRow)]
struct AdminRow {
    id: Uuid,
    email: String,
    hashed_password: String,
    full_name: String,
    role: String,
    available_credits: i64,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AdminRow> for Admin {
    type Error = StoreError;

    fn try_from(row: AdminRow) -> Result<Self, Self::Error> {
        let role: AdminRole = row.role.parse().map_err(StoreError::Corrupt)?;
        let balance = Balance::new(row.available_credits)
            .map_err(|e| StoreError::Corrupt(format!("admin {}: {}", row.id, e)))?;
        Ok(Admin::from_parts(
            row.id,
            row.email,
            row.hashed_password,
            row.full_name,
            role,
            balance,
            row.version,
            row.created_at,
            row.updated_at,
        ))
    }
}

#[derive(sqlx::FromRow)]
struct WeddingRow {
    id: Uuid,
    admin_id: Uuid,
    title: String,
    slug: String,
    status: String,
    selected_design_key: Option<String>,
    selected_features: Vec<String>,
    total_credit_cost: i64,
    published_at: Option<DateTime<Utc>>,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<WeddingRow> for Wedding {
    type Error = StoreError;

    fn try_from(row: WeddingRow) -> Result<Self, Self::Error> {
        let status: WeddingStatus = row.status.parse().map_err(StoreError::Corrupt)?;
        let slug = Slug::parse(&row.slug)
            .map_err(|e| StoreError::Corrupt(format!("wedding {}: {}", row.id, e)))?;
        Ok(Wedding::from_parts(
            row.id,
            row.admin_id,
            row.title,
            slug,
            status,
            row.selected_design_key,
            row.selected_features,
            row.total_credit_cost,
            row.published_at,
            row.version,
            row.created_at,
            row.updated_at,
        ))
    }
}

#[derive(sqlx::FromRow)]
struct LedgerRow {
    id: Uuid,
    admin_id: Uuid,
    transaction_type: String,
    amount: i64,
    balance_after: i64,
    description: String,
    wedding_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl TryFrom<LedgerRow> for CreditLedgerEntry {
    type Error = StoreError;

    fn try_from(row: LedgerRow) -> Result<Self, Self::Error> {
        let corrupt = |e: crate::domain::DomainError| {
            StoreError::Corrupt(format!("ledger entry {}: {}", row.id, e))
        };
        let transaction_type: CreditTransactionType =
            row.transaction_type.parse().map_err(StoreError::Corrupt)?;
        Ok(CreditLedgerEntry {
            id: row.id,
            admin_id: row.admin_id,
            transaction_type,
            amount: Credits::new(row.amount).map_err(corrupt)?,
            balance_after: Balance::new(row.balance_after).map_err(corrupt)?,
            description: row.description,
            wedding_id: row.wedding_id,
            created_at: row.created_at,
        })
    }
}

const ADMIN_COLUMNS: &str = "id, email, hashed_password, full_name, role, available_credits, version, created_at, updated_at";

const WEDDING_COLUMNS: &str = "id, admin_id, title, slug, status, selected_design_key, selected_features, total_credit_cost, published_at, version, created_at, updated_at";

fn unique_violation(err: sqlx::Error, field: &'static str) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            StoreError::Duplicate(field)
        }
        _ => StoreError::Database(err),
    }
}

/// Write a wedding guarded by its loaded version; returns rows affected
async fn write_wedding(conn: &mut PgConnection, wedding: &Wedding) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE weddings
        SET
            title = $3,
            slug = $4,
            status = $5,
            selected_design_key = $6,
            selected_features = $7,
            total_credit_cost = $8,
            published_at = $9,
            updated_at = $10,
            version = version + 1
        WHERE id = $1 AND version = $2
        "#,
    )
    .bind(wedding.id)
    .bind(wedding.version)
    .bind(&wedding.title)
    .bind(wedding.slug.as_str())
    .bind(wedding.status().as_str())
    .bind(&wedding.selected_design_key)
    .bind(&wedding.selected_features)
    .bind(wedding.total_credit_cost())
    .bind(wedding.published_at())
    .bind(wedding.updated_at)
    .execute(conn)
    .await?;

    Ok(result.rows_affected())
}

/// Explain why a version-guarded update touched no rows
async fn missing_or_conflict(
    conn: &mut PgConnection,
    table: &'static str,
    entity: &'static str,
    id: Uuid,
    expected: i64,
) -> StoreError {
    let query = format!("SELECT EXISTS (SELECT 1 FROM {} WHERE id = $1)", table);
    match sqlx::query_scalar::<_, bool>(&query)
        .bind(id)
        .fetch_one(conn)
        .await
    {
        Ok(true) => StoreError::Conflict {
            entity,
            id,
            expected,
        },
        Ok(false) => StoreError::Missing { entity, id },
        Err(e) => StoreError::Database(e),
    }
}

// =========================================================================
// Repositories
// =========================================================================

#[async_trait]
impl AdminRepository for PgStore {
    async fn insert_admin(&self, admin: &Admin) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO admins (id, email, hashed_password, full_name, role, available_credits, version, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(admin.id)
        .bind(&admin.email)
        .bind(&admin.hashed_password)
        .bind(&admin.full_name)
        .bind(admin.role.as_str())
        .bind(admin.available_credits().value())
        .bind(admin.version)
        .bind(admin.created_at)
        .bind(admin.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| unique_violation(e, "email"))?;

        Ok(())
    }

    async fn find_admin(&self, admin_id: Uuid) -> StoreResult<Option<Admin>> {
        let query = format!("SELECT {} FROM admins WHERE id = $1", ADMIN_COLUMNS);
        let row: Option<AdminRow> = sqlx::query_as(&query)
            .bind(admin_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Admin::try_from).transpose()
    }

    async fn find_admin_by_email(&self, email: &str) -> StoreResult<Option<Admin>> {
        let query = format!("SELECT {} FROM admins WHERE email = $1", ADMIN_COLUMNS);
        let row: Option<AdminRow> = sqlx::query_as(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Admin::try_from).transpose()
    }

    async fn list_admins(&self) -> StoreResult<Vec<Admin>> {
        let query = format!("SELECT {} FROM admins ORDER BY created_at", ADMIN_COLUMNS);
        let rows: Vec<AdminRow> = sqlx::query_as(&query).fetch_all(&self.pool).await?;
        rows.into_iter().map(Admin::try_from).collect()
    }
}

#[async_trait]
impl WeddingRepository for PgStore {
    async fn insert_wedding(&self, wedding: &Wedding) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO weddings (
                id, admin_id, title, slug, status, selected_design_key, selected_features,
                total_credit_cost, published_at, version, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(wedding.id)
        .bind(wedding.admin_id)
        .bind(&wedding.title)
        .bind(wedding.slug.as_str())
        .bind(wedding.status().as_str())
        .bind(&wedding.selected_design_key)
        .bind(&wedding.selected_features)
        .bind(wedding.total_credit_cost())
        .bind(wedding.published_at())
        .bind(wedding.version)
        .bind(wedding.created_at)
        .bind(wedding.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| unique_violation(e, "slug"))?;

        Ok(())
    }

    async fn find_wedding(&self, wedding_id: Uuid) -> StoreResult<Option<Wedding>> {
        let query = format!("SELECT {} FROM weddings WHERE id = $1", WEDDING_COLUMNS);
        let row: Option<WeddingRow> = sqlx::query_as(&query)
            .bind(wedding_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Wedding::try_from).transpose()
    }

    async fn find_wedding_by_slug(&self, slug: &str) -> StoreResult<Option<Wedding>> {
        let query = format!("SELECT {} FROM weddings WHERE slug = $1", WEDDING_COLUMNS);
        let row: Option<WeddingRow> = sqlx::query_as(&query)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Wedding::try_from).transpose()
    }

    async fn list_weddings(&self, owner: Option<Uuid>) -> StoreResult<Vec<Wedding>> {
        let rows: Vec<WeddingRow> = match owner {
            Some(admin_id) => {
                let query = format!(
                    "SELECT {} FROM weddings WHERE admin_id = $1 ORDER BY created_at",
                    WEDDING_COLUMNS
                );
                sqlx::query_as(&query)
                    .bind(admin_id)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let query = format!("SELECT {} FROM weddings ORDER BY created_at", WEDDING_COLUMNS);
                sqlx::query_as(&query).fetch_all(&self.pool).await?
            }
        };
        rows.into_iter().map(Wedding::try_from).collect()
    }

    async fn update_wedding(&self, wedding: &Wedding) -> StoreResult<Wedding> {
        let mut conn = self.pool.acquire().await?;
        let rows = write_wedding(&mut conn, wedding)
            .await
            .map_err(|e| unique_violation(e, "slug"))?;

        if rows == 0 {
            return Err(
                missing_or_conflict(&mut conn, "weddings", "wedding", wedding.id, wedding.version)
                    .await,
            );
        }

        let mut stored = wedding.clone();
        stored.version += 1;
        Ok(stored)
    }
}

const LEDGER_QUERY: &str = r#"
    SELECT id, admin_id, transaction_type, amount, balance_after, description, wedding_id, created_at
    FROM credit_ledger
    WHERE admin_id = $1
    ORDER BY created_at DESC, seq DESC
"#;

#[async_trait]
impl LedgerRepository for PgStore {
    async fn ledger_for_admin(&self, admin_id: Uuid) -> StoreResult<Vec<CreditLedgerEntry>> {
        let rows: Vec<LedgerRow> = sqlx::query_as(LEDGER_QUERY)
            .bind(admin_id)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(CreditLedgerEntry::try_from).collect()
    }

    async fn admin_with_ledger(
        &self,
        admin_id: Uuid,
    ) -> StoreResult<Option<(Admin, Vec<CreditLedgerEntry>)>> {
        let mut tx = self.pool.begin().await?;
        // Both reads see the same snapshot
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;

        let query = format!("SELECT {} FROM admins WHERE id = $1", ADMIN_COLUMNS);
        let row: Option<AdminRow> = sqlx::query_as(&query)
            .bind(admin_id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };

        let rows: Vec<LedgerRow> = sqlx::query_as(LEDGER_QUERY)
            .bind(admin_id)
            .fetch_all(&mut *tx)
            .await?;
        tx.commit().await?;

        let admin = Admin::try_from(row)?;
        let entries = rows
            .into_iter()
            .map(CreditLedgerEntry::try_from)
            .collect::<StoreResult<Vec<_>>>()?;
        Ok(Some((admin, entries)))
    }
}

#[async_trait]
impl Store for PgStore {
    async fn apply_credit_change(&self, change: CreditChange) -> StoreResult<CommittedChange> {
        let mut tx = self.pool.begin().await?;
        let admin = &change.admin;

        let rows = sqlx::query(
            r#"
            UPDATE admins
            SET available_credits = $3, updated_at = $4, version = version + 1
            WHERE id = $1 AND version = $2
            "#,
        )
        .bind(admin.id)
        .bind(admin.version)
        .bind(admin.available_credits().value())
        .bind(admin.updated_at)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if rows == 0 {
            // Dropping `tx` rolls back
            return Err(
                missing_or_conflict(&mut tx, "admins", "admin", admin.id, admin.version).await,
            );
        }

        if let Some(entry) = &change.entry {
            sqlx::query(
                r#"
                INSERT INTO credit_ledger (
                    id, admin_id, transaction_type, amount, balance_after, description, wedding_id, created_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(entry.id)
            .bind(entry.admin_id)
            .bind(entry.transaction_type.as_str())
            .bind(entry.amount.value())
            .bind(entry.balance_after.value())
            .bind(&entry.description)
            .bind(entry.wedding_id)
            .bind(entry.created_at)
            .execute(&mut *tx)
            .await?;
        }

        if let Some(wedding) = &change.wedding {
            let rows = write_wedding(&mut tx, wedding).await?;
            if rows == 0 {
                return Err(missing_or_conflict(
                    &mut tx,
                    "weddings",
                    "wedding",
                    wedding.id,
                    wedding.version,
                )
                .await);
            }
        }

        tx.commit().await?;

        let mut admin = change.admin;
        admin.version += 1;
        let wedding = change.wedding.map(|mut wedding| {
            wedding.version += 1;
            wedding
        });

        tracing::debug!(admin_id = %admin.id, version = admin.version, "Credit change committed");

        Ok(CommittedChange { admin, wedding })
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
