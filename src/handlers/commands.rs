//! Command definitions
//!
//! Commands represent intentions to change the system state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Admin, AdminRole, CostBreakdown, WeddingStatus};

// =========================================================================
// Auth
// =========================================================================

/// Command to register a new admin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterCommand {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: Option<AdminRole>,
}

impl RegisterCommand {
    pub fn new(email: String, password: String, full_name: String) -> Self {
        Self {
            email,
            password,
            full_name,
            role: None,
        }
    }

    pub fn with_role(mut self, role: AdminRole) -> Self {
        self.role = Some(role);
        self
    }
}

/// Command to exchange credentials for a bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginCommand {
    pub email: String,
    pub password: String,
}

impl LoginCommand {
    pub fn new(email: String, password: String) -> Self {
        Self { email, password }
    }
}

// =========================================================================
// Weddings
// =========================================================================

/// Command to create a DRAFT wedding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWeddingCommand {
    pub title: String,
    pub slug: String,
}

impl CreateWeddingCommand {
    pub fn new(title: String, slug: String) -> Self {
        Self { title, slug }
    }
}

/// Partial update of a wedding; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateWeddingCommand {
    pub title: Option<String>,
    pub slug: Option<String>,
    /// An empty string clears the selected design
    pub selected_design_key: Option<String>,
    pub selected_features: Option<Vec<String>>,
    pub status: Option<WeddingStatus>,
}

impl UpdateWeddingCommand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    pub fn with_design(mut self, design_key: impl Into<String>) -> Self {
        self.selected_design_key = Some(design_key.into());
        self
    }

    pub fn with_features<S: Into<String>>(mut self, features: impl IntoIterator<Item = S>) -> Self {
        self.selected_features = Some(features.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_status(mut self, status: WeddingStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// Command to publish, or upgrade, a wedding
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PublishCommand {
    pub wedding_id: Uuid,
    /// Charge only the increase over the last published cost
    pub upgrade: bool,
}

impl PublishCommand {
    pub fn publish(wedding_id: Uuid) -> Self {
        Self {
            wedding_id,
            upgrade: false,
        }
    }

    pub fn upgrade(wedding_id: Uuid) -> Self {
        Self {
            wedding_id,
            upgrade: true,
        }
    }
}

// =========================================================================
// Credits
// =========================================================================

/// Command for a super-admin to add credits to an admin
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GrantCreditsCommand {
    pub admin_id: Uuid,
    pub amount: i64,
}

impl GrantCreditsCommand {
    pub fn new(admin_id: Uuid, amount: i64) -> Self {
        Self { admin_id, amount }
    }
}

// =========================================================================
// Results
// =========================================================================

/// Admin as shown to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminProfile {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: AdminRole,
    pub available_credits: i64,
    pub created_at: DateTime<Utc>,
}

impl From<&Admin> for AdminProfile {
    fn from(admin: &Admin) -> Self {
        Self {
            id: admin.id,
            email: admin.email.clone(),
            full_name: admin.full_name.clone(),
            role: admin.role,
            available_credits: admin.available_credits().value(),
            created_at: admin.created_at,
        }
    }
}

/// Result of a successful register or login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResult {
    pub access_token: String,
    pub token_type: String,
    pub admin: AdminProfile,
}

/// Result of a successful publish or upgrade
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishResult {
    pub message: String,
    pub wedding_id: Uuid,
    pub credits_deducted: i64,
    pub remaining_credits: i64,
    pub total_cost: i64,
    pub wedding_url: String,
}

/// Result of a successful credit grant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrantCreditsResult {
    pub message: String,
    pub admin_id: Uuid,
    pub amount: i64,
    pub new_balance: i64,
}

/// Cost of a wedding's current selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateResult {
    pub wedding_id: Uuid,
    #[serde(flatten)]
    pub cost: CostBreakdown,
    /// What a publish (or upgrade) would charge right now
    pub credits_to_deduct: i64,
}

/// Current admin's balance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceResult {
    pub admin_id: Uuid,
    pub full_name: String,
    pub available_credits: i64,
}

/// Ledger replay compared with the stored balance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileResult {
    pub admin_id: Uuid,
    pub available_credits: i64,
    pub replayed_balance: i64,
    pub entries: usize,
    pub consistent: bool,
    pub first_mismatch: Option<Uuid>,
}
