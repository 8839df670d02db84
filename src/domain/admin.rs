//! Admin entity
//!
//! Admins own weddings and hold the credit balance that publishing spends.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::{Balance, Credits, DomainError};

/// Balance every newly registered admin starts with
pub const INITIAL_BALANCE: Balance = Balance::from_u32(100);

/// Credits every newly registered admin starts with
pub const INITIAL_CREDITS: i64 = INITIAL_BALANCE.value();

/// Admin role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdminRole {
    Admin,
    SuperAdmin,
}

impl AdminRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminRole::Admin => "ADMIN",
            AdminRole::SuperAdmin => "SUPER_ADMIN",
        }
    }
}

impl Default for AdminRole {
    fn default() -> Self {
        Self::Admin
    }
}

impl fmt::Display for AdminRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdminRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(AdminRole::Admin),
            "SUPER_ADMIN" => Ok(AdminRole::SuperAdmin),
            other => Err(format!("unknown admin role '{}'", other)),
        }
    }
}

/// Admin account
///
/// `version` is the optimistic-concurrency counter the store compares on
/// every balance commit; it is the version the entity was loaded at.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Admin {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub full_name: String,
    pub role: AdminRole,
    available_credits: Balance,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Admin {
    /// Register a new admin with the initial credit grant
    pub fn register(
        email: String,
        hashed_password: String,
        full_name: String,
        role: AdminRole,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            hashed_password,
            full_name,
            role,
            available_credits: INITIAL_BALANCE,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild an admin from stored state
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: Uuid,
        email: String,
        hashed_password: String,
        full_name: String,
        role: AdminRole,
        available_credits: Balance,
        version: i64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email,
            hashed_password,
            full_name,
            role,
            available_credits,
            version,
            created_at,
            updated_at,
        }
    }

    pub fn available_credits(&self) -> Balance {
        self.available_credits
    }

    pub fn is_super_admin(&self) -> bool {
        self.role == AdminRole::SuperAdmin
    }

    /// Add granted credits, returning the new balance
    pub fn grant(&mut self, amount: Credits) -> Result<Balance, DomainError> {
        self.available_credits = self.available_credits.credit(amount)?;
        self.updated_at = Utc::now();
        Ok(self.available_credits)
    }

    /// Spend credits, returning the new balance.
    ///
    /// Fails with `InsufficientCredits` and leaves the balance untouched when
    /// the balance does not cover the amount.
    pub fn spend(&mut self, amount: Credits) -> Result<Balance, DomainError> {
        self.available_credits = self.available_credits.debit(amount)?;
        self.updated_at = Utc::now();
        Ok(self.available_credits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> Admin {
        Admin::register(
            "alice@example.com".to_string(),
            "hash".to_string(),
            "Alice".to_string(),
            AdminRole::Admin,
        )
    }

    #[test]
    fn test_register_starts_with_initial_credits() {
        let admin = admin();
        assert_eq!(admin.available_credits(), INITIAL_BALANCE);
        assert_eq!(admin.available_credits().value(), INITIAL_CREDITS);
        assert_eq!(INITIAL_CREDITS, 100);
        assert_eq!(admin.version, 0);
        assert!(!admin.is_super_admin());
    }

    #[test]
    fn test_serialized_admin_omits_password_hash() {
        let json = serde_json::to_value(admin()).unwrap();
        assert!(json.get("hashed_password").is_none());
        assert_eq!(json["email"], "alice@example.com");
        assert_eq!(json["available_credits"], 100);
    }

    #[test]
    fn test_grant_and_spend() {
        let mut admin = admin();

        let balance = admin.grant(Credits::new(50).unwrap()).unwrap();
        assert_eq!(balance.value(), 150);

        let balance = admin.spend(Credits::new(45).unwrap()).unwrap();
        assert_eq!(balance.value(), 105);
    }

    #[test]
    fn test_spend_more_than_balance_leaves_balance() {
        let mut admin = admin();

        let result = admin.spend(Credits::new(101).unwrap());
        assert_eq!(
            result,
            Err(DomainError::InsufficientCredits {
                required: 101,
                available: 100
            })
        );
        assert_eq!(admin.available_credits().value(), 100);
    }

    #[test]
    fn test_role_round_trip_through_str() {
        assert_eq!("SUPER_ADMIN".parse::<AdminRole>(), Ok(AdminRole::SuperAdmin));
        assert_eq!(AdminRole::Admin.to_string(), "ADMIN");
        assert!("ROOT".parse::<AdminRole>().is_err());
    }

    #[test]
    fn test_role_serde_uses_screaming_case() {
        let json = serde_json::to_string(&AdminRole::SuperAdmin).unwrap();
        assert_eq!(json, "\"SUPER_ADMIN\"");
    }
}
