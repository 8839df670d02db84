//! Auth Handlers
//!
//! Registration, login and admin lookups.

use std::sync::Arc;

use uuid::Uuid;

use crate::auth::{hash_password, verify_password, TokenIssuer, MIN_PASSWORD_LENGTH};
use crate::domain::{Admin, AdminRole, OperationContext};
use crate::error::AppError;
use crate::store::{Store, StoreError};

use super::{authenticated, AdminProfile, AuthResult, LoginCommand, RegisterCommand};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

fn normalize_email(email: &str) -> Result<String, AppError> {
    let email = email.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !email.contains(' '),
        None => false,
    };
    if !valid {
        return Err(AppError::InvalidRequest("Invalid email address".to_string()));
    }
    Ok(email)
}

fn issue(tokens: &TokenIssuer, admin: &Admin) -> Result<AuthResult, AppError> {
    let access_token = tokens
        .issue(admin)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(AuthResult {
        access_token,
        token_type: "bearer".to_string(),
        admin: AdminProfile::from(admin),
    })
}

// =========================================================================
// RegisterHandler
// =========================================================================

/// Handler for admin self-registration
pub struct RegisterHandler {
    store: Arc<dyn Store>,
    tokens: TokenIssuer,
    allow_super_admin_signup: bool,
}

impl RegisterHandler {
    pub fn new(store: Arc<dyn Store>, tokens: TokenIssuer, allow_super_admin_signup: bool) -> Self {
        Self {
            store,
            tokens,
            allow_super_admin_signup,
        }
    }

    /// Execute the register command
    pub async fn execute(&self, command: RegisterCommand) -> Result<AuthResult, AppError> {
        let email = normalize_email(&command.email)?;

        let full_name = command.full_name.trim().to_string();
        if full_name.is_empty() {
            return Err(AppError::InvalidRequest("Full name is required".to_string()));
        }

        if command.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AppError::InvalidRequest(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }

        let role = command.role.unwrap_or_default();
        if role == AdminRole::SuperAdmin && !self.allow_super_admin_signup {
            return Err(AppError::Forbidden(
                "Super admin accounts cannot be self-registered".to_string(),
            ));
        }

        if self.store.find_admin_by_email(&email).await?.is_some() {
            return Err(AppError::EmailTaken);
        }

        let hashed_password = hash_password(&command.password)?;
        let admin = Admin::register(email, hashed_password, full_name, role);

        self.store
            .insert_admin(&admin)
            .await
            .map_err(|e| match e {
                StoreError::Duplicate(_) => AppError::EmailTaken,
                other => AppError::Store(other),
            })?;

        tracing::info!(
            admin_id = %admin.id,
            role = %admin.role,
            credits = admin.available_credits().value(),
            "Admin registered"
        );

        issue(&self.tokens, &admin)
    }
}

// =========================================================================
// LoginHandler
// =========================================================================

/// Handler for credential login
pub struct LoginHandler {
    store: Arc<dyn Store>,
    tokens: TokenIssuer,
}

impl LoginHandler {
    pub fn new(store: Arc<dyn Store>, tokens: TokenIssuer) -> Self {
        Self { store, tokens }
    }

    /// Execute the login command
    pub async fn execute(&self, command: LoginCommand) -> Result<AuthResult, AppError> {
        let email = command.email.trim().to_lowercase();

        let admin = match self.store.find_admin_by_email(&email).await? {
            Some(admin) if verify_password(&command.password, &admin.hashed_password) => admin,
            _ => return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string())),
        };

        tracing::debug!(admin_id = %admin.id, "Admin logged in");

        issue(&self.tokens, &admin)
    }
}

// =========================================================================
// AdminQueryHandler
// =========================================================================

/// Read-only admin lookups
pub struct AdminQueryHandler {
    store: Arc<dyn Store>,
}

impl AdminQueryHandler {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Profile of the calling admin
    pub async fn me(&self, context: &OperationContext) -> Result<AdminProfile, AppError> {
        let admin_id = authenticated(context)?;
        let admin = self.load(admin_id).await?;
        Ok(AdminProfile::from(&admin))
    }

    /// All admins; super-admin only
    pub async fn list(&self, context: &OperationContext) -> Result<Vec<AdminProfile>, AppError> {
        authenticated(context)?;
        if !context.is_super_admin() {
            return Err(AppError::Forbidden(
                "Only super admins can list admins".to_string(),
            ));
        }

        let admins = self.store.list_admins().await?;
        Ok(admins.iter().map(AdminProfile::from).collect())
    }

    async fn load(&self, admin_id: Uuid) -> Result<Admin, AppError> {
        self.store
            .find_admin(admin_id)
            .await?
            .ok_or(AppError::AdminNotFound(admin_id))
    }
}
