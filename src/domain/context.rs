//! Operation Context
//!
//! Contains metadata about the current operation for authorization and tracing.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use uuid::Uuid;

use super::AdminRole;

/// Context for an operation: who is asking, and how to correlate its logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationContext {
    /// Admin ID from the verified bearer token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_id: Option<Uuid>,

    /// Role claimed by the verified bearer token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<AdminRole>,

    /// Correlation ID for request tracing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<Uuid>,

    /// Client IP address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_ip: Option<IpAddr>,
}

impl OperationContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self {
            admin_id: None,
            role: None,
            correlation_id: None,
            client_ip: None,
        }
    }

    /// Create context for an authenticated admin
    pub fn with_admin(mut self, admin_id: Uuid, role: AdminRole) -> Self {
        self.admin_id = Some(admin_id);
        self.role = Some(role);
        self
    }

    /// Create context with correlation ID
    pub fn with_correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }

    /// Create context with client IP
    pub fn with_client_ip(mut self, ip: IpAddr) -> Self {
        self.client_ip = Some(ip);
        self
    }

    /// Generate a new correlation ID if not present
    pub fn ensure_correlation_id(&mut self) -> Uuid {
        *self.correlation_id.get_or_insert_with(Uuid::new_v4)
    }

    pub fn is_super_admin(&self) -> bool {
        self.role == Some(AdminRole::SuperAdmin)
    }

    /// True if the caller owns `owner_id` or holds the super-admin role
    pub fn can_access(&self, owner_id: Uuid) -> bool {
        self.admin_id == Some(owner_id) || self.is_super_admin()
    }
}

impl Default for OperationContext {
    fn default() -> Self {
        Self::new()
    }
}
