//! Command Handlers module
//!
//! Handlers validate a command against the caller's context, drive the
//! domain types and persist the outcome through the store.

mod auth_handler;
mod commands;
mod credit_query_handler;
mod grant_handler;
mod locks;
mod publish_handler;
mod wedding_handler;


use uuid::Uuid;

use crate::domain::OperationContext;
use crate::error::AppError;

pub use auth_handler::{AdminQueryHandler, LoginHandler, RegisterHandler};
pub use commands::*;
pub use credit_query_handler::CreditQueryHandler;
pub use grant_handler::GrantCreditsHandler;
pub use locks::AdminLocks;
pub use publish_handler::PublishHandler;
pub use wedding_handler::WeddingHandler;

/// Admin ID of the caller, or `Unauthorized`
pub(crate) fn authenticated(context: &OperationContext) -> Result<Uuid, AppError> {
    context
        .admin_id
        .ok_or_else(|| AppError::Unauthorized("Not authenticated".to_string()))
}
