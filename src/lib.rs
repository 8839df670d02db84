//! Wedding Credits Library
//!
//! Re-exports modules for integration testing and external use.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod domain;
pub mod handlers;
pub mod store;

mod error;

pub use api::{build_router, AppState, Settings};
pub use config::{Config, ConfigError, StorageBackend};
pub use domain::{Admin, AdminRole, Balance, Credits, DomainError, OperationContext, Wedding};
pub use error::AppError;
