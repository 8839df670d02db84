//! Domain module
//!
//! Core domain types and business logic.

pub mod admin;
pub mod amount;
pub mod context;
pub mod error;
pub mod ledger;
pub mod pricing;
pub mod publish;
pub mod wedding;

pub use admin::{Admin, AdminRole, INITIAL_CREDITS};
pub use amount::{Balance, Credits};
pub use context::OperationContext;
pub use error::DomainError;
pub use ledger::{replay, CreditLedgerEntry, CreditTransactionType, ReplayReport};
pub use pricing::{Breakdown, CostBreakdown, PriceTable, PriceTableError};
pub use publish::{credits_to_deduct, PublishMode, PublishPlan};
pub use wedding::{Slug, Wedding, WeddingStatus};
