//! Authentication
//!
//! Password hashing and bearer tokens.

pub mod password;
pub mod token;

pub use password::{hash_password, verify_password, PasswordError, MIN_PASSWORD_LENGTH};
pub use token::{Claims, TokenError, TokenIssuer};
