//! # am-auth
//!
//! Authentication for Asset Management RS.
//!
//! - JWT issuing and validation
//! - Argon2 password hashing
//! - The login access state machine

pub mod access;
pub mod jwt;
pub mod password;

pub use access::LoginDecision;
pub use jwt::{extract_token, Claims, JwtError, JwtService};
pub use password::{hash_password, verify_password, PasswordError};
