//! Request models accepted by the HTTP layer
//!
//! Each model derives `Validate`; handlers run the rules before touching the store.

pub mod asset;
pub mod employee;
pub mod user;

pub use asset::*;
pub use employee::*;
pub use user::*;

use validator::ValidationError;

/// Phone numbers are exactly ten ASCII digits
pub fn validate_phone_no(value: &str) -> Result<(), ValidationError> {
    if value.len() == 10 && value.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::new("phone_no"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_phone_no() {
        assert!(validate_phone_no("9876543210").is_ok());
        assert!(validate_phone_no("98765").is_err());
        assert!(validate_phone_no("98765432ab").is_err());
        assert!(validate_phone_no("+919876543").is_err());
    }
}
