//! Back-office user request models
//!
//! Table: users

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::validate_phone_no;
use crate::types::UserAccessType;

/// Body of `POST /user/register` and `PUT /user/info`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(custom = "validate_phone_no")]
    pub phone_no: String,
    #[validate(length(min = 6))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

impl LoginRequest {
    /// Whether the email's domain equals `domain` (case-insensitive)
    pub fn has_domain(&self, domain: &str) -> bool {
        self.email
            .rsplit_once('@')
            .map(|(_, d)| d.eq_ignore_ascii_case(domain))
            .unwrap_or(false)
    }
}

/// Body of `PUT /user/accessed-by`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AccessUpdate {
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub access_type: UserAccessType,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn login(email: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: "secret".to_string(),
        }
    }

    #[test]
    fn test_login_domain_check() {
        assert!(login("dev@remotestate.com").has_domain("remotestate.com"));
        assert!(login("dev@RemoteState.com").has_domain("remotestate.com"));
        assert!(!login("dev@gmail.com").has_domain("remotestate.com"));
        assert!(!login("remotestate.com").has_domain("remotestate.com"));
    }

    #[test]
    fn test_registration_password_length() {
        let registration = Registration {
            name: "Ops".to_string(),
            email: "ops@remotestate.com".to_string(),
            phone_no: "9876543210".to_string(),
            password: "12345".to_string(),
        };
        let errors = registration.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
    }
}
