//! Login access state machine
//!
//! Unauthorized users are warned on their first login attempt and blocked
//! on the next one. Blocked users stay rejected until re-authorized.

use am_core::{UserAccessType, UserStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginDecision {
    /// Credentials accepted, issue a token
    Allow,
    /// First attempt by an unauthorized user
    Warn,
    /// Repeated attempt by an unauthorized user
    Block,
    /// User was blocked earlier
    Blocked,
}

impl LoginDecision {
    pub fn evaluate(access_type: UserAccessType, authentication_times: i32) -> Self {
        match (access_type, authentication_times) {
            (UserAccessType::Authorized, _) => LoginDecision::Allow,
            (UserAccessType::Unauthorized, n) if n <= 0 => LoginDecision::Warn,
            (UserAccessType::Unauthorized, _) => LoginDecision::Block,
            (UserAccessType::Blocked, _) => LoginDecision::Blocked,
        }
    }

    /// State to persist on the user row, if the decision changes it
    pub fn transition(&self) -> Option<(UserAccessType, UserStatus)> {
        match self {
            LoginDecision::Warn => Some((UserAccessType::Unauthorized, UserStatus::Warned)),
            LoginDecision::Block => Some((UserAccessType::Blocked, UserStatus::BlackListed)),
            LoginDecision::Allow | LoginDecision::Blocked => None,
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, LoginDecision::Allow)
    }

    pub fn message(&self) -> &'static str {
        match self {
            LoginDecision::Allow => "login successful",
            LoginDecision::Warn => "you are not authorized yet, another attempt will block your account",
            LoginDecision::Block => "you are not authorized, your account has been blocked",
            LoginDecision::Blocked => "your account is blocked",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_table() {
        assert_eq!(LoginDecision::evaluate(UserAccessType::Authorized, 0), LoginDecision::Allow);
        assert_eq!(LoginDecision::evaluate(UserAccessType::Authorized, 7), LoginDecision::Allow);
        assert_eq!(LoginDecision::evaluate(UserAccessType::Unauthorized, 0), LoginDecision::Warn);
        assert_eq!(LoginDecision::evaluate(UserAccessType::Unauthorized, 1), LoginDecision::Block);
        assert_eq!(LoginDecision::evaluate(UserAccessType::Blocked, 0), LoginDecision::Blocked);
    }

    #[test]
    fn test_transitions() {
        assert_eq!(
            LoginDecision::Warn.transition(),
            Some((UserAccessType::Unauthorized, UserStatus::Warned))
        );
        assert_eq!(
            LoginDecision::Block.transition(),
            Some((UserAccessType::Blocked, UserStatus::BlackListed))
        );
        assert_eq!(LoginDecision::Allow.transition(), None);
        assert_eq!(LoginDecision::Blocked.transition(), None);
        assert!(LoginDecision::Allow.is_allowed());
        assert!(!LoginDecision::Warn.is_allowed());
    }
}
