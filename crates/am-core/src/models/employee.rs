//! Employee request models
//!
//! Table: employees

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::validate_phone_no;
use crate::types::EmployeeStatus;

/// Body of `POST /employee`; an existing email is updated in place
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployee {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    /// Employment kind, e.g. `full_time` or `intern`
    #[serde(rename = "type")]
    #[validate(length(min = 1))]
    pub employee_type: String,
    #[validate(email)]
    pub email: String,
    #[validate(custom = "validate_phone_no")]
    pub phone_no: String,
}

/// Body of `PUT /employee`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeUpdate {
    pub id: Uuid,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[serde(rename = "type")]
    #[validate(length(min = 1))]
    pub employee_type: String,
    #[validate(email)]
    pub email: String,
    #[validate(custom = "validate_phone_no")]
    pub phone_no: String,
    #[serde(default)]
    pub status: EmployeeStatus,
}

/// Body of `DELETE /employee/:id`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeArchive {
    #[validate(length(min = 1))]
    pub archive_reason: String,
}
