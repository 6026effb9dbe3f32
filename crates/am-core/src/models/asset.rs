//! Asset request models
//!
//! Table: assets, plus one specification table per asset type

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::types::{AssetType, OwnedBy};

/// Type-specific columns; only the ones relevant to the asset type are stored
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AssetSpecification {
    pub series: Option<String>,
    pub processor: Option<String>,
    pub ram: Option<String>,
    pub operating_system: Option<String>,
    pub charger: bool,
    pub screen_resolution: Option<String>,
    pub storage: Option<String>,
    pub os_type: Option<String>,
    #[serde(rename = "imei1")]
    pub imei_1: Option<String>,
    #[serde(rename = "imei2")]
    pub imei_2: Option<String>,
    pub sim_no: Option<String>,
    pub phone_no: Option<String>,
}

/// Body of `POST /asset`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_new_asset_dates", skip_on_field_errors = false))]
pub struct NewAsset {
    #[validate(length(min = 1, max = 255))]
    pub brand: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub serial_no: String,
    pub asset_type: AssetType,
    pub purchased_date: DateTime<Utc>,
    pub warranty_start_date: DateTime<Utc>,
    pub warranty_expiry_date: DateTime<Utc>,
    #[serde(default)]
    pub owned_by: OwnedBy,
    pub client_name: Option<String>,
    #[serde(flatten)]
    pub specification: AssetSpecification,
}

fn validate_new_asset_dates(asset: &NewAsset) -> Result<(), ValidationError> {
    check_warranty_window(asset.warranty_start_date, asset.warranty_expiry_date)
}

/// Body of `PUT /asset`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_asset_update_dates", skip_on_field_errors = false))]
pub struct AssetUpdate {
    pub id: Uuid,
    #[validate(length(min = 1, max = 255))]
    pub brand: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub serial_no: String,
    pub asset_type: AssetType,
    pub purchased_date: DateTime<Utc>,
    pub warranty_start_date: DateTime<Utc>,
    pub warranty_expiry_date: DateTime<Utc>,
    #[serde(flatten)]
    pub specification: AssetSpecification,
}

fn validate_asset_update_dates(asset: &AssetUpdate) -> Result<(), ValidationError> {
    check_warranty_window(asset.warranty_start_date, asset.warranty_expiry_date)
}

/// Body of `PUT /asset/warranty`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_warranty_update", skip_on_field_errors = false))]
pub struct WarrantyUpdate {
    pub asset_id: Uuid,
    pub warranty_start_date: DateTime<Utc>,
    pub warranty_expiry_date: DateTime<Utc>,
}

fn validate_warranty_update(update: &WarrantyUpdate) -> Result<(), ValidationError> {
    check_warranty_window(update.warranty_start_date, update.warranty_expiry_date)
}

fn check_warranty_window(
    start: DateTime<Utc>,
    expiry: DateTime<Utc>,
) -> Result<(), ValidationError> {
    if expiry < start {
        let mut error = ValidationError::new("warranty_window");
        error.message = Some("warranty expiry date precedes its start date".into());
        return Err(error);
    }
    Ok(())
}

/// Body of `POST /employee/asset`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub employee_id: Uuid,
    pub asset_id: Uuid,
    pub assigned_date: DateTime<Utc>,
}

/// Body of `PUT /asset/retrieve-asset`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Retrieval {
    pub asset_id: Uuid,
    pub employee_id: Uuid,
    pub retrieved_date: DateTime<Utc>,
    #[validate(length(min = 1))]
    pub retrieval_reason: String,
}

/// Body of `POST /asset/reassign`: closes the open relation and opens one for `employee_id`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Reassignment {
    pub asset_id: Uuid,
    pub employee_id: Uuid,
    pub retrieved_date: DateTime<Utc>,
    #[validate(length(min = 1))]
    pub retrieval_reason: String,
    pub assigned_date: DateTime<Utc>,
}

/// Body of `DELETE /asset`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AssetArchive {
    pub id: Uuid,
    pub asset_type: AssetType,
    #[validate(length(min = 1))]
    pub delete_reason: String,
}
