//! Domain enums shared by every layer
//!
//! All of them are stored as plain `TEXT` columns; `as_str` yields the stored value.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Primary key type for all tables
pub type Id = uuid::Uuid;

/// Kind of hardware tracked by the inventory
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AssetType {
    #[serde(rename = "laptop")]
    Laptop,
    #[serde(rename = "pen drive")]
    PenDrive,
    #[serde(rename = "hard disk")]
    HardDisk,
    #[serde(rename = "mouse")]
    Mouse,
    #[serde(rename = "mobile")]
    Mobile,
    #[serde(rename = "sim")]
    Sim,
}

impl AssetType {
    pub const ALL: [AssetType; 6] = [
        AssetType::Laptop,
        AssetType::PenDrive,
        AssetType::HardDisk,
        AssetType::Mouse,
        AssetType::Mobile,
        AssetType::Sim,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Laptop => "laptop",
            AssetType::PenDrive => "pen drive",
            AssetType::HardDisk => "hard disk",
            AssetType::Mouse => "mouse",
            AssetType::Mobile => "mobile",
            AssetType::Sim => "sim",
        }
    }

    /// Column alias used for this type in dashboard aggregates
    pub fn quantity_column(&self) -> &'static str {
        match self {
            AssetType::Laptop => "laptop_quantity",
            AssetType::PenDrive => "pen_drive_quantity",
            AssetType::HardDisk => "hard_disk_quantity",
            AssetType::Mouse => "mouse_quantity",
            AssetType::Mobile => "mobile_quantity",
            AssetType::Sim => "sim_quantity",
        }
    }

    /// Table holding the type-specific columns; mice have none
    pub fn specification_table(&self) -> Option<&'static str> {
        match self {
            AssetType::Laptop => Some("laptop_specifications"),
            AssetType::PenDrive => Some("pen_drive_specifications"),
            AssetType::HardDisk => Some("hard_disk_specifications"),
            AssetType::Mobile => Some("mobile_specifications"),
            AssetType::Sim => Some("sim_specifications"),
            AssetType::Mouse => None,
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing one of the domain enums from text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value:?}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl FromStr for AssetType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AssetType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "asset type",
                value: s.to_string(),
            })
    }
}

/// Lifecycle state of an asset
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AssetStatus {
    Available,
    Assigned,
    Deleted,
}

impl AssetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetStatus::Available => "available",
            AssetStatus::Assigned => "assigned",
            AssetStatus::Deleted => "deleted",
        }
    }
}

/// Employment state of an employee
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    #[default]
    Active,
    Deleted,
    NotAnEmployee,
}

impl EmployeeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmployeeStatus::Active => "active",
            EmployeeStatus::Deleted => "deleted",
            EmployeeStatus::NotAnEmployee => "not_an_employee",
        }
    }

    /// Whether an employee may move into this status while still holding assets
    pub fn allows_held_assets(&self) -> bool {
        matches!(self, EmployeeStatus::Active)
    }
}

/// Access level of a back-office user
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserAccessType {
    Authorized,
    #[default]
    Unauthorized,
    Blocked,
}

impl UserAccessType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserAccessType::Authorized => "authorized",
            UserAccessType::Unauthorized => "unauthorized",
            UserAccessType::Blocked => "blocked",
        }
    }
}

impl FromStr for UserAccessType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "authorized" => Ok(UserAccessType::Authorized),
            "unauthorized" => Ok(UserAccessType::Unauthorized),
            "blocked" => Ok(UserAccessType::Blocked),
            other => Err(UnknownVariant {
                kind: "user access type",
                value: other.to_string(),
            }),
        }
    }
}

/// Listing state of a back-office user, driven by login attempts
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    #[default]
    WhiteListed,
    BlackListed,
    Warned,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::WhiteListed => "white_listed",
            UserStatus::BlackListed => "black_listed",
            UserStatus::Warned => "warned",
        }
    }
}

/// Who owns an asset
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OwnedBy {
    #[default]
    RemoteState,
    Client,
}

impl OwnedBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            OwnedBy::RemoteState => "remote_state",
            OwnedBy::Client => "client",
        }
    }
}
