//! Filter specification
//!
//! `FilterParams` is the raw query string as received; `FilterSpec` is the
//! validated value consumed by the composer. Parsing is the only place that can
//! reject caller input; everything downstream is infallible.

use std::collections::BTreeSet;

use am_core::AssetType;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

pub const DEFAULT_LIMIT: i64 = 10;
pub const DEFAULT_PAGE: i64 = 0;
/// Longest warranty window a listing may ask for (100 years)
pub const MAX_WARRANTY_MONTHS: i64 = 1200;

/// Caller input errors raised while parsing listing parameters
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("invalid integer for {field}: {value:?}")]
    InvalidInteger { field: &'static str, value: String },

    #[error("invalid boolean for {field}: {value:?}")]
    InvalidBoolean { field: &'static str, value: String },

    #[error("limit must be greater than zero, got {0}")]
    NonPositiveLimit(i64),

    #[error("page must not be negative, got {0}")]
    NegativePage(i64),

    #[error("warranty months must not be negative, got {0}")]
    NegativeWarranty(i64),

    #[error("warranty months must be at most {max}, got {value}")]
    WarrantyTooLarge { value: i64, max: i64 },

    #[error("page {page} with limit {limit} is out of range")]
    PageOutOfRange { limit: i64, page: i64 },

    #[error("unknown asset type: {0:?}")]
    UnknownAssetType(String),

    #[error("unknown dashboard scope: {0:?}")]
    UnknownDashboardScope(String),
}

/// Raw listing query parameters
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterParams {
    pub name: Option<String>,
    pub limit: Option<String>,
    pub page: Option<String>,
    pub pagination: Option<String>,
    pub available: Option<String>,
    pub assigned: Option<String>,
    pub deleted: Option<String>,
    pub not_an_employee: Option<String>,
    /// Comma separated asset types
    pub asset_type: Option<String>,
    /// Months until warranty expiry; `0` selects already expired assets
    pub warranty: Option<String>,
}

/// Which filters a listing request wants applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    pub pagination: bool,
    pub limit: i64,
    /// Offset multiplier: the page starts at `limit * page`
    pub page: i64,
    pub searched_name: Option<String>,
    pub asset_types: BTreeSet<AssetType>,
    pub available: bool,
    pub assigned: bool,
    pub deleted: bool,
    pub not_an_employee: bool,
    pub employee_id: Option<Uuid>,
    pub warranty_months: u32,
    pub is_expired: bool,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            pagination: true,
            limit: DEFAULT_LIMIT,
            page: DEFAULT_PAGE,
            searched_name: None,
            asset_types: BTreeSet::new(),
            available: false,
            assigned: false,
            deleted: false,
            not_an_employee: false,
            employee_id: None,
            warranty_months: 0,
            is_expired: false,
        }
    }
}

impl FilterSpec {
    /// Restrict the listing to a single employee
    pub fn with_employee_id(mut self, employee_id: Uuid) -> Self {
        self.employee_id = Some(employee_id);
        self
    }

    /// Whether any of the asset status flags is set
    pub fn has_asset_status_flag(&self) -> bool {
        self.available || self.assigned || self.deleted
    }

    /// Row offset of the page; parsing guarantees `limit * page` fits in an `i64`
    pub fn offset(&self) -> i64 {
        self.limit.saturating_mul(self.page)
    }
}

impl TryFrom<FilterParams> for FilterSpec {
    type Error = FilterError;

    fn try_from(params: FilterParams) -> Result<Self, Self::Error> {
        let mut spec = FilterSpec::default();

        if let Some(limit) = parse_int("limit", params.limit.as_deref())? {
            if limit <= 0 {
                return Err(FilterError::NonPositiveLimit(limit));
            }
            spec.limit = limit;
        }
        if let Some(page) = parse_int("page", params.page.as_deref())? {
            if page < 0 {
                return Err(FilterError::NegativePage(page));
            }
            spec.page = page;
        }
        if spec.limit.checked_mul(spec.page).is_none() {
            return Err(FilterError::PageOutOfRange {
                limit: spec.limit,
                page: spec.page,
            });
        }
        if let Some(pagination) = parse_bool("pagination", params.pagination.as_deref())? {
            spec.pagination = pagination;
        }

        spec.available = parse_bool("available", params.available.as_deref())?.unwrap_or(false);
        spec.assigned = parse_bool("assigned", params.assigned.as_deref())?.unwrap_or(false);
        spec.deleted = parse_bool("deleted", params.deleted.as_deref())?.unwrap_or(false);
        spec.not_an_employee =
            parse_bool("notAnEmployee", params.not_an_employee.as_deref())?.unwrap_or(false);

        spec.searched_name = params
            .name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        if let Some(types) = params.asset_type.as_deref() {
            spec.asset_types = parse_asset_types(types)?;
        }

        if let Some(months) = parse_int("warranty", params.warranty.as_deref())? {
            match months {
                m if m < 0 => return Err(FilterError::NegativeWarranty(m)),
                m if m > MAX_WARRANTY_MONTHS => {
                    return Err(FilterError::WarrantyTooLarge {
                        value: m,
                        max: MAX_WARRANTY_MONTHS,
                    })
                }
                0 => spec.is_expired = true,
                m => {
                    spec.warranty_months = u32::try_from(m).map_err(|_| {
                        FilterError::InvalidInteger {
                            field: "warranty",
                            value: m.to_string(),
                        }
                    })?
                }
            }
        }

        Ok(spec)
    }
}

/// Empty values count as absent
fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_int(field: &'static str, raw: Option<&str>) -> Result<Option<i64>, FilterError> {
    non_empty(raw)
        .map(|value| {
            value.parse::<i64>().map_err(|_| FilterError::InvalidInteger {
                field,
                value: value.to_string(),
            })
        })
        .transpose()
}

/// Accepts the conventional spellings `1`, `t`, `true` (any case variant listed) and their negatives
fn parse_bool(field: &'static str, raw: Option<&str>) -> Result<Option<bool>, FilterError> {
    let Some(value) = non_empty(raw) else {
        return Ok(None);
    };
    match value {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(Some(true)),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(Some(false)),
        _ => Err(FilterError::InvalidBoolean {
            field,
            value: value.to_string(),
        }),
    }
}

fn parse_asset_types(raw: &str) -> Result<BTreeSet<AssetType>, FilterError> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| {
            t.parse::<AssetType>()
                .map_err(|_| FilterError::UnknownAssetType(t.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> FilterParams {
        FilterParams::default()
    }

    #[test]
    fn test_defaults_when_nothing_supplied() {
        let spec = FilterSpec::try_from(params()).unwrap();
        assert_eq!(spec, FilterSpec::default());
        assert!(spec.pagination);
        assert_eq!(spec.limit, 10);
        assert_eq!(spec.page, 0);
        assert_eq!(spec.warranty_months, 0);
        assert!(!spec.is_expired);
    }

    #[test]
    fn test_empty_values_are_absent() {
        let spec = FilterSpec::try_from(FilterParams {
            limit: Some(String::new()),
            page: Some("  ".into()),
            name: Some("   ".into()),
            warranty: Some(String::new()),
            available: Some(String::new()),
            ..params()
        })
        .unwrap();
        assert_eq!(spec, FilterSpec::default());
    }

    #[test]
    fn test_pagination_values() {
        let spec = FilterSpec::try_from(FilterParams {
            limit: Some("25".into()),
            page: Some("2".into()),
            pagination: Some("false".into()),
            ..params()
        })
        .unwrap();
        assert_eq!(spec.limit, 25);
        assert_eq!(spec.page, 2);
        assert_eq!(spec.offset(), 50);
        assert!(!spec.pagination);
    }

    #[test]
    fn test_malformed_integers_are_rejected() {
        let err = FilterSpec::try_from(FilterParams {
            limit: Some("ten".into()),
            ..params()
        })
        .unwrap_err();
        assert_eq!(
            err,
            FilterError::InvalidInteger {
                field: "limit",
                value: "ten".into()
            }
        );

        let err = FilterSpec::try_from(FilterParams {
            limit: Some("0".into()),
            ..params()
        })
        .unwrap_err();
        assert_eq!(err, FilterError::NonPositiveLimit(0));

        let err = FilterSpec::try_from(FilterParams {
            page: Some("-1".into()),
            ..params()
        })
        .unwrap_err();
        assert_eq!(err, FilterError::NegativePage(-1));
    }

    #[test]
    fn test_boolean_spellings() {
        for truthy in ["1", "t", "T", "true", "TRUE", "True"] {
            let spec = FilterSpec::try_from(FilterParams {
                deleted: Some(truthy.into()),
                ..params()
            })
            .unwrap();
            assert!(spec.deleted, "{truthy} should parse as true");
        }
        for falsy in ["0", "f", "F", "false", "FALSE", "False"] {
            let spec = FilterSpec::try_from(FilterParams {
                deleted: Some(falsy.into()),
                ..params()
            })
            .unwrap();
            assert!(!spec.deleted, "{falsy} should parse as false");
        }

        let err = FilterSpec::try_from(FilterParams {
            not_an_employee: Some("yes".into()),
            ..params()
        })
        .unwrap_err();
        assert_eq!(
            err,
            FilterError::InvalidBoolean {
                field: "notAnEmployee",
                value: "yes".into()
            }
        );
    }

    #[test]
    fn test_warranty_branches() {
        let expired = FilterSpec::try_from(FilterParams {
            warranty: Some("0".into()),
            ..params()
        })
        .unwrap();
        assert!(expired.is_expired);
        assert_eq!(expired.warranty_months, 0);

        let within = FilterSpec::try_from(FilterParams {
            warranty: Some("3".into()),
            ..params()
        })
        .unwrap();
        assert!(!within.is_expired);
        assert_eq!(within.warranty_months, 3);

        let err = FilterSpec::try_from(FilterParams {
            warranty: Some("-2".into()),
            ..params()
        })
        .unwrap_err();
        assert_eq!(err, FilterError::NegativeWarranty(-2));
    }

    #[test]
    fn test_asset_types_csv() {
        let spec = FilterSpec::try_from(FilterParams {
            asset_type: Some("mouse, pen drive,,laptop,mouse".into()),
            ..params()
        })
        .unwrap();
        let types: Vec<_> = spec.asset_types.into_iter().collect();
        assert_eq!(
            types,
            vec![AssetType::Laptop, AssetType::PenDrive, AssetType::Mouse]
        );

        let err = FilterSpec::try_from(FilterParams {
            asset_type: Some("laptop,tablet".into()),
            ..params()
        })
        .unwrap_err();
        assert_eq!(err, FilterError::UnknownAssetType("tablet".into()));
    }

    #[test]
    fn test_name_is_trimmed() {
        let spec = FilterSpec::try_from(FilterParams {
            name: Some("  dell ".into()),
            ..params()
        })
        .unwrap();
        assert_eq!(spec.searched_name.as_deref(), Some("dell"));
    }

    #[test]
    fn test_status_flags() {
        let spec = FilterSpec::try_from(FilterParams {
            available: Some("true".into()),
            not_an_employee: Some("1".into()),
            ..params()
        })
        .unwrap();
        assert!(spec.available);
        assert!(!spec.assigned);
        assert!(spec.not_an_employee);
        assert!(spec.has_asset_status_flag());
        assert!(!FilterSpec::default().has_asset_status_flag());
    }

    #[test]
    fn test_page_overflowing_offset_is_rejected() {
        let err = FilterSpec::try_from(FilterParams {
            limit: Some(i64::MAX.to_string()),
            page: Some("2".into()),
            ..params()
        })
        .unwrap_err();
        assert_eq!(
            err,
            FilterError::PageOutOfRange {
                limit: i64::MAX,
                page: 2
            }
        );

        let spec = FilterSpec::try_from(FilterParams {
            limit: Some(i64::MAX.to_string()),
            page: Some("1".into()),
            ..params()
        })
        .unwrap();
        assert_eq!(spec.offset(), i64::MAX);
    }

    #[test]
    fn test_offset_saturates() {
        let spec = FilterSpec {
            limit: i64::MAX,
            page: 3,
            ..FilterSpec::default()
        };
        assert_eq!(spec.offset(), i64::MAX);
    }

    #[test]
    fn test_warranty_upper_bound() {
        let spec = FilterSpec::try_from(FilterParams {
            warranty: Some(MAX_WARRANTY_MONTHS.to_string()),
            ..params()
        })
        .unwrap();
        assert_eq!(spec.warranty_months, 1200);

        let err = FilterSpec::try_from(FilterParams {
            warranty: Some("2147483647".into()),
            ..params()
        })
        .unwrap_err();
        assert_eq!(
            err,
            FilterError::WarrantyTooLarge {
                value: 2_147_483_647,
                max: MAX_WARRANTY_MONTHS
            }
        );
    }
}
