//! Dashboard aggregate
//!
//! One statement returns the global totals together with per-type quantities
//! counted over the requested scope.

use std::str::FromStr;

use am_core::{AssetStatus, AssetType};
use tracing::debug;

use crate::composer::ComposedQuery;
use crate::filters::FilterError;

/// Which assets the per-type quantities are counted over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DashboardScope {
    /// Every live asset
    #[default]
    Total,
    /// Live assets nobody holds
    Available,
    /// Assets currently held by an employee
    Distributed,
}

impl DashboardScope {
    /// Parse the `dashBoardFilter` query value; absent or empty means `Total`
    pub fn from_param(raw: Option<&str>) -> Result<Self, FilterError> {
        match raw.map(str::trim).filter(|v| !v.is_empty()) {
            None => Ok(DashboardScope::Total),
            Some(value) => value.parse(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DashboardScope::Total => "total",
            DashboardScope::Available => "available",
            DashboardScope::Distributed => "distributed",
        }
    }

    fn scoped_assets_sql(&self) -> String {
        match self {
            DashboardScope::Total => {
                "SELECT a.asset_type FROM assets a WHERE a.archived_at IS NULL".to_string()
            }
            DashboardScope::Available => format!(
                "SELECT a.asset_type FROM assets a WHERE a.archived_at IS NULL AND a.status = '{}'",
                AssetStatus::Available.as_str()
            ),
            DashboardScope::Distributed => "SELECT a.asset_type FROM assets a \
                 JOIN employee_asset_relation ear ON ear.asset_id = a.id \
                 WHERE a.archived_at IS NULL AND ear.retrieved_date IS NULL"
                .to_string(),
        }
    }
}

impl FromStr for DashboardScope {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "total" => Ok(DashboardScope::Total),
            "available" => Ok(DashboardScope::Available),
            "distributed" => Ok(DashboardScope::Distributed),
            other => Err(FilterError::UnknownDashboardScope(other.to_string())),
        }
    }
}

/// Compose the dashboard statement; it binds no parameters
pub fn compose_dashboard(scope: DashboardScope) -> ComposedQuery {
    let type_counts = AssetType::ALL
        .iter()
        .map(|t| {
            format!(
                "count(s.asset_type) FILTER (WHERE s.asset_type = '{}') AS {}",
                t.as_str(),
                t.quantity_column()
            )
        })
        .collect::<Vec<_>>()
        .join(",\n            ");

    let sql = format!(
        r#"
        WITH totals AS (
            SELECT
                (SELECT count(*) FROM assets WHERE archived_at IS NULL) AS total_assets,
                (SELECT count(*) FROM employee_asset_relation WHERE retrieved_date IS NULL) AS distributed_assets
        ),
        scoped AS (
            {scoped}
        )
        SELECT
            t.total_assets,
            t.distributed_assets,
            t.total_assets - t.distributed_assets AS available_assets,
            {type_counts}
        FROM totals t
        LEFT JOIN scoped s ON true
        GROUP BY t.total_assets, t.distributed_assets
        "#,
        scoped = scope.scoped_assets_sql(),
    );

    debug!(scope = scope.as_str(), "composed dashboard query");

    ComposedQuery {
        mode: None,
        sql,
        params: Vec::new(),
        clauses: Vec::new(),
        window: None,
    }
}
