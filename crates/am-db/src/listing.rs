//! Listing executor
//!
//! Runs the statements composed by `am-queries` and assembles result pages.
//! Store access sits behind `ListingStore` so the page assembly can be
//! exercised without a database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use sqlx::{FromRow, PgPool, Postgres};
use tracing::debug;
use uuid::Uuid;

use am_queries::{
    compose_dashboard, ComposedQuery, DashboardScope, FilterSpec, ListingMode, QueryComposer,
    SqlParam,
};

use crate::repository::{CountedRow, RepositoryResult, ResultPage};

/// Asset listing row
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRow {
    #[serde(skip)]
    pub total_count: i64,
    pub id: Uuid,
    pub brand: String,
    pub model: String,
    pub serial_no: String,
    pub asset_type: String,
    pub purchased_date: DateTime<Utc>,
    pub warranty_start_date: DateTime<Utc>,
    pub warranty_expiry_date: DateTime<Utc>,
    pub status: String,
    pub assigned_to_id: Option<Uuid>,
    pub assigned_to: Option<String>,
}

impl CountedRow for AssetRow {
    fn total_count(&self) -> i64 {
        self.total_count
    }
}

/// Employee listing row
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRow {
    #[serde(skip)]
    pub total_count: i64,
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone_no: String,
    pub status: String,
    #[serde(rename = "type")]
    pub employee_type: String,
    pub archived_at: Option<DateTime<Utc>>,
    pub archive_reason: Option<String>,
    pub deleted_by: Option<Uuid>,
    /// Assets currently held
    pub asset_quantity: i64,
}

impl CountedRow for EmployeeRow {
    fn total_count(&self) -> i64 {
        self.total_count
    }
}

/// Dashboard aggregate
#[derive(Debug, Clone, Default, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetQuantitySummary {
    pub total_assets: i64,
    pub distributed_assets: i64,
    pub available_assets: i64,
    pub laptop_quantity: i64,
    pub pen_drive_quantity: i64,
    pub hard_disk_quantity: i64,
    pub mouse_quantity: i64,
    pub mobile_quantity: i64,
    pub sim_quantity: i64,
}

/// Executes a composed statement and decodes the rows
#[async_trait]
pub trait ListingStore: Send + Sync {
    async fn fetch_assets(&self, query: &ComposedQuery) -> RepositoryResult<Vec<AssetRow>>;

    async fn fetch_employees(&self, query: &ComposedQuery) -> RepositoryResult<Vec<EmployeeRow>>;

    async fn fetch_quantities(&self, query: &ComposedQuery)
        -> RepositoryResult<AssetQuantitySummary>;
}

/// `ListingStore` backed by the Postgres pool
#[derive(Clone)]
pub struct PgListingStore {
    pool: PgPool,
}

impl PgListingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Bind the composed parameters in placeholder order
fn bind_params<'q, O>(
    query: QueryAs<'q, Postgres, O, PgArguments>,
    params: &[SqlParam],
) -> QueryAs<'q, Postgres, O, PgArguments> {
    params.iter().fold(query, |query, param| match param {
        SqlParam::Text(value) => query.bind(value.clone()),
        SqlParam::TextArray(values) => query.bind(values.clone()),
        SqlParam::Int(value) => query.bind(*value),
        SqlParam::BigInt(value) => query.bind(*value),
        SqlParam::Uuid(value) => query.bind(*value),
    })
}

#[async_trait]
impl ListingStore for PgListingStore {
    async fn fetch_assets(&self, query: &ComposedQuery) -> RepositoryResult<Vec<AssetRow>> {
        let rows = bind_params(sqlx::query_as::<_, AssetRow>(&query.sql), &query.params)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn fetch_employees(&self, query: &ComposedQuery) -> RepositoryResult<Vec<EmployeeRow>> {
        let rows = bind_params(sqlx::query_as::<_, EmployeeRow>(&query.sql), &query.params)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn fetch_quantities(
        &self,
        query: &ComposedQuery,
    ) -> RepositoryResult<AssetQuantitySummary> {
        let summary = bind_params(
            sqlx::query_as::<_, AssetQuantitySummary>(&query.sql),
            &query.params,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(summary)
    }
}

/// Listing operations exposed to the HTTP layer
pub struct ListingExecutor<S> {
    store: S,
}

impl<S: ListingStore> ListingExecutor<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Live assets, not constrained by status
    pub async fn list_assets(&self, spec: &FilterSpec) -> RepositoryResult<ResultPage<AssetRow>> {
        self.asset_page(ListingMode::AssetDefault, spec).await
    }

    /// Assets matching the status flags of `spec`
    pub async fn list_assets_filtered(
        &self,
        spec: &FilterSpec,
    ) -> RepositoryResult<ResultPage<AssetRow>> {
        self.asset_page(ListingMode::AssetFiltered, spec).await
    }

    /// Dispatch to the filtered listing when any status flag is set
    pub async fn list_asset_page(
        &self,
        spec: &FilterSpec,
    ) -> RepositoryResult<ResultPage<AssetRow>> {
        match ListingMode::for_assets(spec) {
            ListingMode::AssetFiltered => self.list_assets_filtered(spec).await,
            _ => self.list_assets(spec).await,
        }
    }

    pub async fn list_employees(
        &self,
        spec: &FilterSpec,
    ) -> RepositoryResult<ResultPage<EmployeeRow>> {
        let query = QueryComposer::new(ListingMode::Employee).compose(spec);
        let rows = self.store.fetch_employees(&query).await?;
        debug!(rows = rows.len(), "employee listing fetched");
        Ok(ResultPage::from_counted_rows(rows))
    }

    pub async fn dashboard_counts(
        &self,
        scope: DashboardScope,
    ) -> RepositoryResult<AssetQuantitySummary> {
        let query = compose_dashboard(scope);
        self.store.fetch_quantities(&query).await
    }

    async fn asset_page(
        &self,
        mode: ListingMode,
        spec: &FilterSpec,
    ) -> RepositoryResult<ResultPage<AssetRow>> {
        let query = QueryComposer::new(mode).compose(spec);
        let rows = self.store.fetch_assets(&query).await?;
        debug!(?mode, rows = rows.len(), "asset listing fetched");
        Ok(ResultPage::from_counted_rows(rows))
    }
}
