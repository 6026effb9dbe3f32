//! Asset repository
//!
//! Fixed-shape statements for the asset lifecycle: creation with its
//! type-specific specification row, updates, assignment to employees,
//! retrieval, reassignment and archiving.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use am_core::models::{
    AssetArchive, AssetSpecification, AssetUpdate, Assignment, NewAsset, Reassignment, Retrieval,
    WarrantyUpdate,
};
use am_core::{AssetStatus, AssetType, EmployeeStatus};

use crate::repository::{RepositoryError, RepositoryResult};

/// Asset with the columns of its specification table
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetDetails {
    pub id: Uuid,
    pub brand: String,
    pub model: String,
    pub serial_no: String,
    pub asset_type: String,
    pub purchased_date: DateTime<Utc>,
    pub warranty_start_date: DateTime<Utc>,
    pub warranty_expiry_date: DateTime<Utc>,
    pub owned_by: String,
    pub client_name: Option<String>,
    pub status: String,
    pub archived_at: Option<DateTime<Utc>>,
    pub archive_reason: Option<String>,
    pub deleted_by: Option<Uuid>,
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

/// One holder of an asset, newest first
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeHistoryRow {
    pub employee_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone_no: String,
    pub assigned_date: DateTime<Utc>,
    pub assigned_by: Option<String>,
    pub retrieved_date: Option<DateTime<Utc>>,
    pub retrieval_reason: Option<String>,
}

/// Unassigned asset offered for assignment
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableAsset {
    pub id: Uuid,
    pub brand: String,
    pub model: String,
    pub serial_no: String,
    #[serde(rename = "imei1")]
    pub imei_1: Option<String>,
    pub sim_no: Option<String>,
}

/// Filters of the available-by-brand lookup; `None` leaves a column unconstrained
#[derive(Debug, Clone, Default)]
pub struct AvailabilityFilter {
    pub brand: Option<String>,
    pub asset_type: Option<AssetType>,
    pub model: Option<String>,
}

/// Asset repository
pub struct AssetRepository {
    pool: PgPool,
}

impl AssetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert an asset and its specification row in one transaction
    pub async fn create(&self, asset: &NewAsset, created_by: Uuid) -> RepositoryResult<Uuid> {
        let mut tx = self.pool.begin().await?;

        let (id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO assets (
                brand, model, serial_no, asset_type, purchased_date,
                warranty_start_date, warranty_expiry_date, owned_by, client_name, created_by
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(&asset.brand)
        .bind(&asset.model)
        .bind(&asset.serial_no)
        .bind(asset.asset_type.as_str())
        .bind(asset.purchased_date)
        .bind(asset.warranty_start_date)
        .bind(asset.warranty_expiry_date)
        .bind(asset.owned_by.as_str())
        .bind(&asset.client_name)
        .bind(created_by)
        .fetch_one(&mut *tx)
        .await?;

        upsert_specification(&mut tx, id, asset.asset_type, &asset.specification).await?;
        tx.commit().await?;

        tracing::info!(asset_id = %id, asset_type = %asset.asset_type, "asset created");
        Ok(id)
    }

    /// Asset with its specification columns, including archived assets
    pub async fn find_specification(&self, id: Uuid) -> RepositoryResult<Option<AssetDetails>> {
        let details = sqlx::query_as::<_, AssetDetails>(
            r#"
            SELECT
                a.id, a.brand, a.model, a.serial_no, a.asset_type, a.purchased_date,
                a.warranty_start_date, a.warranty_expiry_date, a.owned_by, a.client_name,
                a.status, a.archived_at, a.archive_reason, a.deleted_by,
                ls.series,
                ls.processor,
                COALESCE(ls.ram, ms.ram) AS ram,
                ls.operating_system,
                COALESCE(ls.charger, false) AS charger,
                ls.screen_resolution,
                COALESCE(ls.storage, pds.storage, hds.storage) AS storage,
                ms.os_type,
                ms.imei_1,
                ms.imei_2,
                ss.sim_no,
                ss.phone_no
            FROM assets a
            LEFT JOIN laptop_specifications ls ON ls.asset_id = a.id
            LEFT JOIN pen_drive_specifications pds ON pds.asset_id = a.id
            LEFT JOIN hard_disk_specifications hds ON hds.asset_id = a.id
            LEFT JOIN mobile_specifications ms ON ms.asset_id = a.id
            LEFT JOIN sim_specifications ss ON ss.asset_id = a.id
            WHERE a.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(details)
    }

    /// Update a live asset and its specification; the asset type cannot change
    pub async fn update(&self, update: &AssetUpdate) -> RepositoryResult<()> {
        let mut tx = self.pool.begin().await?;

        let stored_type: Option<(String,)> = sqlx::query_as(
            r#"
            UPDATE assets SET
                brand = $2,
                model = $3,
                serial_no = $4,
                purchased_date = $5,
                warranty_start_date = $6,
                warranty_expiry_date = $7,
                updated_at = NOW()
            WHERE id = $1 AND archived_at IS NULL
            RETURNING asset_type
            "#,
        )
        .bind(update.id)
        .bind(&update.brand)
        .bind(&update.model)
        .bind(&update.serial_no)
        .bind(update.purchased_date)
        .bind(update.warranty_start_date)
        .bind(update.warranty_expiry_date)
        .fetch_optional(&mut *tx)
        .await?;

        let (stored_type,) = stored_type
            .ok_or_else(|| RepositoryError::NotFound(format!("Asset with id {} not found", update.id)))?;
        if stored_type != update.asset_type.as_str() {
            return Err(RepositoryError::Validation(format!(
                "asset type cannot change from {} to {}",
                stored_type, update.asset_type
            )));
        }

        upsert_specification(&mut tx, update.id, update.asset_type, &update.specification).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Hand an available asset to an active employee
    pub async fn assign(&self, assignment: &Assignment, assigned_by: Uuid) -> RepositoryResult<()> {
        let mut tx = self.pool.begin().await?;

        ensure_active_employee(&mut tx, assignment.employee_id).await?;

        let updated = sqlx::query(
            r#"
            UPDATE assets SET status = $2, updated_at = NOW()
            WHERE id = $1 AND status = $3 AND archived_at IS NULL
            "#,
        )
        .bind(assignment.asset_id)
        .bind(AssetStatus::Assigned.as_str())
        .bind(AssetStatus::Available.as_str())
        .execute(&mut *tx)
        .await?
        .rows_affected();
        if updated == 0 {
            return Err(RepositoryError::Conflict(format!(
                "Asset {} is not available for assignment",
                assignment.asset_id
            )));
        }

        open_relation(
            &mut tx,
            assignment.employee_id,
            assignment.asset_id,
            assignment.assigned_date,
            assigned_by,
        )
        .await?;
        tx.commit().await?;

        tracing::info!(
            asset_id = %assignment.asset_id,
            employee_id = %assignment.employee_id,
            "asset assigned"
        );
        Ok(())
    }

    /// Close the employee's open relation and make the asset available again
    pub async fn retrieve(&self, retrieval: &Retrieval, retrieved_by: Uuid) -> RepositoryResult<()> {
        let mut tx = self.pool.begin().await?;

        let closed = sqlx::query(
            r#"
            UPDATE employee_asset_relation SET
                retrieved_date = $3,
                retrieval_reason = $4,
                retrieved_by = $5
            WHERE asset_id = $1 AND employee_id = $2 AND retrieved_date IS NULL
            "#,
        )
        .bind(retrieval.asset_id)
        .bind(retrieval.employee_id)
        .bind(retrieval.retrieved_date)
        .bind(&retrieval.retrieval_reason)
        .bind(retrieved_by)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        if closed == 0 {
            return Err(RepositoryError::NotFound(format!(
                "Asset {} is not held by employee {}",
                retrieval.asset_id, retrieval.employee_id
            )));
        }

        sqlx::query("UPDATE assets SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(retrieval.asset_id)
            .bind(AssetStatus::Available.as_str())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    /// Move an assigned asset to another employee; it stays `assigned`
    pub async fn reassign(&self, reassignment: &Reassignment, by: Uuid) -> RepositoryResult<()> {
        let mut tx = self.pool.begin().await?;

        ensure_active_employee(&mut tx, reassignment.employee_id).await?;

        let closed = sqlx::query(
            r#"
            UPDATE employee_asset_relation SET
                retrieved_date = $2,
                retrieval_reason = $3,
                retrieved_by = $4
            WHERE asset_id = $1 AND retrieved_date IS NULL
            "#,
        )
        .bind(reassignment.asset_id)
        .bind(reassignment.retrieved_date)
        .bind(&reassignment.retrieval_reason)
        .bind(by)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        if closed == 0 {
            return Err(RepositoryError::NotFound(format!(
                "Asset {} is not assigned to anyone",
                reassignment.asset_id
            )));
        }

        open_relation(
            &mut tx,
            reassignment.employee_id,
            reassignment.asset_id,
            reassignment.assigned_date,
            by,
        )
        .await?;

        sqlx::query("UPDATE assets SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(reassignment.asset_id)
            .bind(AssetStatus::Assigned.as_str())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    /// Live, unassigned assets matching the given brand, type and model
    pub async fn available_for_assignment(
        &self,
        filter: &AvailabilityFilter,
    ) -> RepositoryResult<Vec<AvailableAsset>> {
        let rows = sqlx::query_as::<_, AvailableAsset>(
            r#"
            SELECT a.id, a.brand, a.model, a.serial_no, ms.imei_1, ss.sim_no
            FROM assets a
            LEFT JOIN mobile_specifications ms ON ms.asset_id = a.id
            LEFT JOIN sim_specifications ss ON ss.asset_id = a.id
            WHERE a.status = $1
              AND a.archived_at IS NULL
              AND ($2::text IS NULL OR lower(a.brand) = lower($2))
              AND ($3::text IS NULL OR a.asset_type = $3)
              AND ($4::text IS NULL OR a.model = $4)
            ORDER BY a.brand, a.model, a.id
            "#,
        )
        .bind(AssetStatus::Available.as_str())
        .bind(&filter.brand)
        .bind(filter.asset_type.map(|t| t.as_str()))
        .bind(&filter.model)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Everyone who held the asset, latest relation first
    pub async fn employee_history(&self, asset_id: Uuid) -> RepositoryResult<Vec<EmployeeHistoryRow>> {
        let rows = sqlx::query_as::<_, EmployeeHistoryRow>(
            r#"
            SELECT
                e.id AS employee_id, e.name, e.email, e.phone_no,
                ear.assigned_date,
                u.name AS assigned_by,
                ear.retrieved_date,
                ear.retrieval_reason
            FROM employee_asset_relation ear
            JOIN employees e ON e.id = ear.employee_id
            LEFT JOIN users u ON u.id = ear.assigned_by
            WHERE ear.asset_id = $1
            ORDER BY ear.retrieved_date DESC NULLS FIRST, ear.assigned_date DESC
            "#,
        )
        .bind(asset_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn update_warranty(&self, update: &WarrantyUpdate) -> RepositoryResult<()> {
        let updated = sqlx::query(
            r#"
            UPDATE assets SET
                warranty_start_date = $2,
                warranty_expiry_date = $3,
                updated_at = NOW()
            WHERE id = $1 AND archived_at IS NULL
            "#,
        )
        .bind(update.asset_id)
        .bind(update.warranty_start_date)
        .bind(update.warranty_expiry_date)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(RepositoryError::NotFound(format!(
                "Asset with id {} not found",
                update.asset_id
            )));
        }
        Ok(())
    }

    /// Number of relations of the asset that are still open
    pub async fn open_relation_count(&self, asset_id: Uuid) -> RepositoryResult<i64> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM employee_asset_relation WHERE asset_id = $1 AND retrieved_date IS NULL",
        )
        .bind(asset_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Soft-delete an unassigned asset and drop its specification row
    pub async fn archive(&self, archive: &AssetArchive, deleted_by: Uuid) -> RepositoryResult<()> {
        let mut tx = self.pool.begin().await?;

        let locked: Option<(String,)> = sqlx::query_as(
            "SELECT status FROM assets WHERE id = $1 AND asset_type = $2 AND archived_at IS NULL FOR UPDATE",
        )
        .bind(archive.id)
        .bind(archive.asset_type.as_str())
        .fetch_optional(&mut *tx)
        .await?;
        let (status,) = locked
            .ok_or_else(|| RepositoryError::NotFound(format!("Asset with id {} not found", archive.id)))?;
        if status == AssetStatus::Assigned.as_str() {
            return Err(RepositoryError::Conflict(format!(
                "Asset {} is assigned and must be retrieved first",
                archive.id
            )));
        }

        sqlx::query(
            r#"
            UPDATE assets SET
                status = $2,
                archived_at = NOW(),
                archive_reason = $3,
                deleted_by = $4
            WHERE id = $1
            "#,
        )
        .bind(archive.id)
        .bind(AssetStatus::Deleted.as_str())
        .bind(&archive.delete_reason)
        .bind(deleted_by)
        .execute(&mut *tx)
        .await?;

        if let Some(table) = archive.asset_type.specification_table() {
            sqlx::query(&format!("DELETE FROM {table} WHERE asset_id = $1"))
                .bind(archive.id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        tracing::info!(asset_id = %archive.id, "asset archived");
        Ok(())
    }
}

async fn ensure_active_employee(conn: &mut PgConnection, employee_id: Uuid) -> RepositoryResult<()> {
    let status: Option<(String,)> =
        sqlx::query_as("SELECT status FROM employees WHERE id = $1 AND archived_at IS NULL")
            .bind(employee_id)
            .fetch_optional(&mut *conn)
            .await?;

    match status {
        None => Err(RepositoryError::NotFound(format!(
            "Employee with id {} not found",
            employee_id
        ))),
        Some((status,)) if status != EmployeeStatus::Active.as_str() => {
            Err(RepositoryError::Conflict(format!(
                "Employee {} is {} and cannot receive assets",
                employee_id, status
            )))
        }
        Some(_) => Ok(()),
    }
}

async fn open_relation(
    conn: &mut PgConnection,
    employee_id: Uuid,
    asset_id: Uuid,
    assigned_date: DateTime<Utc>,
    assigned_by: Uuid,
) -> RepositoryResult<()> {
    sqlx::query(
        r#"
        INSERT INTO employee_asset_relation (employee_id, asset_id, assigned_date, assigned_by)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(employee_id)
    .bind(asset_id)
    .bind(assigned_date)
    .bind(assigned_by)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Insert or replace the specification row for the asset's type
async fn upsert_specification(
    conn: &mut PgConnection,
    asset_id: Uuid,
    asset_type: AssetType,
    spec: &AssetSpecification,
) -> RepositoryResult<()> {
    match asset_type {
        AssetType::Laptop => {
            sqlx::query(
                r#"
                INSERT INTO laptop_specifications (
                    asset_id, series, processor, ram, operating_system,
                    charger, screen_resolution, storage
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                ON CONFLICT (asset_id) DO UPDATE SET
                    series = EXCLUDED.series,
                    processor = EXCLUDED.processor,
                    ram = EXCLUDED.ram,
                    operating_system = EXCLUDED.operating_system,
                    charger = EXCLUDED.charger,
                    screen_resolution = EXCLUDED.screen_resolution,
                    storage = EXCLUDED.storage
                "#,
            )
            .bind(asset_id)
            .bind(&spec.series)
            .bind(&spec.processor)
            .bind(&spec.ram)
            .bind(&spec.operating_system)
            .bind(spec.charger)
            .bind(&spec.screen_resolution)
            .bind(&spec.storage)
            .execute(&mut *conn)
            .await?;
        }
        AssetType::PenDrive | AssetType::HardDisk => {
            let table = if asset_type == AssetType::PenDrive {
                "pen_drive_specifications"
            } else {
                "hard_disk_specifications"
            };
            sqlx::query(&format!(
                "INSERT INTO {table} (asset_id, storage) VALUES ($1, $2) \
                 ON CONFLICT (asset_id) DO UPDATE SET storage = EXCLUDED.storage"
            ))
            .bind(asset_id)
            .bind(&spec.storage)
            .execute(&mut *conn)
            .await?;
        }
        AssetType::Mobile => {
            sqlx::query(
                r#"
                INSERT INTO mobile_specifications (asset_id, os_type, imei_1, imei_2, ram)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (asset_id) DO UPDATE SET
                    os_type = EXCLUDED.os_type,
                    imei_1 = EXCLUDED.imei_1,
                    imei_2 = EXCLUDED.imei_2,
                    ram = EXCLUDED.ram
                "#,
            )
            .bind(asset_id)
            .bind(&spec.os_type)
            .bind(&spec.imei_1)
            .bind(&spec.imei_2)
            .bind(&spec.ram)
            .execute(&mut *conn)
            .await?;
        }
        AssetType::Sim => {
            sqlx::query(
                r#"
                INSERT INTO sim_specifications (asset_id, sim_no, phone_no)
                VALUES ($1, $2, $3)
                ON CONFLICT (asset_id) DO UPDATE SET
                    sim_no = EXCLUDED.sim_no,
                    phone_no = EXCLUDED.phone_no
                "#,
            )
            .bind(asset_id)
            .bind(&spec.sim_no)
            .bind(&spec.phone_no)
            .execute(&mut *conn)
            .await?;
        }
        AssetType::Mouse => {}
    }
    Ok(())
}
