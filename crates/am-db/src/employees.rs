//! Employee repository

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use am_core::models::{EmployeeUpdate, NewEmployee};
use am_core::EmployeeStatus;

use crate::repository::{RepositoryError, RepositoryResult};

/// One asset an employee holds or held, latest relation first
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetHistoryRow {
    pub asset_id: Uuid,
    pub brand: String,
    pub model: String,
    pub serial_no: String,
    pub asset_type: String,
    pub assigned_date: DateTime<Utc>,
    pub retrieved_date: Option<DateTime<Utc>>,
    pub retrieval_reason: Option<String>,
}

/// Employee repository
pub struct EmployeeRepository {
    pool: PgPool,
}

impl EmployeeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create an employee, or refresh and reactivate the one with the same email
    pub async fn create(&self, employee: &NewEmployee, created_by: Uuid) -> RepositoryResult<Uuid> {
        let (id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO employees (name, email, phone_no, employee_type, status, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (email) DO UPDATE SET
                name = EXCLUDED.name,
                phone_no = EXCLUDED.phone_no,
                employee_type = EXCLUDED.employee_type,
                status = EXCLUDED.status,
                archived_at = NULL,
                archive_reason = NULL,
                deleted_by = NULL,
                updated_at = NOW()
            RETURNING id
            "#,
        )
        .bind(&employee.name)
        .bind(employee.email.to_lowercase())
        .bind(&employee.phone_no)
        .bind(&employee.employee_type)
        .bind(EmployeeStatus::Active.as_str())
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(employee_id = %id, "employee saved");
        Ok(id)
    }

    /// Update a live employee; leaving active status requires holding no assets
    pub async fn update(&self, update: &EmployeeUpdate) -> RepositoryResult<()> {
        let mut tx = self.pool.begin().await?;

        lock_live_employee(&mut tx, update.id).await?;
        if !update.status.allows_held_assets() {
            let held = count_open_relations(&mut tx, update.id).await?;
            if held > 0 {
                return Err(RepositoryError::Conflict(format!(
                    "Employee {} still holds {} asset(s)",
                    update.id, held
                )));
            }
        }

        sqlx::query(
            r#"
            UPDATE employees SET
                name = $2,
                email = $3,
                phone_no = $4,
                employee_type = $5,
                status = $6,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(update.id)
        .bind(&update.name)
        .bind(update.email.to_lowercase())
        .bind(&update.phone_no)
        .bind(&update.employee_type)
        .bind(update.status.as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Number of assets the employee currently holds
    pub async fn open_relation_count(&self, employee_id: Uuid) -> RepositoryResult<i64> {
        let mut conn = self.pool.acquire().await?;
        count_open_relations(&mut conn, employee_id).await
    }

    /// Soft-delete an employee who holds no assets
    pub async fn archive(
        &self,
        employee_id: Uuid,
        reason: &str,
        deleted_by: Uuid,
    ) -> RepositoryResult<()> {
        let mut tx = self.pool.begin().await?;

        lock_live_employee(&mut tx, employee_id).await?;
        let held = count_open_relations(&mut tx, employee_id).await?;
        if held > 0 {
            return Err(RepositoryError::Conflict(format!(
                "Employee {} still holds {} asset(s)",
                employee_id, held
            )));
        }

        sqlx::query(
            r#"
            UPDATE employees SET
                status = $2,
                archived_at = NOW(),
                archive_reason = $3,
                deleted_by = $4
            WHERE id = $1
            "#,
        )
        .bind(employee_id)
        .bind(EmployeeStatus::Deleted.as_str())
        .bind(reason)
        .bind(deleted_by)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!(employee_id = %employee_id, "employee archived");
        Ok(())
    }

    /// Every asset the employee held, open relations first
    pub async fn asset_history(&self, employee_id: Uuid) -> RepositoryResult<Vec<AssetHistoryRow>> {
        let rows = sqlx::query_as::<_, AssetHistoryRow>(
            r#"
            SELECT
                a.id AS asset_id, a.brand, a.model, a.serial_no, a.asset_type,
                ear.assigned_date, ear.retrieved_date, ear.retrieval_reason
            FROM employee_asset_relation ear
            JOIN assets a ON a.id = ear.asset_id
            WHERE ear.employee_id = $1
            ORDER BY ear.retrieved_date DESC NULLS FIRST, ear.assigned_date DESC
            "#,
        )
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

async fn lock_live_employee(conn: &mut sqlx::PgConnection, employee_id: Uuid) -> RepositoryResult<()> {
    sqlx::query("SELECT id FROM employees WHERE id = $1 AND archived_at IS NULL FOR UPDATE")
        .bind(employee_id)
        .fetch_optional(&mut *conn)
        .await?
        .map(|_| ())
        .ok_or_else(|| RepositoryError::NotFound(format!("Employee with id {} not found", employee_id)))
}

async fn count_open_relations(conn: &mut sqlx::PgConnection, employee_id: Uuid) -> RepositoryResult<i64> {
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM employee_asset_relation WHERE employee_id = $1 AND retrieved_date IS NULL",
    )
    .bind(employee_id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(count)
}
