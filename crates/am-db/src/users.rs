//! User repository
//!
//! Back-office users, their access state and login sessions.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use am_core::models::Registration;
use am_core::{UserAccessType, UserStatus};

use crate::repository::{RepositoryError, RepositoryResult};

/// Public profile of a user
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetails {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone_no: String,
    #[serde(rename = "type")]
    pub access_type: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct UserCredentials {
    pub id: Uuid,
    pub password: String,
}

/// Fields driving the login state machine
#[derive(Debug, Clone, FromRow)]
pub struct AccessState {
    pub access_type: String,
    pub authentication_times: i32,
    pub status: String,
}

impl AccessState {
    pub fn access_type(&self) -> RepositoryResult<UserAccessType> {
        self.access_type
            .parse()
            .map_err(|e: am_core::UnknownVariant| RepositoryError::Validation(e.to_string()))
    }
}

/// Row of the access list
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessedByRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(rename = "type")]
    pub access_type: String,
    pub status: String,
    pub authentication_times: i32,
    pub last_login_time: Option<DateTime<Utc>>,
}

/// User repository
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Whether a live user already uses this email and phone number
    pub async fn is_registered(&self, email: &str, phone_no: &str) -> RepositoryResult<bool> {
        let (exists,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM users
                WHERE lower(email) = lower($1) AND phone_no = $2 AND archived_at IS NULL
            )
            "#,
        )
        .bind(email)
        .bind(phone_no)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    pub async fn create(&self, registration: &Registration, password_hash: &str) -> RepositoryResult<Uuid> {
        let (id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO users (name, email, phone_no, password)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&registration.name)
        .bind(registration.email.to_lowercase())
        .bind(&registration.phone_no)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(user_id = %id, "user registered");
        Ok(id)
    }

    pub async fn find_credentials(&self, email: &str) -> RepositoryResult<Option<UserCredentials>> {
        let credentials = sqlx::query_as::<_, UserCredentials>(
            "SELECT id, password FROM users WHERE lower(email) = lower($1) AND archived_at IS NULL",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(credentials)
    }

    pub async fn find_access_state(&self, user_id: Uuid) -> RepositoryResult<AccessState> {
        sqlx::query_as::<_, AccessState>(
            "SELECT access_type, authentication_times, status FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(format!("User with id {} not found", user_id)))
    }

    /// Persist the outcome of a rejected login and bump the attempt counter
    pub async fn record_login_attempt(
        &self,
        user_id: Uuid,
        access_type: UserAccessType,
        status: UserStatus,
    ) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            UPDATE users SET
                access_type = $2,
                status = $3,
                authentication_times = authentication_times + 1,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(access_type.as_str())
        .bind(status.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn find_details(&self, user_id: Uuid) -> RepositoryResult<Option<UserDetails>> {
        let details = sqlx::query_as::<_, UserDetails>(
            r#"
            SELECT id, name, email, phone_no, access_type, status, created_at
            FROM users
            WHERE id = $1 AND archived_at IS NULL
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(details)
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        registration: &Registration,
        password_hash: &str,
    ) -> RepositoryResult<()> {
        let updated = sqlx::query(
            r#"
            UPDATE users SET
                name = $2,
                email = $3,
                phone_no = $4,
                password = $5,
                updated_at = NOW()
            WHERE id = $1 AND archived_at IS NULL
            "#,
        )
        .bind(user_id)
        .bind(&registration.name)
        .bind(registration.email.to_lowercase())
        .bind(&registration.phone_no)
        .bind(password_hash)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(RepositoryError::NotFound(format!("User with id {} not found", user_id)));
        }
        Ok(())
    }

    /// Users of one access kind, optionally narrowed by a name search
    pub async fn accessed_by(
        &self,
        access_type: UserAccessType,
        name: Option<&str>,
    ) -> RepositoryResult<Vec<AccessedByRow>> {
        let rows = sqlx::query_as::<_, AccessedByRow>(
            r#"
            SELECT
                u.id, u.name, u.email, u.access_type, u.status, u.authentication_times,
                max(s.start_time) AS last_login_time
            FROM users u
            LEFT JOIN sessions s ON s.user_id = u.id
            WHERE u.access_type = $1
              AND u.archived_at IS NULL
              AND ($2::text IS NULL OR u.name ILIKE '%' || $2 || '%')
            GROUP BY u.id
            ORDER BY u.name, u.id
            "#,
        )
        .bind(access_type.as_str())
        .bind(name)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Change a user's access kind; authorizing also clears the login warnings
    pub async fn update_access_type(
        &self,
        user_id: Uuid,
        access_type: UserAccessType,
    ) -> RepositoryResult<()> {
        let updated = sqlx::query(
            r#"
            UPDATE users SET
                access_type = $2,
                status = CASE WHEN $2 = 'authorized' THEN $3 ELSE status END,
                authentication_times = CASE WHEN $2 = 'authorized' THEN 0 ELSE authentication_times END,
                updated_at = NOW()
            WHERE id = $1 AND archived_at IS NULL
            "#,
        )
        .bind(user_id)
        .bind(access_type.as_str())
        .bind(UserStatus::WhiteListed.as_str())
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(RepositoryError::NotFound(format!("User with id {} not found", user_id)));
        }
        Ok(())
    }

    pub async fn create_session(&self, user_id: Uuid) -> RepositoryResult<Uuid> {
        let (id,): (Uuid,) =
            sqlx::query_as("INSERT INTO sessions (user_id) VALUES ($1) RETURNING id")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(id)
    }

    pub async fn has_open_session(&self, user_id: Uuid) -> RepositoryResult<bool> {
        let (open,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM sessions WHERE user_id = $1 AND end_time IS NULL)",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(open)
    }

    /// End every open session of the user, returning how many were closed
    pub async fn end_sessions(&self, user_id: Uuid) -> RepositoryResult<u64> {
        let ended = sqlx::query("UPDATE sessions SET end_time = NOW() WHERE user_id = $1 AND end_time IS NULL")
            .bind(user_id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(ended)
    }
}
