//! Axum extractors for API handlers

use axum::{
    async_trait,
    extract::{FromRef, FromRequest, FromRequestParts, Query, Request},
    http::{header::AUTHORIZATION, request::Parts},
    Json,
};
use serde::de::DeserializeOwned;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use am_auth::{extract_token, JwtService};
use am_core::config::AuthConfig;
use am_core::validate_model;
use am_db::{AssetRepository, EmployeeRepository, ListingExecutor, PgListingStore, UserRepository};
use am_queries::{FilterParams, FilterSpec};

use crate::error::ApiError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub jwt: Arc<JwtService>,
    pub auth: Arc<AuthConfig>,
}

impl AppState {
    pub fn new(pool: PgPool, auth: AuthConfig) -> Self {
        let jwt = JwtService::new(auth.jwt_secret.as_bytes(), auth.token_expiration_seconds);
        Self {
            pool,
            jwt: Arc::new(jwt),
            auth: Arc::new(auth),
        }
    }

    pub fn listings(&self) -> ListingExecutor<PgListingStore> {
        ListingExecutor::new(PgListingStore::new(self.pool.clone()))
    }

    pub fn assets(&self) -> AssetRepository {
        AssetRepository::new(self.pool.clone())
    }

    pub fn employees(&self) -> EmployeeRepository {
        EmployeeRepository::new(self.pool.clone())
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }
}

/// The user behind a valid bearer token with an open session
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser(pub Uuid);

impl AuthenticatedUser {
    pub fn id(&self) -> Uuid {
        self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(extract_token)
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

        let user_id = app_state.jwt.user_id(token)?;

        if !app_state.users().has_open_session(user_id).await? {
            tracing::debug!(user_id = %user_id, "token without an open session");
            return Err(ApiError::unauthorized("Session has ended"));
        }

        Ok(AuthenticatedUser(user_id))
    }
}

/// Listing filters parsed from the query string
#[derive(Debug, Clone)]
pub struct Filters(pub FilterSpec);

#[async_trait]
impl<S> FromRequestParts<S> for Filters
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<FilterParams>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
        Ok(Filters(FilterSpec::try_from(params)?))
    }
}

impl std::ops::Deref for Filters {
    type Target = FilterSpec;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Query string deserialized into `T`; failures answer with the API error body
#[derive(Debug, Clone)]
pub struct QueryParams<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
        Ok(QueryParams(value))
    }
}

/// JSON body that passed its `validator` rules
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
        validate_model(&value)?;
        Ok(ValidatedJson(value))
    }
}
