//! User handlers: login, registration, profile, access list, dashboard, logout

use axum::{extract::{Path, State}, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use am_auth::{hash_password, verify_password, LoginDecision};
use am_core::models::{AccessUpdate, LoginRequest, Registration};
use am_core::UserAccessType;
use am_db::{AccessedByRow, AssetQuantitySummary, UserDetails};
use am_queries::DashboardScope;

use super::{CreatedResponse, MessageResponse};
use crate::error::{ApiError, ApiResult};
use crate::extractors::{AppState, AuthenticatedUser, QueryParams, ValidatedJson};

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    if let Some(domain) = state.auth.allowed_email_domain.as_deref() {
        if !request.has_domain(domain) {
            tracing::warn!(email = %request.email, "login outside the allowed domain");
            return Err(ApiError::bad_request("non-authorized email"));
        }
    }

    let users = state.users();
    let credentials = users
        .find_credentials(&request.email)
        .await?
        .ok_or_else(|| ApiError::bad_request("wrong email"))?;

    if !verify_password(&request.password, &credentials.password)? {
        tracing::warn!(user_id = %credentials.id, "login with wrong password");
        return Err(ApiError::unauthorized("wrong password"));
    }

    let access = users.find_access_state(credentials.id).await?;
    let decision = LoginDecision::evaluate(access.access_type()?, access.authentication_times);
    if !decision.is_allowed() {
        if let Some((access_type, status)) = decision.transition() {
            users
                .record_login_attempt(credentials.id, access_type, status)
                .await?;
        }
        tracing::warn!(user_id = %credentials.id, ?decision, "login rejected");
        return Err(ApiError::bad_request(decision.message()));
    }

    let token = state.jwt.create_token(credentials.id)?;
    users.create_session(credentials.id).await?;
    tracing::info!(user_id = %credentials.id, "user logged in");

    Ok(Json(TokenResponse { token }))
}

/// POST /user/register
pub async fn register(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    ValidatedJson(registration): ValidatedJson<Registration>,
) -> ApiResult<impl IntoResponse> {
    let users = state.users();
    if users
        .is_registered(&registration.email, &registration.phone_no)
        .await?
    {
        return Err(ApiError::conflict("user already exists"));
    }

    let hash = hash_password(&registration.password)?;
    let id = users.create(&registration, &hash).await?;

    Ok((StatusCode::CREATED, Json(CreatedResponse::new("user registered", id))))
}

/// GET /user/info
pub async fn get_info(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<UserDetails>> {
    find_user(&state, user.id()).await
}

/// PUT /user/info
pub async fn update_info(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedJson(registration): ValidatedJson<Registration>,
) -> ApiResult<Json<MessageResponse>> {
    let hash = hash_password(&registration.password)?;
    state.users().update(user.id(), &registration, &hash).await?;
    Ok(Json(MessageResponse::new("user updated")))
}

/// GET /user/:id
pub async fn get_user(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<UserDetails>> {
    find_user(&state, user_id).await
}

async fn find_user(state: &AppState, user_id: Uuid) -> ApiResult<Json<UserDetails>> {
    state
        .users()
        .find_details(user_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("User", user_id))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessedByQuery {
    pub user_type: Option<String>,
    pub name: Option<String>,
}

impl AccessedByQuery {
    fn access_type(&self) -> ApiResult<UserAccessType> {
        match self.user_type.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            None => Ok(UserAccessType::default()),
            Some(raw) => raw
                .parse()
                .map_err(|e: am_core::UnknownVariant| ApiError::bad_request(e.to_string())),
        }
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }
}

/// GET /user/accessed-by?userType=&name=
pub async fn accessed_by(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    QueryParams(query): QueryParams<AccessedByQuery>,
) -> ApiResult<Json<Vec<AccessedByRow>>> {
    let rows = state
        .users()
        .accessed_by(query.access_type()?, query.name())
        .await?;
    Ok(Json(rows))
}

/// PUT /user/accessed-by
pub async fn update_accessed_by(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedJson(update): ValidatedJson<AccessUpdate>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .users()
        .update_access_type(update.user_id, update.access_type)
        .await?;
    tracing::info!(
        user_id = %update.user_id,
        access_type = update.access_type.as_str(),
        changed_by = %user.id(),
        "access type changed"
    );
    Ok(Json(MessageResponse::new("access type updated")))
}

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    #[serde(rename = "dashBoardFilter")]
    pub scope: Option<String>,
}

/// GET /user/dashboard?dashBoardFilter=
pub async fn dashboard(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    QueryParams(query): QueryParams<DashboardQuery>,
) -> ApiResult<Json<AssetQuantitySummary>> {
    let scope = DashboardScope::from_param(query.scope.as_deref())?;
    let summary = state.listings().dashboard_counts(scope).await?;
    Ok(Json(summary))
}

/// PUT /user/log-out
pub async fn logout(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<MessageResponse>> {
    let ended = state.users().end_sessions(user.id()).await?;
    tracing::info!(user_id = %user.id(), sessions = ended, "user logged out");
    Ok(Json(MessageResponse::new("logged out")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessed_by_query_defaults() {
        let query = AccessedByQuery::default();
        assert_eq!(query.access_type().unwrap(), UserAccessType::Unauthorized);
        assert_eq!(query.name(), None);

        let query = AccessedByQuery {
            user_type: Some("blocked".into()),
            name: Some("  ".into()),
        };
        assert_eq!(query.access_type().unwrap(), UserAccessType::Blocked);
        assert_eq!(query.name(), None);
    }

    #[test]
    fn test_accessed_by_query_rejects_unknown_type() {
        let query = AccessedByQuery {
            user_type: Some("superuser".into()),
            name: None,
        };
        let err = query.access_type().unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
