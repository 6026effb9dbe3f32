//! Employee handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use am_core::models::{Assignment, EmployeeArchive, EmployeeUpdate, NewEmployee};
use am_db::{AssetHistoryRow, EmployeeRow, ResultPage};

use super::{CreatedResponse, MessageResponse};
use crate::error::{ApiError, ApiResult};
use crate::extractors::{AppState, AuthenticatedUser, Filters, QueryParams, ValidatedJson};

/// POST /user/employee
pub async fn create_employee(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedJson(employee): ValidatedJson<NewEmployee>,
) -> ApiResult<impl IntoResponse> {
    let id = state.employees().create(&employee, user.id()).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse::new("employee created", id))))
}

/// PUT /user/employee
pub async fn update_employee(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    ValidatedJson(update): ValidatedJson<EmployeeUpdate>,
) -> ApiResult<Json<MessageResponse>> {
    state.employees().update(&update).await?;
    Ok(Json(MessageResponse::new("employee updated")))
}

/// GET /user/employee
pub async fn list_employees(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Filters(spec): Filters,
) -> ApiResult<Json<ResultPage<EmployeeRow>>> {
    let page = state.listings().list_employees(&spec).await?;
    Ok(Json(page))
}

/// DELETE /user/employee/:id
pub async fn archive_employee(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(employee_id): Path<Uuid>,
    ValidatedJson(archive): ValidatedJson<EmployeeArchive>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .employees()
        .archive(employee_id, &archive.archive_reason, user.id())
        .await?;
    Ok(Json(MessageResponse::new("employee deleted")))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeInfo {
    #[serde(flatten)]
    pub employee: EmployeeRow,
    pub asset_history: Vec<AssetHistoryRow>,
}

/// GET /user/employee/:id/info
///
/// The employee's listing row, found through the exact-id filter, plus every
/// asset they held.
pub async fn employee_info(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(employee_id): Path<Uuid>,
    Filters(spec): Filters,
) -> ApiResult<Json<EmployeeInfo>> {
    let spec = spec.with_employee_id(employee_id);
    let employee = state
        .listings()
        .list_employees(&spec)
        .await?
        .rows
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::not_found("Employee", employee_id))?;
    let asset_history = state.employees().asset_history(employee_id).await?;

    Ok(Json(EmployeeInfo { employee, asset_history }))
}

/// POST /user/employee/asset
pub async fn assign_asset(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedJson(assignment): ValidatedJson<Assignment>,
) -> ApiResult<Json<MessageResponse>> {
    state.assets().assign(&assignment, user.id()).await?;
    Ok(Json(MessageResponse::new("asset assigned")))
}

#[derive(Debug, Deserialize)]
pub struct EmployeeLookup {
    #[serde(rename = "employeeId", alias = "employeeID")]
    pub employee_id: Uuid,
}

/// GET /user/employee/asset-list?employeeId=
pub async fn employee_asset_list(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    QueryParams(lookup): QueryParams<EmployeeLookup>,
) -> ApiResult<Json<Vec<AssetHistoryRow>>> {
    let rows = state.employees().asset_history(lookup.employee_id).await?;
    Ok(Json(rows))
}
