//! Asset handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use am_core::models::{AssetArchive, AssetUpdate, NewAsset, Reassignment, Retrieval, WarrantyUpdate};
use am_core::AssetType;
use am_db::{AssetDetails, AssetRow, AvailabilityFilter, AvailableAsset, EmployeeHistoryRow, ResultPage};

use super::{CreatedResponse, MessageResponse};
use crate::error::{ApiError, ApiResult};
use crate::extractors::{AppState, AuthenticatedUser, Filters, QueryParams, ValidatedJson};

/// POST /user/asset
pub async fn create_asset(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedJson(asset): ValidatedJson<NewAsset>,
) -> ApiResult<impl IntoResponse> {
    let id = state.assets().create(&asset, user.id()).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse::new("asset created", id))))
}

/// PUT /user/asset
pub async fn update_asset(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    ValidatedJson(update): ValidatedJson<AssetUpdate>,
) -> ApiResult<Json<MessageResponse>> {
    state.assets().update(&update).await?;
    Ok(Json(MessageResponse::new("asset updated")))
}

/// GET /user/asset
///
/// Any of `available`, `assigned` or `deleted` switches to the filtered listing,
/// which also reaches archived assets.
pub async fn list_assets(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Filters(spec): Filters,
) -> ApiResult<Json<ResultPage<AssetRow>>> {
    let page = state.listings().list_asset_page(&spec).await?;
    Ok(Json(page))
}

/// DELETE /user/asset
pub async fn archive_asset(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedJson(archive): ValidatedJson<AssetArchive>,
) -> ApiResult<Json<MessageResponse>> {
    state.assets().archive(&archive, user.id()).await?;
    Ok(Json(MessageResponse::new("asset deleted")))
}

#[derive(Debug, Deserialize)]
pub struct AssetLookup {
    #[serde(rename = "assetId", alias = "assetID")]
    pub asset_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetSpecificationResponse {
    #[serde(flatten)]
    pub asset: AssetDetails,
    pub asset_history: Vec<EmployeeHistoryRow>,
}

/// GET /user/asset/specifications?assetId=
pub async fn asset_specifications(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    QueryParams(lookup): QueryParams<AssetLookup>,
) -> ApiResult<Json<AssetSpecificationResponse>> {
    let assets = state.assets();
    let asset = assets
        .find_specification(lookup.asset_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Asset", lookup.asset_id))?;
    let asset_history = assets.employee_history(lookup.asset_id).await?;

    Ok(Json(AssetSpecificationResponse { asset, asset_history }))
}

/// POST /user/asset/reassign
pub async fn reassign_asset(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedJson(reassignment): ValidatedJson<Reassignment>,
) -> ApiResult<Json<MessageResponse>> {
    state.assets().reassign(&reassignment, user.id()).await?;
    Ok(Json(MessageResponse::new("asset reassigned")))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    pub brand: Option<String>,
    pub asset_type: Option<String>,
    pub model: Option<String>,
}

impl TryFrom<AvailabilityQuery> for AvailabilityFilter {
    type Error = ApiError;

    fn try_from(query: AvailabilityQuery) -> Result<Self, Self::Error> {
        fn present(value: Option<String>) -> Option<String> {
            value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
        }

        let asset_type = match present(query.asset_type) {
            None => None,
            Some(raw) => Some(
                raw.parse::<AssetType>()
                    .map_err(|e| ApiError::bad_request(e.to_string()))?,
            ),
        };

        Ok(AvailabilityFilter {
            brand: present(query.brand),
            asset_type,
            model: present(query.model),
        })
    }
}

/// GET /user/asset/brand?brand=&assetType=&model=
pub async fn available_assets(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    QueryParams(query): QueryParams<AvailabilityQuery>,
) -> ApiResult<Json<Vec<AvailableAsset>>> {
    let filter = AvailabilityFilter::try_from(query)?;
    let rows = state.assets().available_for_assignment(&filter).await?;
    Ok(Json(rows))
}

/// GET /user/asset/employee?assetId=
pub async fn asset_employee_history(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    QueryParams(lookup): QueryParams<AssetLookup>,
) -> ApiResult<Json<Vec<EmployeeHistoryRow>>> {
    let rows = state.assets().employee_history(lookup.asset_id).await?;
    Ok(Json(rows))
}

/// PUT /user/asset/warranty
pub async fn update_warranty(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    ValidatedJson(update): ValidatedJson<WarrantyUpdate>,
) -> ApiResult<Json<MessageResponse>> {
    state.assets().update_warranty(&update).await?;
    Ok(Json(MessageResponse::new("warranty updated")))
}

/// PUT /user/asset/retrieve-asset
pub async fn retrieve_asset(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedJson(retrieval): ValidatedJson<Retrieval>,
) -> ApiResult<Json<MessageResponse>> {
    state.assets().retrieve(&retrieval, user.id()).await?;
    Ok(Json(MessageResponse::new("asset retrieved")))
}
