//! Location endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::UserAuth;
use domain::models::location::{GetHistoryQuery, HistoryResponse, PaginationInfo};
use domain::models::{LocationLog, SubmitPingRequest};

/// Submit a single location ping.
///
/// POST /api/v1/locations
pub async fn submit_location(
    State(state): State<AppState>,
    Extension(auth): Extension<UserAuth>,
    Json(request): Json<SubmitPingRequest>,
) -> Result<(StatusCode, Json<LocationLog>), ApiError> {
    let log = state.ingest.submit(auth.user_id, request).await?;
    Ok((StatusCode::CREATED, Json(log)))
}

/// Latest known location for a pet.
///
/// GET /api/v1/pets/:pet_id/locations/latest
pub async fn get_latest_location(
    State(state): State<AppState>,
    Extension(auth): Extension<UserAuth>,
    Path(pet_id): Path<Uuid>,
) -> Result<Json<LocationLog>, ApiError> {
    let log = state.ingest.get_latest(auth.user_id, pet_id).await?;
    Ok(Json(log))
}

/// Paged location history for a pet.
///
/// GET /api/v1/pets/:pet_id/locations
pub async fn get_location_history(
    State(state): State<AppState>,
    Extension(auth): Extension<UserAuth>,
    Path(pet_id): Path<Uuid>,
    Query(query): Query<GetHistoryQuery>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let page = state
        .ingest
        .get_history(auth.user_id, pet_id, &query)
        .await?;

    Ok(Json(HistoryResponse {
        locations: page.logs,
        pagination: PaginationInfo {
            next_cursor: page.next_cursor,
            has_more: page.has_more,
        },
    }))
}
