//! Alert endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::UserAuth;
use domain::models::alert::{ListAlertsQuery, ListAlertsResponse};

/// Alerts for a pet, newest first.
///
/// GET /api/v1/pets/:pet_id/alerts
pub async fn list_alerts(
    State(state): State<AppState>,
    Extension(auth): Extension<UserAuth>,
    Path(pet_id): Path<Uuid>,
    Query(query): Query<ListAlertsQuery>,
) -> Result<Json<ListAlertsResponse>, ApiError> {
    let alerts = state
        .ingest
        .list_alerts(auth.user_id, pet_id, &query)
        .await?;

    let total = alerts.len();
    Ok(Json(ListAlertsResponse { alerts, total }))
}
