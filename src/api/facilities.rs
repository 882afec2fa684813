//! Facility API endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::AppResult,
    models::facility::{FacilitySnapshot, UpdateFacilityStatusRequest},
};

/// List all facilities with live occupancy
#[utoipa::path(
    get,
    path = "/facilities",
    tag = "facilities",
    responses(
        (status = 200, description = "Facility snapshots", body = Vec<FacilitySnapshot>)
    )
)]
pub async fn list_facilities(
    State(state): State<crate::AppState>,
) -> Json<Vec<FacilitySnapshot>> {
    Json(state.services.facilities.list())
}

/// Get one facility with live occupancy
#[utoipa::path(
    get,
    path = "/facilities/{id}",
    tag = "facilities",
    params(("id" = String, Path, description = "Facility ID")),
    responses(
        (status = 200, description = "Facility snapshot", body = FacilitySnapshot),
        (status = 404, description = "Unknown facility", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_facility(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<FacilitySnapshot>> {
    Ok(Json(state.services.facilities.get(&id)?))
}

/// Change a facility's operational status
#[utoipa::path(
    put,
    path = "/facilities/{id}/status",
    tag = "facilities",
    params(("id" = String, Path, description = "Facility ID")),
    request_body = UpdateFacilityStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = FacilitySnapshot),
        (status = 404, description = "Unknown facility", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_facility_status(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
    Json(data): Json<UpdateFacilityStatusRequest>,
) -> AppResult<Json<FacilitySnapshot>> {
    let snapshot = state
        .services
        .facilities
        .set_status(&id, data.operational_status)
        .await?;
    Ok(Json(snapshot))
}
