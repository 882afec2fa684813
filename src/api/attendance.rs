//! Attendance API endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::session::{ArriveRequest, SelectFacilityRequest, VisitorSession},
    models::visit::UnifiedVisit,
};

/// Check a visitor in
#[utoipa::path(
    post,
    path = "/attendance/arrivals",
    tag = "attendance",
    request_body = ArriveRequest,
    responses(
        (status = 201, description = "Session created", body = VisitorSession),
        (status = 404, description = "Unknown visitor", body = crate::error::ErrorResponse),
        (status = 409, description = "Visitor already checked in", body = crate::error::ErrorResponse)
    )
)]
pub async fn arrive(
    State(state): State<crate::AppState>,
    Json(data): Json<ArriveRequest>,
) -> AppResult<(StatusCode, Json<VisitorSession>)> {
    data.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let session = state.services.attendance.check_in(&data.visitor_id).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// Move a session into a facility
#[utoipa::path(
    post,
    path = "/attendance/sessions/{id}/facility",
    tag = "attendance",
    params(("id" = Uuid, Path, description = "Session ID")),
    request_body = SelectFacilityRequest,
    responses(
        (status = 200, description = "Session moved", body = VisitorSession),
        (status = 404, description = "Unknown session or facility", body = crate::error::ErrorResponse),
        (status = 409, description = "Session already departed", body = crate::error::ErrorResponse),
        (status = 422, description = "Facility full, in maintenance or cleaning", body = crate::error::ErrorResponse)
    )
)]
pub async fn select_facility(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
    Json(data): Json<SelectFacilityRequest>,
) -> AppResult<Json<VisitorSession>> {
    data.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let session = state
        .services
        .attendance
        .select_facility(id, &data.facility_id)
        .await?;
    Ok(Json(session))
}

/// Check a session out
#[utoipa::path(
    post,
    path = "/attendance/sessions/{id}/depart",
    tag = "attendance",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Session departed", body = VisitorSession),
        (status = 404, description = "Unknown session", body = crate::error::ErrorResponse),
        (status = 409, description = "Session already departed", body = crate::error::ErrorResponse)
    )
)]
pub async fn depart(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<VisitorSession>> {
    let session = state.services.attendance.depart(id).await?;
    Ok(Json(session))
}

/// Today's unified visit list
#[utoipa::path(
    get,
    path = "/attendance/sessions",
    tag = "attendance",
    responses(
        (status = 200, description = "Today's visits, departed included", body = Vec<UnifiedVisit>)
    )
)]
pub async fn list_sessions(
    State(state): State<crate::AppState>,
) -> Json<Vec<UnifiedVisit>> {
    Json(state.services.dashboard.today_visits())
}
