//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{attendance, dashboard, facilities, health};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Presentia API",
        version = "1.0.0",
        description = "Gym Occupancy & Attendance Engine REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html"),
        contact(name = "Presentia Team", email = "dev@presentia.fit")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Attendance
        attendance::arrive,
        attendance::select_facility,
        attendance::depart,
        attendance::list_sessions,
        // Facilities
        facilities::list_facilities,
        facilities::get_facility,
        facilities::update_facility_status,
        // Dashboard
        dashboard::get_dashboard,
        dashboard::get_stats,
        dashboard::stream_dashboard,
    ),
    components(
        schemas(
            // Attendance
            crate::models::session::VisitorSession,
            crate::models::session::ArriveRequest,
            crate::models::session::SelectFacilityRequest,
            // Facilities
            crate::models::facility::Facility,
            crate::models::facility::FacilitySnapshot,
            crate::models::facility::UpdateFacilityStatusRequest,
            // Dashboard
            crate::models::visit::UnifiedVisit,
            crate::models::visit::KindBreakdown,
            crate::models::visit::TodayStats,
            crate::models::visit::DashboardSnapshot,
            // Enums
            crate::models::enums::VisitorKind,
            crate::models::enums::SessionState,
            crate::models::enums::OperationalStatus,
            crate::models::enums::DisplayStatus,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "attendance", description = "Check-in, facility selection and check-out"),
        (name = "facilities", description = "Facility occupancy and operational status"),
        (name = "dashboard", description = "Reconciled live view and push stream")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
