//! Facility model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::enums::{DisplayStatus, OperationalStatus};

/// Static facility metadata (one gym area)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Facility {
    /// Stable slug identifier (e.g. "cardio", "free-weights")
    pub id: String,
    pub name: String,
    /// Positive occupant target; advisory past the full threshold
    pub capacity: i32,
    pub operational_status: OperationalStatus,
}

/// Facility row as stored in Postgres
#[derive(Debug, Clone, FromRow)]
pub struct FacilityRow {
    pub id: String,
    pub name: String,
    pub capacity: i32,
    pub operational_status: i16,
}

impl From<FacilityRow> for Facility {
    fn from(row: FacilityRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            capacity: row.capacity,
            operational_status: OperationalStatus::from(row.operational_status),
        }
    }
}

/// Live facility view pushed to dashboards
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FacilitySnapshot {
    pub facility_id: String,
    pub name: String,
    pub capacity: i32,
    pub occupancy: i64,
    pub usage_percent: f64,
    pub operational_status: OperationalStatus,
    pub status: DisplayStatus,
}

/// Operational status update request
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateFacilityStatusRequest {
    pub operational_status: OperationalStatus,
}
