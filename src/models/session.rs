//! Visitor session model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::enums::{SessionState, VisitorKind};

/// One visitor's continuous daily presence, from arrival to departure
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VisitorSession {
    pub id: Uuid,
    /// Member identifier or daily-pass code
    pub visitor_id: String,
    pub visitor_kind: VisitorKind,
    pub display_name: String,
    pub arrived_at: DateTime<Utc>,
    /// Set exactly once, on departure
    pub departed_at: Option<DateTime<Utc>>,
    /// Set only while the session is in a facility
    pub facility_id: Option<String>,
    pub state: SessionState,
    /// Monotonic transition counter; the store only accepts a write
    /// carrying a higher revision than the row it already holds
    pub revision: i64,
}

impl VisitorSession {
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }
}

/// Session row as stored in Postgres (enums encoded as i16)
#[derive(Debug, Clone, FromRow)]
pub struct SessionRow {
    pub id: Uuid,
    pub visitor_id: String,
    pub visitor_kind: i16,
    pub display_name: String,
    pub arrived_at: DateTime<Utc>,
    pub departed_at: Option<DateTime<Utc>>,
    pub facility_id: Option<String>,
    pub state: i16,
    pub revision: i64,
}

impl From<SessionRow> for VisitorSession {
    fn from(row: SessionRow) -> Self {
        Self {
            id: row.id,
            visitor_id: row.visitor_id,
            visitor_kind: VisitorKind::from(row.visitor_kind),
            display_name: row.display_name,
            arrived_at: row.arrived_at,
            departed_at: row.departed_at,
            facility_id: row.facility_id,
            state: SessionState::from(row.state),
            revision: row.revision,
        }
    }
}

/// A visitor identity resolved by the directory, normalized from either
/// source population (members or daily passes)
#[derive(Debug, Clone)]
pub struct VisitorProfile {
    pub visitor_id: String,
    pub visitor_kind: VisitorKind,
    pub display_name: String,
}

/// Check-in request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ArriveRequest {
    /// Member identifier or daily-pass code
    #[validate(length(min = 1, message = "visitor_id must not be empty"))]
    pub visitor_id: String,
}

/// Facility selection request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SelectFacilityRequest {
    #[validate(length(min = 1, message = "facility_id must not be empty"))]
    pub facility_id: String,
}
