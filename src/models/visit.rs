//! Unified visit view and today's aggregate statistics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::enums::{SessionState, VisitorKind};
use super::facility::FacilitySnapshot;

/// One row of the reconciled live view: a session that arrived today,
/// whatever its source population
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UnifiedVisit {
    pub session_id: Uuid,
    pub user_name: String,
    #[serde(rename = "type")]
    pub visitor_kind: VisitorKind,
    pub check_in_time: DateTime<Utc>,
    pub check_out_time: Option<DateTime<Utc>>,
    pub facility: Option<String>,
    pub status: SessionState,
}

/// A count split by visitor kind
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct KindBreakdown {
    pub total: i64,
    pub members: i64,
    pub day_passes: i64,
}

impl KindBreakdown {
    pub fn add(&mut self, kind: VisitorKind) {
        self.total += 1;
        match kind {
            VisitorKind::Member => self.members += 1,
            VisitorKind::DailyPass => self.day_passes += 1,
        }
    }
}

/// Today's aggregate statistics
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TodayStats {
    /// Visitors currently on the premises
    pub active: KindBreakdown,
    /// All arrivals today, departed included
    pub today: KindBreakdown,
    /// Hour-of-day bucket (0-23) with the most arrivals today
    pub peak_hour: u32,
    /// Sum of occupants across all facilities
    pub current_occupancy: i64,
    /// Sum of capacities across all facilities
    pub total_capacity: i64,
    pub facility_usage_percent: f64,
}

/// Full dashboard state: the message pushed to every subscriber
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardSnapshot {
    pub generated_at: DateTime<Utc>,
    pub stats: TodayStats,
    pub visits: Vec<UnifiedVisit>,
    pub facilities: Vec<FacilitySnapshot>,
}
