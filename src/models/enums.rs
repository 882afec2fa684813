//! Shared domain enums

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ---------------------------------------------------------------------------
// VisitorKind
// ---------------------------------------------------------------------------

/// The two visitor populations tracked by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[repr(i16)]
pub enum VisitorKind {
    Member = 1,
    DailyPass = 2,
}

impl From<i16> for VisitorKind {
    fn from(v: i16) -> Self {
        match v {
            2 => VisitorKind::DailyPass,
            _ => VisitorKind::Member,
        }
    }
}

impl From<VisitorKind> for i16 {
    fn from(k: VisitorKind) -> Self {
        k as i16
    }
}

impl std::fmt::Display for VisitorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            VisitorKind::Member => "Member",
            VisitorKind::DailyPass => "Daily pass",
        };
        write!(f, "{}", label)
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Lifecycle state of one visitor's daily presence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[repr(i16)]
pub enum SessionState {
    Arrived = 1,
    InFacility = 2,
    Departed = 3,
}

impl SessionState {
    /// Active means the visitor is still on the premises
    pub fn is_active(self) -> bool {
        matches!(self, SessionState::Arrived | SessionState::InFacility)
    }
}

impl From<i16> for SessionState {
    fn from(v: i16) -> Self {
        match v {
            2 => SessionState::InFacility,
            3 => SessionState::Departed,
            _ => SessionState::Arrived,
        }
    }
}

impl From<SessionState> for i16 {
    fn from(s: SessionState) -> Self {
        s as i16
    }
}

// ---------------------------------------------------------------------------
// OperationalStatus
// ---------------------------------------------------------------------------

/// Operational status of a facility, set by staff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[repr(i16)]
pub enum OperationalStatus {
    Available = 1,
    Maintenance = 2,
    Cleaning = 3,
}

impl OperationalStatus {
    /// Maintenance and cleaning both reject joins outright
    pub fn accepts_joins(self) -> bool {
        matches!(self, OperationalStatus::Available)
    }
}

impl From<i16> for OperationalStatus {
    fn from(v: i16) -> Self {
        match v {
            2 => OperationalStatus::Maintenance,
            3 => OperationalStatus::Cleaning,
            _ => OperationalStatus::Available,
        }
    }
}

impl From<OperationalStatus> for i16 {
    fn from(s: OperationalStatus) -> Self {
        s as i16
    }
}

// ---------------------------------------------------------------------------
// DisplayStatus
// ---------------------------------------------------------------------------

/// Dashboard status band derived from operational status and usage.
///
/// This banding is the single source of truth: every surface that shows a
/// facility status goes through [`DisplayStatus::classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum DisplayStatus {
    Available,
    Moderate,
    Busy,
    Full,
    Maintenance,
    Cleaning,
}

impl DisplayStatus {
    /// Classify a facility for display. Operational status overrides usage;
    /// otherwise bands are Full (>=90), Busy (>=70), Moderate (>=40),
    /// Available (<40).
    pub fn classify(operational: OperationalStatus, usage_percent: f64) -> Self {
        match operational {
            OperationalStatus::Maintenance => DisplayStatus::Maintenance,
            OperationalStatus::Cleaning => DisplayStatus::Cleaning,
            OperationalStatus::Available => {
                if usage_percent >= 90.0 {
                    DisplayStatus::Full
                } else if usage_percent >= 70.0 {
                    DisplayStatus::Busy
                } else if usage_percent >= 40.0 {
                    DisplayStatus::Moderate
                } else {
                    DisplayStatus::Available
                }
            }
        }
    }
}

impl std::fmt::Display for DisplayStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            DisplayStatus::Available => "Available",
            DisplayStatus::Moderate => "Moderate",
            DisplayStatus::Busy => "Busy",
            DisplayStatus::Full => "Full",
            DisplayStatus::Maintenance => "Maintenance",
            DisplayStatus::Cleaning => "Cleaning",
        };
        write!(f, "{}", label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banding_thresholds() {
        let op = OperationalStatus::Available;
        assert_eq!(DisplayStatus::classify(op, 0.0), DisplayStatus::Available);
        assert_eq!(DisplayStatus::classify(op, 39.9), DisplayStatus::Available);
        assert_eq!(DisplayStatus::classify(op, 40.0), DisplayStatus::Moderate);
        assert_eq!(DisplayStatus::classify(op, 70.0), DisplayStatus::Busy);
        assert_eq!(DisplayStatus::classify(op, 89.9), DisplayStatus::Busy);
        assert_eq!(DisplayStatus::classify(op, 90.0), DisplayStatus::Full);
        assert_eq!(DisplayStatus::classify(op, 100.0), DisplayStatus::Full);
    }

    #[test]
    fn test_operational_status_overrides_usage() {
        assert_eq!(
            DisplayStatus::classify(OperationalStatus::Maintenance, 0.0),
            DisplayStatus::Maintenance
        );
        assert_eq!(
            DisplayStatus::classify(OperationalStatus::Cleaning, 95.0),
            DisplayStatus::Cleaning
        );
    }

    #[test]
    fn test_nine_of_ten_is_full_not_busy() {
        // capacity=10, occupants=9 -> 90% must be Full
        assert_eq!(
            DisplayStatus::classify(OperationalStatus::Available, 90.0),
            DisplayStatus::Full
        );
        // capacity=10, occupants=4 -> 40% must be Moderate
        assert_eq!(
            DisplayStatus::classify(OperationalStatus::Available, 40.0),
            DisplayStatus::Moderate
        );
    }
}
