//! Change events emitted by the occupancy engine

use uuid::Uuid;

/// One successful engine transition. Consumers (the reconciler) always
/// recompute from current engine state, so payloads only carry enough to
/// trace what happened.
#[derive(Debug, Clone)]
pub enum ChangeEvent {
    Arrived {
        session_id: Uuid,
    },
    FacilityEntered {
        session_id: Uuid,
        facility_id: String,
    },
    /// The session left its facility without entering a new one
    /// (failed switch rollback)
    FacilityCleared {
        session_id: Uuid,
    },
    Departed {
        session_id: Uuid,
    },
    FacilityStatusChanged {
        facility_id: String,
    },
}
