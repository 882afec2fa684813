//! Facility capacity ledger
//!
//! Authoritative per-facility occupant tracking. Join and leave are only
//! ever called with the engine lock held, which makes them atomic per
//! facility (and in fact across facilities).

use std::collections::HashSet;

use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::enums::DisplayStatus;
use crate::models::facility::{Facility, FacilitySnapshot};
use crate::models::OperationalStatus;

use super::events::ChangeEvent;
use super::OccupancyEngine;

pub struct FacilityLedger {
    pub meta: Facility,
    pub occupants: HashSet<Uuid>,
}

impl FacilityLedger {
    pub fn new(meta: Facility) -> Self {
        Self {
            meta,
            occupants: HashSet::new(),
        }
    }

    pub fn occupancy(&self) -> i64 {
        self.occupants.len() as i64
    }

    pub fn usage_percent(&self) -> f64 {
        // Misconfigured capacity reads as saturated rather than dividing by zero
        if self.meta.capacity <= 0 {
            return 100.0;
        }
        self.occupants.len() as f64 / self.meta.capacity as f64 * 100.0
    }

    /// Add a session to the occupant set.
    ///
    /// Rejected when the facility does not accept joins (maintenance or
    /// cleaning) or when usage is already at or past the full threshold.
    /// Capacity is advisory, not a hard ceiling: the threshold check reads
    /// usage before the join, so a facility can legitimately sit at 100%.
    pub fn try_join(&mut self, session_id: Uuid, full_threshold_percent: f64) -> AppResult<()> {
        if !self.meta.operational_status.accepts_joins() {
            return Err(AppError::FacilityUnavailable(format!(
                "{} is closed ({})",
                self.meta.name,
                match self.meta.operational_status {
                    OperationalStatus::Maintenance => "maintenance",
                    OperationalStatus::Cleaning => "cleaning",
                    OperationalStatus::Available => "unavailable",
                }
            )));
        }
        if self.occupants.contains(&session_id) {
            // Duplicate join signal, already inside
            return Ok(());
        }
        if self.usage_percent() >= full_threshold_percent {
            return Err(AppError::FacilityUnavailable(format!(
                "{} is full",
                self.meta.name
            )));
        }
        self.occupants.insert(session_id);
        Ok(())
    }

    /// Remove a session from the occupant set. Leaving a facility the
    /// session is not recorded in is a no-op, not an error: duplicate and
    /// late departure signals from unreliable clients are expected.
    pub fn leave(&mut self, session_id: Uuid) -> bool {
        self.occupants.remove(&session_id)
    }

    pub fn snapshot(&self) -> FacilitySnapshot {
        let usage_percent = self.usage_percent();
        FacilitySnapshot {
            facility_id: self.meta.id.clone(),
            name: self.meta.name.clone(),
            capacity: self.meta.capacity,
            occupancy: self.occupancy(),
            usage_percent,
            operational_status: self.meta.operational_status,
            status: DisplayStatus::classify(self.meta.operational_status, usage_percent),
        }
    }
}

impl OccupancyEngine {
    /// Change a facility's operational status on the live ledger.
    /// Occupants already inside stay; only new joins are affected.
    pub fn set_operational_status(
        &self,
        facility_id: &str,
        status: OperationalStatus,
    ) -> AppResult<FacilitySnapshot> {
        let snapshot = {
            let mut state = self.lock_state();
            let ledger = state.facilities.get_mut(facility_id).ok_or_else(|| {
                AppError::NotFound(format!("Facility '{}' not found", facility_id))
            })?;
            ledger.meta.operational_status = status;
            ledger.snapshot()
        };
        tracing::info!(facility_id, status = ?status, "Facility operational status changed");
        self.emit(ChangeEvent::FacilityStatusChanged {
            facility_id: facility_id.to_string(),
        });
        Ok(snapshot)
    }
}
