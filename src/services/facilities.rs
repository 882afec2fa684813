//! Facilities service

use std::sync::Arc;

use crate::engine::OccupancyEngine;
use crate::error::AppResult;
use crate::models::enums::OperationalStatus;
use crate::models::facility::FacilitySnapshot;
use crate::repository::Repository;

#[derive(Clone)]
pub struct FacilitiesService {
    engine: Arc<OccupancyEngine>,
    repository: Repository,
}

impl FacilitiesService {
    pub fn new(engine: Arc<OccupancyEngine>, repository: Repository) -> Self {
        Self { engine, repository }
    }

    /// Live snapshots of all facilities
    pub fn list(&self) -> Vec<FacilitySnapshot> {
        self.engine.facility_snapshots()
    }

    /// Live snapshot of one facility
    pub fn get(&self, facility_id: &str) -> AppResult<FacilitySnapshot> {
        self.engine.facility_snapshot(facility_id)
    }

    /// Change a facility's operational status, durably and on the live
    /// ledger. Occupants already inside stay put.
    pub async fn set_status(
        &self,
        facility_id: &str,
        status: OperationalStatus,
    ) -> AppResult<FacilitySnapshot> {
        self.repository
            .facilities
            .update_status(facility_id, status)
            .await?;
        self.engine.set_operational_status(facility_id, status)
    }
}
