//! Business logic services

pub mod attendance;
pub mod dashboard;
pub mod directory;
pub mod facilities;

use std::sync::Arc;

use crate::engine::{hub::DashboardHub, OccupancyEngine};
use crate::repository::Repository;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub attendance: attendance::AttendanceService,
    pub facilities: facilities::FacilitiesService,
    pub dashboard: dashboard::DashboardService,
    pub directory: directory::DirectoryService,
    pub repository: Repository,
}

impl Services {
    /// Create all services around the shared engine, hub and repository
    pub fn new(
        repository: Repository,
        engine: Arc<OccupancyEngine>,
        hub: Arc<DashboardHub>,
    ) -> Self {
        let directory = directory::DirectoryService::new(repository.clone());
        Self {
            attendance: attendance::AttendanceService::new(
                engine.clone(),
                repository.clone(),
                directory.clone(),
            ),
            facilities: facilities::FacilitiesService::new(engine.clone(), repository.clone()),
            dashboard: dashboard::DashboardService::new(engine, hub),
            directory,
            repository,
        }
    }
}
