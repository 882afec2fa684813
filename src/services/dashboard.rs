//! Dashboard service

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use crate::engine::hub::{DashboardHub, HubMessage};
use crate::engine::OccupancyEngine;
use crate::models::visit::{DashboardSnapshot, TodayStats, UnifiedVisit};

#[derive(Clone)]
pub struct DashboardService {
    engine: Arc<OccupancyEngine>,
    hub: Arc<DashboardHub>,
}

impl DashboardService {
    pub fn new(engine: Arc<OccupancyEngine>, hub: Arc<DashboardHub>) -> Self {
        Self { engine, hub }
    }

    /// Last published snapshot (never blocks on the engine or the store)
    pub fn latest(&self) -> Arc<DashboardSnapshot> {
        self.hub.latest()
    }

    /// Today's unified visit list, freshly reconciled
    pub fn today_visits(&self) -> Vec<UnifiedVisit> {
        self.engine.snapshot().visits
    }

    /// Today's aggregate statistics, freshly reconciled
    pub fn today_stats(&self) -> TodayStats {
        self.engine.snapshot().stats
    }

    /// Subscribe a dashboard: current snapshot, then future updates
    pub fn subscribe(
        &self,
    ) -> (
        Arc<DashboardSnapshot>,
        broadcast::Receiver<Arc<DashboardSnapshot>>,
    ) {
        self.hub.subscribe()
    }

    /// Resolve one receiver item, replacing missed deltas with a full resync
    pub fn resolve(
        &self,
        item: Result<Arc<DashboardSnapshot>, BroadcastStreamRecvError>,
    ) -> HubMessage {
        self.hub.resolve(item)
    }
}
