//! Real-time propagation hub
//!
//! Fans dashboard snapshots out to every connected subscriber with
//! snapshot-then-delta semantics: a new subscriber gets the latest full
//! snapshot immediately, then every published recomputation. The broadcast
//! channel is buffered per receiver, so a slow dashboard can never block a
//! mutation; a receiver that lags simply gets a fresh snapshot instead of
//! the missed deltas.

use std::sync::{Arc, RwLock};

use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use crate::models::visit::DashboardSnapshot;

/// One message bound for a subscriber
pub enum HubMessage {
    /// A published recomputation, delivered in order
    Update(Arc<DashboardSnapshot>),
    /// The subscriber lagged past its buffer: the missed deltas are
    /// replaced with the latest full snapshot
    Resync(Arc<DashboardSnapshot>),
}

pub struct DashboardHub {
    tx: broadcast::Sender<Arc<DashboardSnapshot>>,
    latest: RwLock<Arc<DashboardSnapshot>>,
}

impl DashboardHub {
    pub fn new(initial: DashboardSnapshot, subscriber_buffer: usize) -> Self {
        let (tx, _) = broadcast::channel(subscriber_buffer.max(1));
        Self {
            tx,
            latest: RwLock::new(Arc::new(initial)),
        }
    }

    /// Publish a recomputed snapshot to all subscribers. Never blocks.
    pub fn publish(&self, snapshot: DashboardSnapshot) {
        let snapshot = Arc::new(snapshot);
        *self
            .latest
            .write()
            .unwrap_or_else(|e| e.into_inner()) = snapshot.clone();
        // Err means no subscribers are connected, which is fine
        let _ = self.tx.send(snapshot);
        tracing::debug!(
            subscribers = self.tx.receiver_count(),
            "Dashboard snapshot published"
        );
    }

    /// Last published snapshot. Serves dashboard reads even when the
    /// backing store is momentarily unreachable.
    pub fn latest(&self) -> Arc<DashboardSnapshot> {
        self.latest
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Subscribe a new dashboard: the current snapshot plus a receiver for
    /// future updates. The receiver is registered before the snapshot is
    /// read, so no update published in between can be missed.
    pub fn subscribe(
        &self,
    ) -> (
        Arc<DashboardSnapshot>,
        broadcast::Receiver<Arc<DashboardSnapshot>>,
    ) {
        let rx = self.tx.subscribe();
        (self.latest(), rx)
    }

    /// Resolve one receiver item into the message to forward. A lagged
    /// receiver gets the latest full snapshot instead of the missed deltas.
    pub fn resolve(
        &self,
        item: Result<Arc<DashboardSnapshot>, BroadcastStreamRecvError>,
    ) -> HubMessage {
        match item {
            Ok(snapshot) => HubMessage::Update(snapshot),
            Err(BroadcastStreamRecvError::Lagged(missed)) => {
                tracing::debug!(missed, "Slow dashboard subscriber, resyncing with a full snapshot");
                HubMessage::Resync(self.latest())
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::visit::{KindBreakdown, TodayStats};
    use chrono::Utc;

    fn snapshot(occupancy: i64) -> DashboardSnapshot {
        DashboardSnapshot {
            generated_at: Utc::now(),
            stats: TodayStats {
                active: KindBreakdown::default(),
                today: KindBreakdown::default(),
                peak_hour: super::super::reconcile::DEFAULT_PEAK_HOUR,
                current_occupancy: occupancy,
                total_capacity: 10,
                facility_usage_percent: 0.0,
            },
            visits: Vec::new(),
            facilities: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_subscribe_gets_current_snapshot_first() {
        let hub = DashboardHub::new(snapshot(3), 8);
        let (first, _rx) = hub.subscribe();
        // A mid-day subscriber never starts blank
        assert_eq!(first.stats.current_occupancy, 3);
    }

    #[tokio::test]
    async fn test_publish_reaches_subscriber_and_updates_latest() {
        let hub = DashboardHub::new(snapshot(0), 8);
        let (_, mut rx) = hub.subscribe();
        hub.publish(snapshot(5));
        let received = rx.recv().await.unwrap();
        assert_eq!(received.stats.current_occupancy, 5);
        assert_eq!(hub.latest().stats.current_occupancy, 5);
    }

    #[tokio::test]
    async fn test_lagged_subscriber_resyncs_with_latest_snapshot() {
        use tokio_stream::{wrappers::BroadcastStream, StreamExt};

        // Buffer of 2, four updates published: the receiver missed the
        // first two and must get a fresh full snapshot instead
        let hub = DashboardHub::new(snapshot(0), 2);
        let (_, rx) = hub.subscribe();
        for i in 1..=4 {
            hub.publish(snapshot(i));
        }

        let mut stream = BroadcastStream::new(rx);
        match hub.resolve(stream.next().await.unwrap()) {
            HubMessage::Resync(snap) => assert_eq!(snap.stats.current_occupancy, 4),
            HubMessage::Update(_) => panic!("expected a resync after overflowing the buffer"),
        }
        // Delivery resumes in order from the oldest retained update
        match hub.resolve(stream.next().await.unwrap()) {
            HubMessage::Update(snap) => assert_eq!(snap.stats.current_occupancy, 3),
            HubMessage::Resync(_) => panic!("expected an in-order update after the resync"),
        }
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_does_not_fail() {
        let hub = DashboardHub::new(snapshot(0), 8);
        hub.publish(snapshot(1));
        assert_eq!(hub.latest().stats.current_occupancy, 1);
        assert_eq!(hub.subscriber_count(), 0);
    }
}
