//! Visit reconciliation
//!
//! Merges the member and daily-pass session populations into one
//! time-ordered unified view and derives today's aggregate statistics. The
//! computation is a pure function of engine state; the [`Reconciler`] task
//! debounces change events so a burst of check-ins produces one consistent
//! recomputation instead of N redundant ones.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, NaiveDate, Timelike, Utc};

use crate::models::facility::FacilitySnapshot;
use crate::models::session::VisitorSession;
use crate::models::visit::{DashboardSnapshot, KindBreakdown, TodayStats, UnifiedVisit};

use super::hub::DashboardHub;
use super::OccupancyEngine;

/// Documented fallback shown before the first arrival of the day
/// (the 18:00-19:00 bucket), not a computed peak.
pub const DEFAULT_PEAK_HOUR: u32 = 18;

/// Local calendar day a timestamp belongs to
fn local_day(ts: DateTime<Utc>) -> NaiveDate {
    ts.with_timezone(&Local).date_naive()
}

/// One unified row per session arrived on `today`, departed included,
/// time-ordered by check-in
pub fn unified_visits<'a, I>(sessions: I, today: NaiveDate) -> Vec<UnifiedVisit>
where
    I: IntoIterator<Item = &'a VisitorSession>,
{
    let mut visits: Vec<UnifiedVisit> = sessions
        .into_iter()
        .filter(|s| local_day(s.arrived_at) == today)
        .map(|s| UnifiedVisit {
            session_id: s.id,
            user_name: s.display_name.clone(),
            visitor_kind: s.visitor_kind,
            check_in_time: s.arrived_at,
            check_out_time: s.departed_at,
            facility: s.facility_id.clone(),
            status: s.state,
        })
        .collect();
    visits.sort_by(|a, b| {
        a.check_in_time
            .cmp(&b.check_in_time)
            .then_with(|| a.session_id.cmp(&b.session_id))
    });
    visits
}

/// Hour-of-day bucket with the most arrivals; ties break toward the
/// earliest hour
pub fn peak_hour<I>(arrival_hours: I) -> u32
where
    I: IntoIterator<Item = u32>,
{
    let mut buckets = [0u32; 24];
    for hour in arrival_hours {
        if let Some(bucket) = buckets.get_mut(hour as usize) {
            *bucket += 1;
        }
    }
    let best = buckets.iter().copied().max().unwrap_or(0);
    if best == 0 {
        return DEFAULT_PEAK_HOUR;
    }
    buckets
        .iter()
        .position(|&count| count == best)
        .map(|h| h as u32)
        .unwrap_or(DEFAULT_PEAK_HOUR)
}

pub fn today_stats(visits: &[UnifiedVisit], facilities: &[FacilitySnapshot]) -> TodayStats {
    let mut active = KindBreakdown::default();
    let mut today = KindBreakdown::default();
    for visit in visits {
        today.add(visit.visitor_kind);
        if visit.status.is_active() {
            active.add(visit.visitor_kind);
        }
    }

    let peak = peak_hour(
        visits
            .iter()
            .map(|v| v.check_in_time.with_timezone(&Local).hour()),
    );

    let current_occupancy: i64 = facilities.iter().map(|f| f.occupancy).sum();
    let total_capacity: i64 = facilities.iter().map(|f| f.capacity as i64).sum();
    let facility_usage_percent = if total_capacity > 0 {
        current_occupancy as f64 / total_capacity as f64 * 100.0
    } else {
        0.0
    };

    TodayStats {
        active,
        today,
        peak_hour: peak,
        current_occupancy,
        total_capacity,
        facility_usage_percent,
    }
}

impl OccupancyEngine {
    /// Recompute the full dashboard state from current ledger and session
    /// state. Always consistent with the latest linearized mutation.
    pub fn snapshot(&self) -> DashboardSnapshot {
        let today = Local::now().date_naive();
        let (visits, facilities) = {
            let mut state = self.lock_state();
            state.roll_day_if_needed(today);
            let visits = unified_visits(state.sessions.values(), today);
            let mut facilities: Vec<FacilitySnapshot> =
                state.facilities.values().map(|l| l.snapshot()).collect();
            facilities.sort_by(|a, b| a.facility_id.cmp(&b.facility_id));
            (visits, facilities)
        };
        let stats = today_stats(&visits, &facilities);
        DashboardSnapshot {
            generated_at: Utc::now(),
            stats,
            visits,
            facilities,
        }
    }
}

/// Long-lived task coalescing engine change events into debounced dashboard
/// recomputations published through the hub
pub struct Reconciler {
    engine: Arc<OccupancyEngine>,
    hub: Arc<DashboardHub>,
    debounce: Duration,
}

impl Reconciler {
    pub fn new(engine: Arc<OccupancyEngine>, hub: Arc<DashboardHub>, debounce: Duration) -> Self {
        Self {
            engine,
            hub,
            debounce,
        }
    }

    pub async fn run(self) {
        use tokio::sync::broadcast::error::{RecvError, TryRecvError};

        let mut rx = self.engine.subscribe_events();
        loop {
            match rx.recv().await {
                Ok(event) => {
                    tracing::debug!(?event, "Change event received");
                }
                Err(RecvError::Lagged(missed)) => {
                    // Fine: we recompute from full state anyway
                    tracing::warn!(missed, "Reconciler lagged behind the event channel");
                }
                Err(RecvError::Closed) => break,
            }

            // Coalesce the burst: wait out the window, then drain whatever
            // else arrived so the batch yields a single recomputation
            tokio::time::sleep(self.debounce).await;
            loop {
                match rx.try_recv() {
                    Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
                    Err(_) => break,
                }
            }

            self.hub.publish(self.engine.snapshot());
        }
        tracing::info!("Reconciler stopped: engine event channel closed");
    }
}

#[cfg(test)]
mod tests {
    use super::super::EnginePolicy;
    use super::*;
    use crate::models::enums::{OperationalStatus, SessionState, VisitorKind};
    use crate::models::facility::Facility;
    use crate::models::session::VisitorProfile;
    use chrono::Duration as ChronoDuration;
    use uuid::Uuid;

    fn session(
        visitor_id: &str,
        kind: VisitorKind,
        arrived_at: DateTime<Utc>,
        state: SessionState,
        facility: Option<&str>,
    ) -> VisitorSession {
        VisitorSession {
            id: Uuid::new_v4(),
            visitor_id: visitor_id.to_string(),
            visitor_kind: kind,
            display_name: visitor_id.to_string(),
            arrived_at,
            departed_at: if state == SessionState::Departed {
                Some(arrived_at + ChronoDuration::hours(1))
            } else {
                None
            },
            facility_id: facility.map(String::from),
            state,
            revision: 1,
        }
    }

    // Anchor test clocks to local midday so hour offsets never cross a
    // day boundary regardless of when the suite runs
    fn midday() -> DateTime<Utc> {
        Local::now()
            .date_naive()
            .and_hms_opt(12, 0, 0)
            .unwrap()
            .and_local_timezone(Local)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn snapshot(id: &str, capacity: i32, occupancy: i64) -> FacilitySnapshot {
        let usage = occupancy as f64 / capacity as f64 * 100.0;
        FacilitySnapshot {
            facility_id: id.to_string(),
            name: id.to_string(),
            capacity,
            occupancy,
            usage_percent: usage,
            operational_status: OperationalStatus::Available,
            status: crate::models::enums::DisplayStatus::classify(
                OperationalStatus::Available,
                usage,
            ),
        }
    }

    #[test]
    fn test_peak_hour_default_without_arrivals() {
        assert_eq!(peak_hour(std::iter::empty()), DEFAULT_PEAK_HOUR);
    }

    #[test]
    fn test_peak_hour_ties_break_earliest() {
        assert_eq!(peak_hour([9, 10, 9, 10]), 9);
        assert_eq!(peak_hour([17, 8, 17]), 17);
    }

    #[test]
    fn test_unified_view_excludes_previous_days() {
        let now = midday();
        let today = local_day(now);
        let sessions = vec![
            session("M1", VisitorKind::Member, now, SessionState::Arrived, None),
            session(
                "M2",
                VisitorKind::Member,
                now - ChronoDuration::days(1),
                SessionState::Departed,
                None,
            ),
        ];
        let visits = unified_visits(&sessions, today);
        assert_eq!(visits.len(), 1);
        assert_eq!(visits[0].user_name, "M1");
    }

    #[test]
    fn test_unified_view_is_time_ordered() {
        let now = midday();
        let today = local_day(now);
        let sessions = vec![
            session(
                "late",
                VisitorKind::Member,
                now,
                SessionState::Arrived,
                None,
            ),
            session(
                "early",
                VisitorKind::DailyPass,
                now - ChronoDuration::minutes(30),
                SessionState::Arrived,
                None,
            ),
        ];
        let visits = unified_visits(&sessions, today);
        assert_eq!(visits[0].user_name, "early");
        assert_eq!(visits[1].user_name, "late");
    }

    #[test]
    fn test_departed_day_pass_counts_in_total_not_active() {
        // A daily-pass visitor who never selected a facility and departed:
        // in the unified view with no facility, contributing to today's
        // total but not to the active count
        let now = midday();
        let today = local_day(now);
        let sessions = vec![
            session(
                "P1",
                VisitorKind::DailyPass,
                now - ChronoDuration::hours(2),
                SessionState::Departed,
                None,
            ),
            session(
                "M1",
                VisitorKind::Member,
                now,
                SessionState::InFacility,
                Some("cardio"),
            ),
        ];
        let visits = unified_visits(&sessions, today);
        let pass_row = visits.iter().find(|v| v.user_name == "P1").unwrap();
        assert!(pass_row.facility.is_none());
        assert_eq!(pass_row.status, SessionState::Departed);
        assert!(pass_row.check_out_time.is_some());

        let stats = today_stats(&visits, &[snapshot("cardio", 10, 1)]);
        assert_eq!(stats.today.total, 2);
        assert_eq!(stats.today.day_passes, 1);
        assert_eq!(stats.active.total, 1);
        assert_eq!(stats.active.day_passes, 0);
        assert_eq!(stats.active.members, 1);
    }

    #[test]
    fn test_capacity_aggregates() {
        let stats = today_stats(&[], &[snapshot("a", 10, 5), snapshot("b", 30, 5)]);
        assert_eq!(stats.current_occupancy, 10);
        assert_eq!(stats.total_capacity, 40);
        assert_eq!(stats.facility_usage_percent, 25.0);
        assert_eq!(stats.peak_hour, DEFAULT_PEAK_HOUR);
    }

    fn live_engine() -> OccupancyEngine {
        OccupancyEngine::new(
            EnginePolicy::default(),
            vec![Facility {
                id: "cardio".to_string(),
                name: "Cardio".to_string(),
                capacity: 25,
                operational_status: OperationalStatus::Available,
            }],
            64,
        )
    }

    fn profile(id: &str) -> VisitorProfile {
        VisitorProfile {
            visitor_id: id.to_string(),
            visitor_kind: VisitorKind::Member,
            display_name: id.to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_event_burst_publishes_once_after_the_window() {
        let engine = Arc::new(live_engine());
        let hub = Arc::new(DashboardHub::new(engine.snapshot(), 8));
        let (_, mut rx) = hub.subscribe();

        let reconciler =
            Reconciler::new(engine.clone(), hub.clone(), Duration::from_millis(400));
        tokio::spawn(reconciler.run());
        // Let the task subscribe to the event channel before the burst
        tokio::task::yield_now().await;

        for i in 0..5 {
            engine.arrive(profile(&format!("V{}", i))).unwrap();
        }

        // The whole burst coalesces into exactly one recomputation
        let published = rx.recv().await.unwrap();
        assert_eq!(published.stats.today.total, 5);
        assert!(matches!(
            rx.try_recv(),
            Err(tokio::sync::broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_event_after_the_window_publishes_again() {
        let engine = Arc::new(live_engine());
        let hub = Arc::new(DashboardHub::new(engine.snapshot(), 8));
        let (_, mut rx) = hub.subscribe();

        let reconciler =
            Reconciler::new(engine.clone(), hub.clone(), Duration::from_millis(400));
        tokio::spawn(reconciler.run());
        tokio::task::yield_now().await;

        engine.arrive(profile("A")).unwrap();
        let first = rx.recv().await.unwrap();
        assert_eq!(first.stats.today.total, 1);

        engine.arrive(profile("B")).unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(second.stats.today.total, 2);
    }
}
