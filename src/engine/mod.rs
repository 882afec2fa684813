//! In-memory occupancy engine
//!
//! The engine is the single source of truth for "who occupies what" during
//! the current day. All mutation goes through its atomic operations; the
//! Postgres session store is the durable record the engine is rebuilt from
//! at startup. All state lives behind one mutex that is never held across an
//! await point, which linearizes every mutation.

pub mod attendance;
pub mod events;
pub mod hub;
pub mod ledger;
pub mod reconcile;

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{Local, NaiveDate};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::enums::SessionState;
use crate::models::facility::{Facility, FacilitySnapshot};
use crate::models::session::VisitorSession;

use events::ChangeEvent;
use ledger::FacilityLedger;

/// Engine policy knobs, derived from [`crate::config::EngineConfig`]
#[derive(Debug, Clone)]
pub struct EnginePolicy {
    /// Usage percentage at or above which joins are rejected
    pub full_threshold_percent: f64,
}

impl Default for EnginePolicy {
    fn default() -> Self {
        Self {
            full_threshold_percent: 90.0,
        }
    }
}

pub struct OccupancyEngine {
    state: Mutex<EngineState>,
    policy: EnginePolicy,
    events: broadcast::Sender<ChangeEvent>,
}

pub(crate) struct EngineState {
    /// Local calendar day this population belongs to
    day: NaiveDate,
    /// All of today's sessions, departed included
    sessions: HashMap<Uuid, VisitorSession>,
    /// visitor_id -> session id, for sessions still in {Arrived, InFacility}
    active_by_visitor: HashMap<String, Uuid>,
    facilities: HashMap<String, FacilityLedger>,
}

impl EngineState {
    /// A new day begins a fresh population: previous-day sessions are
    /// history (they stay in the store) and occupant sets reset.
    fn roll_day_if_needed(&mut self, today: NaiveDate) {
        if self.day == today {
            return;
        }
        let dropped = self.sessions.len();
        self.sessions.clear();
        self.active_by_visitor.clear();
        for ledger in self.facilities.values_mut() {
            ledger.occupants.clear();
        }
        tracing::info!(
            previous_day = %self.day,
            %today,
            dropped_sessions = dropped,
            "Day rollover: starting a fresh population"
        );
        self.day = today;
    }
}

impl OccupancyEngine {
    pub fn new(policy: EnginePolicy, facilities: Vec<Facility>, event_buffer: usize) -> Self {
        let (events, _) = broadcast::channel(event_buffer.max(1));
        let facilities = facilities
            .into_iter()
            .map(|f| (f.id.clone(), FacilityLedger::new(f)))
            .collect();
        Self {
            state: Mutex::new(EngineState {
                day: Local::now().date_naive(),
                sessions: HashMap::new(),
                active_by_visitor: HashMap::new(),
                facilities,
            }),
            policy,
            events,
        }
    }

    /// Rebuild live state from today's persisted sessions. Occupant sets are
    /// always derived from session state, never from a cached counter.
    pub fn restore(&self, sessions: Vec<VisitorSession>) {
        let mut state = self.lock_state();
        for session in sessions {
            if session.is_active() {
                state
                    .active_by_visitor
                    .insert(session.visitor_id.clone(), session.id);
            }
            let mut session = session;
            if session.state == SessionState::InFacility {
                match session
                    .facility_id
                    .as_ref()
                    .and_then(|id| state.facilities.get_mut(id))
                {
                    Some(ledger) => {
                        ledger.occupants.insert(session.id);
                    }
                    None => {
                        tracing::warn!(
                            session_id = %session.id,
                            facility_id = ?session.facility_id,
                            "Restored session references an unknown facility; clearing it"
                        );
                        session.facility_id = None;
                        session.state = SessionState::Arrived;
                    }
                }
            }
            state.sessions.insert(session.id, session);
        }
        tracing::info!(
            sessions = state.sessions.len(),
            active = state.active_by_visitor.len(),
            "Engine state restored from session store"
        );
    }

    pub(crate) fn lock_state(&self) -> MutexGuard<'_, EngineState> {
        // A panic while holding the lock leaves plain data behind; keep
        // serving rather than poisoning every later request.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn policy(&self) -> &EnginePolicy {
        &self.policy
    }

    pub(crate) fn emit(&self, event: ChangeEvent) {
        // No receivers is fine (e.g. before the reconciler starts)
        let _ = self.events.send(event);
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ChangeEvent> {
        self.events.subscribe()
    }

    /// Fetch one session as currently known to the engine
    pub fn get_session(&self, session_id: Uuid) -> Option<VisitorSession> {
        self.lock_state().sessions.get(&session_id).cloned()
    }

    pub fn facility_snapshots(&self) -> Vec<FacilitySnapshot> {
        let state = self.lock_state();
        let mut snapshots: Vec<FacilitySnapshot> =
            state.facilities.values().map(|l| l.snapshot()).collect();
        snapshots.sort_by(|a, b| a.facility_id.cmp(&b.facility_id));
        snapshots
    }

    pub fn facility_snapshot(&self, facility_id: &str) -> AppResult<FacilitySnapshot> {
        let state = self.lock_state();
        state
            .facilities
            .get(facility_id)
            .map(|l| l.snapshot())
            .ok_or_else(|| AppError::NotFound(format!("Facility '{}' not found", facility_id)))
    }
}
