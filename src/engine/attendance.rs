//! Attendance state machine
//!
//! Owns the lifecycle of one visitor's daily presence:
//! `Arrived -> InFacility -> Departed`, with direct `Arrived -> Departed`
//! checkout and `InFacility -> InFacility` switches. Facility membership is
//! mutated only through the ledger, under the engine lock, so the leave+join
//! pair of a switch is one logical transition.

use chrono::{Local, Utc};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::enums::SessionState;
use crate::models::session::{VisitorProfile, VisitorSession};

use super::events::ChangeEvent;
use super::OccupancyEngine;

impl OccupancyEngine {
    /// Check a visitor in. Exactly one session per visitor may be active at
    /// any instant; a second concurrent arrival fails with `AlreadyPresent`.
    pub fn arrive(&self, profile: VisitorProfile) -> AppResult<VisitorSession> {
        let now = Utc::now();
        let today = Local::now().date_naive();

        let session = {
            let mut state = self.lock_state();
            state.roll_day_if_needed(today);

            if state.active_by_visitor.contains_key(&profile.visitor_id) {
                return Err(AppError::AlreadyPresent(format!(
                    "{} is already checked in",
                    profile.display_name
                )));
            }

            let session = VisitorSession {
                id: Uuid::new_v4(),
                visitor_id: profile.visitor_id.clone(),
                visitor_kind: profile.visitor_kind,
                display_name: profile.display_name,
                arrived_at: now,
                departed_at: None,
                facility_id: None,
                state: SessionState::Arrived,
                revision: 1,
            };
            state
                .active_by_visitor
                .insert(profile.visitor_id, session.id);
            state.sessions.insert(session.id, session.clone());
            session
        };

        tracing::info!(
            session_id = %session.id,
            visitor_id = %session.visitor_id,
            kind = %session.visitor_kind,
            "Visitor arrived"
        );
        self.emit(ChangeEvent::Arrived {
            session_id: session.id,
        });
        Ok(session)
    }

    /// Move an active session into a facility, leaving any previous one.
    ///
    /// If the join is rejected the session rolls back to "no facility"
    /// (state `Arrived`): it is neither silently re-entered into the old
    /// facility nor left in limbo.
    pub fn select_facility(
        &self,
        session_id: Uuid,
        facility_id: &str,
    ) -> AppResult<VisitorSession> {
        let today = Local::now().date_naive();

        let (session, join_error) = {
            let mut state = self.lock_state();
            state.roll_day_if_needed(today);

            if !state.facilities.contains_key(facility_id) {
                return Err(AppError::NotFound(format!(
                    "Facility '{}' not found",
                    facility_id
                )));
            }

            let current = state
                .sessions
                .get(&session_id)
                .ok_or_else(|| AppError::NotFound(format!("Session {} not found", session_id)))?;
            if !current.is_active() {
                return Err(AppError::SessionNotActive(format!(
                    "Session {} has already departed",
                    session_id
                )));
            }
            if current.facility_id.as_deref() == Some(facility_id) {
                // Re-selecting the current facility is a no-op
                return Ok(current.clone());
            }

            let previous = current.facility_id.clone();
            if let Some(prev) = &previous {
                if let Some(ledger) = state.facilities.get_mut(prev) {
                    ledger.leave(session_id);
                }
            }

            let full_threshold = self.policy().full_threshold_percent;
            let join_result = match state.facilities.get_mut(facility_id) {
                Some(ledger) => ledger.try_join(session_id, full_threshold),
                None => Err(AppError::NotFound(format!(
                    "Facility '{}' not found",
                    facility_id
                ))),
            };

            let session = state.sessions.get_mut(&session_id).ok_or_else(|| {
                AppError::Internal(format!("Session {} vanished mid-transition", session_id))
            })?;
            match join_result {
                Ok(()) => {
                    session.facility_id = Some(facility_id.to_string());
                    session.state = SessionState::InFacility;
                    session.revision += 1;
                    (session.clone(), None)
                }
                Err(err) => {
                    // The rollback advances the revision too, so a delayed
                    // write of an older transition can never win over it
                    session.facility_id = None;
                    session.state = SessionState::Arrived;
                    session.revision += 1;
                    (session.clone(), Some(err))
                }
            }
        };

        match join_error {
            None => {
                tracing::info!(
                    session_id = %session.id,
                    facility_id,
                    "Session entered facility"
                );
                self.emit(ChangeEvent::FacilityEntered {
                    session_id: session.id,
                    facility_id: facility_id.to_string(),
                });
                Ok(session)
            }
            Some(err) => {
                tracing::info!(
                    session_id = %session.id,
                    facility_id,
                    error = %err,
                    "Facility join rejected; session rolled back to no facility"
                );
                self.emit(ChangeEvent::FacilityCleared {
                    session_id: session.id,
                });
                Err(err)
            }
        }
    }

    /// Check a session out. Idempotent in the tolerant sense: a second call
    /// performs no state change and reports `SessionNotActive`.
    pub fn depart(&self, session_id: Uuid) -> AppResult<VisitorSession> {
        let now = Utc::now();
        let today = Local::now().date_naive();

        let (session, previous_facility) = {
            let mut state = self.lock_state();
            state.roll_day_if_needed(today);

            let session = state
                .sessions
                .get_mut(&session_id)
                .ok_or_else(|| AppError::NotFound(format!("Session {} not found", session_id)))?;
            if !session.is_active() {
                return Err(AppError::SessionNotActive(format!(
                    "Session {} has already departed",
                    session_id
                )));
            }

            let previous_facility = session.facility_id.take();
            // departed_at is monotonically >= arrived_at, set exactly once
            session.departed_at = Some(now.max(session.arrived_at));
            session.state = SessionState::Departed;
            session.revision += 1;
            let session = session.clone();

            if let Some(facility_id) = &previous_facility {
                if let Some(ledger) = state.facilities.get_mut(facility_id) {
                    ledger.leave(session_id);
                }
            }
            state.active_by_visitor.remove(&session.visitor_id);
            (session, previous_facility)
        };

        tracing::info!(
            session_id = %session.id,
            visitor_id = %session.visitor_id,
            facility_id = ?previous_facility,
            "Visitor departed"
        );
        self.emit(ChangeEvent::Departed {
            session_id: session.id,
        });
        Ok(session)
    }
}
