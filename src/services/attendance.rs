//! Attendance service
//!
//! Orchestrates check-in, facility selection and check-out: resolves the
//! visitor, drives the engine, and persists the resulting session state.
//! The in-memory engine is authoritative for the live view; persistence is
//! retried with backoff and a final failure is logged, never surfaced to
//! the acting client once the engine has committed the transition. Each
//! write carries the session's transition revision, so a delayed retry
//! racing a newer transition is dropped by the store instead of winning.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::engine::OccupancyEngine;
use crate::error::{AppError, AppResult};
use crate::models::session::VisitorSession;
use crate::repository::Repository;

use super::directory::DirectoryService;

const PERSIST_ATTEMPTS: u32 = 3;
const PERSIST_BACKOFF: Duration = Duration::from_millis(200);

#[derive(Clone)]
pub struct AttendanceService {
    engine: Arc<OccupancyEngine>,
    repository: Repository,
    directory: DirectoryService,
}

impl AttendanceService {
    pub fn new(
        engine: Arc<OccupancyEngine>,
        repository: Repository,
        directory: DirectoryService,
    ) -> Self {
        Self {
            engine,
            repository,
            directory,
        }
    }

    /// Check a visitor in, creating a new session in `Arrived`
    pub async fn check_in(&self, visitor_id: &str) -> AppResult<VisitorSession> {
        let profile = self.directory.resolve(visitor_id).await?;
        let session = self.engine.arrive(profile)?;
        self.persist("insert session", || {
            self.repository.sessions.save(&session)
        })
        .await;
        Ok(session)
    }

    /// Move a session into a facility
    pub async fn select_facility(
        &self,
        session_id: Uuid,
        facility_id: &str,
    ) -> AppResult<VisitorSession> {
        match self.engine.select_facility(session_id, facility_id) {
            Ok(session) => {
                self.persist("update session facility", || {
                    self.repository.sessions.save(&session)
                })
                .await;
                Ok(session)
            }
            Err(err @ AppError::FacilityUnavailable(_)) => {
                // The engine rolled the session back to "no facility";
                // mirror that in the store before reporting the rejection
                if let Some(session) = self.engine.get_session(session_id) {
                    self.persist("persist facility rollback", || {
                        self.repository.sessions.save(&session)
                    })
                    .await;
                }
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Check a session out
    pub async fn depart(&self, session_id: Uuid) -> AppResult<VisitorSession> {
        let session = self.engine.depart(session_id)?;
        self.persist("close session", || {
            self.repository.sessions.save(&session)
        })
        .await;
        Ok(session)
    }

    /// Retry a store write with bounded backoff. The engine state is
    /// already committed when this runs, so exhaustion is logged rather
    /// than failing the caller; recovery rebuilds from the store next start.
    async fn persist<F, Fut>(&self, what: &str, op: F)
    where
        F: Fn() -> Fut,
        Fut: Future<Output = AppResult<()>>,
    {
        let mut delay = PERSIST_BACKOFF;
        for attempt in 1..=PERSIST_ATTEMPTS {
            match op().await {
                Ok(()) => return,
                Err(err) if attempt < PERSIST_ATTEMPTS => {
                    tracing::warn!(what, attempt, error = %err, "Store write failed, retrying");
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
                Err(err) => {
                    tracing::error!(what, error = %err, "Store write failed after retries");
                }
            }
        }
    }
}
