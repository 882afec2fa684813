//! Visitor session repository
//!
//! Durable record of every session. The live engine is rebuilt from this
//! table at startup. All writes go through one revision-guarded upsert:
//! persistence retries run outside the engine lock, so a delayed write of
//! an older transition can race a newer one, and the revision guard is what
//! keeps the row from ever moving backwards. `departed_at` is write-once.

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::error::AppResult;
use crate::models::session::{SessionRow, VisitorSession};

#[derive(Clone)]
pub struct SessionsRepository {
    pool: Pool<Postgres>,
}

impl SessionsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Write one session's current state. A write carrying a revision at or
    /// below the stored one matches nothing and is dropped, so stale
    /// retries cannot overwrite a newer transition, and a closed row is
    /// never reopened.
    pub async fn save(&self, session: &VisitorSession) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO visitor_sessions
                (id, visitor_id, visitor_kind, display_name, arrived_at, departed_at, facility_id, state, revision)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO UPDATE
            SET facility_id = EXCLUDED.facility_id,
                departed_at = EXCLUDED.departed_at,
                state = EXCLUDED.state,
                revision = EXCLUDED.revision
            WHERE visitor_sessions.revision < EXCLUDED.revision
              AND visitor_sessions.departed_at IS NULL
            "#,
        )
        .bind(session.id)
        .bind(&session.visitor_id)
        .bind(i16::from(session.visitor_kind))
        .bind(&session.display_name)
        .bind(session.arrived_at)
        .bind(session.departed_at)
        .bind(&session.facility_id)
        .bind(i16::from(session.state))
        .bind(session.revision)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// All sessions that arrived inside the given UTC window, oldest first.
    /// Used for startup recovery of the current day.
    pub async fn list_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<VisitorSession>> {
        let rows = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT id, visitor_id, visitor_kind, display_name, arrived_at, departed_at, facility_id, state, revision
            FROM visitor_sessions
            WHERE arrived_at >= $1 AND arrived_at < $2
            ORDER BY arrived_at ASC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(VisitorSession::from).collect())
    }
}
