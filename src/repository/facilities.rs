//! Facility metadata repository

use sqlx::{Pool, Postgres};

use crate::error::{AppError, AppResult};
use crate::models::enums::OperationalStatus;
use crate::models::facility::{Facility, FacilityRow};

#[derive(Clone)]
pub struct FacilitiesRepository {
    pool: Pool<Postgres>,
}

impl FacilitiesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// All facilities, loaded at startup to seed the live ledger
    pub async fn list(&self) -> AppResult<Vec<Facility>> {
        let rows = sqlx::query_as::<_, FacilityRow>(
            "SELECT id, name, capacity, operational_status FROM facilities ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Facility::from).collect())
    }

    /// Persist an operational status change
    pub async fn update_status(
        &self,
        facility_id: &str,
        status: OperationalStatus,
    ) -> AppResult<()> {
        let result = sqlx::query("UPDATE facilities SET operational_status = $2 WHERE id = $1")
            .bind(facility_id)
            .bind(i16::from(status))
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Facility '{}' not found",
                facility_id
            )));
        }
        Ok(())
    }
}
