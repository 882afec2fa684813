//! Visitor directory queries
//!
//! The two source populations live in differently-shaped tables; rows are
//! returned as-is here and normalized once, at the directory service
//! boundary.

use chrono::NaiveDate;
use sqlx::{FromRow, Pool, Postgres};

use crate::error::AppResult;

/// Registered member row
#[derive(Debug, Clone, FromRow)]
pub struct MemberRow {
    pub code: String,
    pub first_name: String,
    pub last_name: String,
    pub active: bool,
}

/// Daily-pass row, valid for a single calendar day
#[derive(Debug, Clone, FromRow)]
pub struct DayPassRow {
    pub code: String,
    pub holder_name: String,
    pub valid_on: NaiveDate,
}

#[derive(Clone)]
pub struct VisitorsRepository {
    pool: Pool<Postgres>,
}

impl VisitorsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn find_member(&self, code: &str) -> AppResult<Option<MemberRow>> {
        let row = sqlx::query_as::<_, MemberRow>(
            "SELECT code, first_name, last_name, active FROM members WHERE code = $1",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn find_day_pass(&self, code: &str, valid_on: NaiveDate) -> AppResult<Option<DayPassRow>> {
        let row = sqlx::query_as::<_, DayPassRow>(
            "SELECT code, holder_name, valid_on FROM day_passes WHERE code = $1 AND valid_on = $2",
        )
        .bind(code)
        .bind(valid_on)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}
