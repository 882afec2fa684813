//! Repository layer for database operations

pub mod facilities;
pub mod sessions;
pub mod visitors;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub sessions: sessions::SessionsRepository,
    pub facilities: facilities::FacilitiesRepository,
    pub visitors: visitors::VisitorsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            sessions: sessions::SessionsRepository::new(pool.clone()),
            facilities: facilities::FacilitiesRepository::new(pool.clone()),
            visitors: visitors::VisitorsRepository::new(pool.clone()),
            pool,
        }
    }
}
