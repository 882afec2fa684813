//! Presentia Gym Occupancy & Attendance Server
//!
//! A Rust implementation of the Presentia occupancy engine, tracking who is
//! physically present at which facility in real time and streaming a unified
//! live view to connected dashboards.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
