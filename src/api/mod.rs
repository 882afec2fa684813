//! API handlers for the Presentia REST endpoints
//!
//! Authentication is an external collaborator of this service: requests
//! arrive here already vetted by the fronting gateway.

pub mod attendance;
pub mod dashboard;
pub mod facilities;
pub mod health;
pub mod openapi;
