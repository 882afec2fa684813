//! Domain models

pub mod enums;
pub mod facility;
pub mod session;
pub mod visit;

pub use enums::{DisplayStatus, OperationalStatus, SessionState, VisitorKind};
pub use facility::{Facility, FacilitySnapshot};
pub use session::{VisitorProfile, VisitorSession};
pub use visit::{DashboardSnapshot, TodayStats, UnifiedVisit};
