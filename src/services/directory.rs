//! Visitor directory service
//!
//! Resolves a raw visitor identifier against the two source populations and
//! normalizes the result into one canonical profile. Format differences
//! between members and daily passes are resolved here, once, not downstream.

use chrono::Local;

use crate::error::{AppError, AppResult};
use crate::models::enums::VisitorKind;
use crate::models::session::VisitorProfile;
use crate::repository::Repository;

#[derive(Clone)]
pub struct DirectoryService {
    repository: Repository,
}

impl DirectoryService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Resolve an identifier to a visitor profile. Members take precedence;
    /// a daily pass only resolves on its valid day. Everything else is
    /// `VisitorUnknown`.
    pub async fn resolve(&self, visitor_id: &str) -> AppResult<VisitorProfile> {
        if let Some(member) = self.repository.visitors.find_member(visitor_id).await? {
            if !member.active {
                return Err(AppError::VisitorUnknown(format!(
                    "Membership '{}' is not active",
                    visitor_id
                )));
            }
            return Ok(VisitorProfile {
                visitor_id: member.code,
                visitor_kind: VisitorKind::Member,
                display_name: format!("{} {}", member.first_name, member.last_name),
            });
        }

        let today = Local::now().date_naive();
        if let Some(pass) = self
            .repository
            .visitors
            .find_day_pass(visitor_id, today)
            .await?
        {
            return Ok(VisitorProfile {
                visitor_id: pass.code,
                visitor_kind: VisitorKind::DailyPass,
                display_name: pass.holder_name,
            });
        }

        Err(AppError::VisitorUnknown(format!(
            "No member or valid daily pass for '{}'",
            visitor_id
        )))
    }
}
