use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::AppError;

/// The descriptive part of an opportunity. Also used as the unsaved
/// snapshot evaluated by `POST /api/match/evaluate`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OpportunityDetails {
    pub title: String,
    pub opp_type: String,
    pub description: String,
    pub requirements: String,
    pub deadline: Option<String>,
    pub provider: Option<String>,
    pub funding: Option<String>,
    pub location: Option<String>,
    pub link: Option<String>,
}

impl OpportunityDetails {
    pub fn validate(&self) -> Result<(), AppError> {
        let required = [
            ("title", &self.title),
            ("opp_type", &self.opp_type),
            ("description", &self.description),
            ("requirements", &self.requirements),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(AppError::Validation(format!("{field} cannot be empty")));
            }
        }
        Ok(())
    }
}

/// A stored opportunity plus the caller's pipeline status, if any.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Opportunity {
    pub id: Uuid,
    pub user_id: Uuid,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub details: OpportunityDetails,
    pub source: Option<String>,
    /// Joined from `opportunity_statuses` for the owning user.
    pub status: Option<String>,
    pub saved_at: DateTime<Utc>,
}

/// Request body for `PUT /api/opportunities/:id`. Absent fields are kept.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpportunityPatch {
    pub title: Option<String>,
    pub opp_type: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub deadline: Option<String>,
    pub provider: Option<String>,
    pub funding: Option<String>,
    pub location: Option<String>,
    pub link: Option<String>,
}

impl OpportunityPatch {
    pub fn validate(&self) -> Result<(), AppError> {
        let required = [
            ("title", &self.title),
            ("opp_type", &self.opp_type),
            ("description", &self.description),
            ("requirements", &self.requirements),
        ];
        for (field, value) in required {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                return Err(AppError::Validation(format!("{field} cannot be empty")));
            }
        }
        Ok(())
    }

    pub fn apply(&self, details: &mut OpportunityDetails) {
        fn set(target: &mut String, value: &Option<String>) {
            if let Some(v) = value {
                *target = v.clone();
            }
        }
        fn set_opt(target: &mut Option<String>, value: &Option<String>) {
            if value.is_some() {
                *target = value.clone();
            }
        }
        set(&mut details.title, &self.title);
        set(&mut details.opp_type, &self.opp_type);
        set(&mut details.description, &self.description);
        set(&mut details.requirements, &self.requirements);
        set_opt(&mut details.deadline, &self.deadline);
        set_opt(&mut details.provider, &self.provider);
        set_opt(&mut details.funding, &self.funding);
        set_opt(&mut details.location, &self.location);
        set_opt(&mut details.link, &self.link);
    }
}

/// Per-user pipeline status. Stored apart from the opportunity because
/// opportunities may be shared while the status is always personal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Saved,
    Applied,
    Interview,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Saved => "saved",
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Interview => "interview",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OpportunityStatusRow {
    pub user_id: Uuid,
    pub opportunity_id: Uuid,
    pub status: String,
    pub updated_at: DateTime<Utc>,
}

/// An opportunity paired with the caller's latest compatibility score.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredOpportunity {
    pub opportunity: OpportunityDetails,
    pub score: f64,
}
