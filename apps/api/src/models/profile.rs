use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EducationLevel {
    #[serde(rename = "High School")]
    HighSchool,
    #[serde(rename = "Bachelor's")]
    Bachelors,
    #[serde(rename = "Master's")]
    Masters,
    #[serde(rename = "PhD")]
    Phd,
    #[serde(rename = "Other")]
    Other,
}

impl EducationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EducationLevel::HighSchool => "High School",
            EducationLevel::Bachelors => "Bachelor's",
            EducationLevel::Masters => "Master's",
            EducationLevel::Phd => "PhD",
            EducationLevel::Other => "Other",
        }
    }
}

/// One profile per user, upserted in place.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub education_level: String,
    pub field_of_study: String,
    pub gpa: Option<f64>,
    pub skills: String,
    pub experience_years: i32,
    pub languages: String,
    pub achievements: String,
    pub goals: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// GPA as shown in prompts.
    pub fn gpa_display(&self) -> String {
        self.gpa
            .map(|g| g.to_string())
            .unwrap_or_else(|| "Not provided".to_string())
    }
}

/// Request body for `POST`/`PUT /api/profile`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileInput {
    pub name: String,
    pub education_level: EducationLevel,
    pub field_of_study: String,
    pub gpa: Option<f64>,
    pub skills: String,
    pub experience_years: i32,
    pub languages: String,
    pub achievements: String,
    pub goals: String,
}

impl ProfileInput {
    pub fn validate(&self) -> Result<(), AppError> {
        let required = [
            ("name", &self.name),
            ("field_of_study", &self.field_of_study),
            ("skills", &self.skills),
            ("languages", &self.languages),
            ("achievements", &self.achievements),
            ("goals", &self.goals),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(AppError::Validation(format!("{field} cannot be empty")));
            }
        }

        if let Some(gpa) = self.gpa {
            if !(0.0..=4.0).contains(&gpa) {
                return Err(AppError::Validation(format!(
                    "gpa must be between 0 and 4, got {gpa}"
                )));
            }
        }

        if self.experience_years < 0 {
            return Err(AppError::Validation(
                "experience_years cannot be negative".to_string(),
            ));
        }

        Ok(())
    }
}
