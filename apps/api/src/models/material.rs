use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialType {
    CoverLetter,
    PersonalStatement,
    MotivationLetter,
}

impl MaterialType {
    pub const ALL: &'static [&'static str] =
        &["cover_letter", "personal_statement", "motivation_letter"];

    pub fn as_str(&self) -> &'static str {
        match self {
            MaterialType::CoverLetter => "cover_letter",
            MaterialType::PersonalStatement => "personal_statement",
            MaterialType::MotivationLetter => "motivation_letter",
        }
    }

    /// Human-readable name used in prompts, e.g. "cover letter".
    pub fn label(&self) -> String {
        self.as_str().replace('_', " ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MaterialRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub opportunity_id: Option<Uuid>,
    pub material_type: String,
    pub content: String,
    pub word_count: i32,
    pub key_points_highlighted: Vec<String>,
    pub suggestions_for_improvement: String,
    pub opportunity_title: Option<String>,
    pub generated_at: DateTime<Utc>,
}
