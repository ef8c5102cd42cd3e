//! Profile Optimizer: scores a profile and proposes gaps, quick wins and a
//! 90-day plan.

use serde::{Deserialize, Serialize};

use super::prompts::{PROFILE_OPTIMIZER_SYSTEM, PROFILE_OPTIMIZER_TEMPLATE};
use super::{fill_profile, run_structured, Priority, PRIORITIES};
use crate::llm_client::LlmClient;
use crate::models::profile::Profile;
use crate::schema::{Field, FieldType, ObjectSchema, StructuredOutput};

const TEMPERATURE: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Moderate,
    Minor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapAnalysis {
    pub category: String,
    pub severity: Severity,
    pub description: String,
    pub impact: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickWin {
    pub action: String,
    pub impact: String,
    pub time_estimate: String,
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImprovementSuggestion {
    pub area: String,
    pub current_state: String,
    pub target_state: String,
    pub action_steps: Vec<String>,
    pub timeline: String,
    /// 0.0 – 1.0
    pub impact_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    pub period: String,
    pub goals: Vec<String>,
    pub tasks: Vec<String>,
    pub success_metrics: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileOptimizationResult {
    /// 0 – 10
    pub profile_strength_score: f64,
    /// 0 – 100
    pub completeness_percentage: f64,
    pub match_potential_increase: f64,
    pub critical_gaps: Vec<GapAnalysis>,
    pub quick_wins: Vec<QuickWin>,
    pub high_impact_improvements: Vec<ImprovementSuggestion>,
    pub action_plan_30_days: DayPlan,
    pub action_plan_60_days: DayPlan,
    pub action_plan_90_days: DayPlan,
    pub overall_recommendation: String,
}

fn day_plan_schema() -> ObjectSchema {
    ObjectSchema::new(
        "day_plan",
        vec![
            Field::string("period"),
            Field::array("goals", FieldType::string()),
            Field::array("tasks", FieldType::string()),
            Field::array("success_metrics", FieldType::string()),
        ],
    )
}

impl StructuredOutput for ProfileOptimizationResult {
    fn schema() -> ObjectSchema {
        let gap = ObjectSchema::new(
            "gap_analysis",
            vec![
                Field::string("category"),
                Field::string_enum("severity", &["critical", "moderate", "minor"]),
                Field::string("description"),
                Field::string("impact"),
            ],
        );
        let quick_win = ObjectSchema::new(
            "quick_win",
            vec![
                Field::string("action"),
                Field::string("impact"),
                Field::string("time_estimate"),
                Field::string_enum("priority", PRIORITIES),
            ],
        );
        let improvement = ObjectSchema::new(
            "improvement_suggestion",
            vec![
                Field::string("area"),
                Field::string("current_state"),
                Field::string("target_state"),
                Field::array("action_steps", FieldType::string()),
                Field::string("timeline"),
                Field::number_in("impact_score", 0.0, 1.0),
            ],
        );

        ObjectSchema::new(
            "profile_optimization",
            vec![
                Field::number_in("profile_strength_score", 0.0, 10.0),
                Field::number_in("completeness_percentage", 0.0, 100.0),
                Field::number("match_potential_increase"),
                Field::array("critical_gaps", FieldType::object(gap)),
                Field::array("quick_wins", FieldType::object(quick_win)),
                Field::array("high_impact_improvements", FieldType::object(improvement)),
                Field::object("action_plan_30_days", day_plan_schema()),
                Field::object("action_plan_60_days", day_plan_schema()),
                Field::object("action_plan_90_days", day_plan_schema()),
                Field::string("overall_recommendation"),
            ],
        )
    }
}

/// Analyzes a profile. `None` when the model call or validation fails.
pub async fn optimize_profile(
    llm: &LlmClient,
    profile: &Profile,
) -> Option<ProfileOptimizationResult> {
    let prompt = fill_profile(PROFILE_OPTIMIZER_TEMPLATE, profile);
    run_structured(
        llm,
        "profile_optimizer",
        PROFILE_OPTIMIZER_SYSTEM,
        &prompt,
        TEMPERATURE,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::parse;
    use crate::testing::{
        assert_schema_matches_struct, optimization_json, sample_profile, ScriptedProvider,
    };
    use serde_json::json;

    #[test]
    fn test_fixture_satisfies_schema() {
        let result: ProfileOptimizationResult = parse(optimization_json(8.0, 2, 2)).unwrap();
        assert_eq!(result.quick_wins.len(), 2);
        assert_eq!(result.critical_gaps[0].severity, Severity::Critical);
        assert_eq!(result.action_plan_30_days.period, "Days 1-30");
    }

    #[test]
    fn test_strength_score_above_ten_is_rejected() {
        let value = optimization_json(11.0, 1, 1);
        assert!(parse::<ProfileOptimizationResult>(value).is_err());
    }

    #[test]
    fn test_unknown_severity_is_rejected() {
        let mut value = optimization_json(7.0, 1, 1);
        value["critical_gaps"][0]["severity"] = json!("severe");
        assert!(parse::<ProfileOptimizationResult>(value).is_err());
    }

    #[test]
    fn test_missing_day_plan_is_rejected() {
        let mut value = optimization_json(7.0, 1, 1);
        value.as_object_mut().unwrap().remove("action_plan_60_days");
        assert!(parse::<ProfileOptimizationResult>(value).is_err());
    }

    #[tokio::test]
    async fn test_optimize_profile_renders_profile_into_prompt() {
        let provider = ScriptedProvider::new(|_| Ok(optimization_json(6.5, 1, 1)));
        let calls = provider.calls();
        let llm = provider.into_client();

        let result = optimize_profile(&llm, &sample_profile()).await.unwrap();
        assert_eq!(result.profile_strength_score, 6.5);

        let calls = calls.lock().unwrap();
        assert_eq!(calls[0].schema_name, "profile_optimization");
        assert!(calls[0].prompt.contains("Amina Okafor"));
        assert!(calls[0].prompt.contains("Master's in Environmental Engineering"));
        assert!((calls[0].temperature - 0.3).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_optimize_profile_absorbs_failure() {
        let llm = ScriptedProvider::failing("boom").into_client();
        assert!(optimize_profile(&llm, &sample_profile()).await.is_none());
    }

    #[tokio::test]
    async fn test_optimize_profile_absorbs_schema_violation() {
        let llm = ScriptedProvider::new(|_| Ok(json!({"profile_strength_score": 5}))).into_client();
        assert!(optimize_profile(&llm, &sample_profile()).await.is_none());
    }

    #[test]
    fn test_schema_fields_match_result_struct() {
        assert_schema_matches_struct::<ProfileOptimizationResult>(optimization_json(7.0, 1, 1));
    }
}
