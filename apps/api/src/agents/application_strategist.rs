//! Application Strategist: ranks the caller's opportunities and lays out a
//! weekly plan.

use serde::{Deserialize, Serialize};

use super::prompts::{APPLICATION_STRATEGIST_SYSTEM, APPLICATION_STRATEGIST_TEMPLATE};
use super::{fill_profile, run_structured, truncate_chars};
use crate::llm_client::LlmClient;
use crate::models::opportunity::ScoredOpportunity;
use crate::models::profile::Profile;
use crate::schema::{Field, FieldType, ObjectSchema, StructuredOutput};

const TEMPERATURE: f32 = 0.3;
const MAX_OPPORTUNITIES: usize = 10;
const REQUIREMENTS_PREVIEW_CHARS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriorityLevel {
    High,
    Medium,
    Low,
}

impl PriorityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriorityLevel::High => "High",
            PriorityLevel::Medium => "Medium",
            PriorityLevel::Low => "Low",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationPriority {
    pub opportunity_title: String,
    pub priority_level: PriorityLevel,
    pub match_score: f64,
    /// `None` for rolling deadlines.
    pub deadline: Option<String>,
    pub reasoning: String,
    pub estimated_effort_hours: i64,
    /// 0.0 – 1.0
    pub success_probability: f64,
    /// 0.0 – 1.0
    pub roi_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyTask {
    /// Free-form label such as "Week 1" or "Week 3-4".
    pub week: String,
    pub tasks: Vec<String>,
    pub deadline_focus: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationStrategyResult {
    pub prioritized_applications: Vec<ApplicationPriority>,
    pub weekly_timeline: Vec<WeeklyTask>,
    pub strategy_summary: String,
    pub effort_estimate_total_hours: i64,
    pub recommended_focus: Vec<String>,
}

impl StructuredOutput for ApplicationStrategyResult {
    fn schema() -> ObjectSchema {
        let priority = ObjectSchema::new(
            "application_priority",
            vec![
                Field::string("opportunity_title"),
                Field::string_enum("priority_level", &["High", "Medium", "Low"]),
                Field::number("match_score"),
                Field::string("deadline").optional(),
                Field::string("reasoning"),
                Field::integer("estimated_effort_hours"),
                Field::number_in("success_probability", 0.0, 1.0),
                Field::number_in("roi_score", 0.0, 1.0),
            ],
        );
        let week = ObjectSchema::new(
            "weekly_task",
            vec![
                Field::string("week"),
                Field::array("tasks", FieldType::string()),
                Field::array("deadline_focus", FieldType::string()),
            ],
        );

        ObjectSchema::new(
            "application_strategy",
            vec![
                Field::array("prioritized_applications", FieldType::object(priority)),
                Field::array("weekly_timeline", FieldType::object(week)),
                Field::string("strategy_summary"),
                Field::integer("effort_estimate_total_hours"),
                Field::array("recommended_focus", FieldType::string()),
            ],
        )
    }
}

fn render_opportunities(opportunities: &[ScoredOpportunity]) -> String {
    opportunities
        .iter()
        .take(MAX_OPPORTUNITIES)
        .map(|item| {
            let opp = &item.opportunity;
            format!(
                "Title: {}\nType: {}\nMatch Score: {:.0}%\nDeadline: {}\nRequirements: {}",
                opp.title,
                opp.opp_type,
                item.score * 100.0,
                opp.deadline.as_deref().unwrap_or("Rolling"),
                truncate_chars(&opp.requirements, REQUIREMENTS_PREVIEW_CHARS),
            )
        })
        .collect::<Vec<_>>()
        .join("\n---\n")
}

/// Plans applications for the first ten opportunities, in caller order.
pub async fn plan_applications(
    llm: &LlmClient,
    profile: &Profile,
    opportunities: &[ScoredOpportunity],
) -> Option<ApplicationStrategyResult> {
    let prompt = fill_profile(APPLICATION_STRATEGIST_TEMPLATE, profile)
        .replace("{opportunities}", &render_opportunities(opportunities));
    run_structured(
        llm,
        "application_strategist",
        APPLICATION_STRATEGIST_SYSTEM,
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
        assert_schema_matches_struct, sample_details, sample_profile, strategy_json,
        ScriptedProvider,
    };
    use serde_json::json;

    fn scored(title: &str, score: f64) -> ScoredOpportunity {
        ScoredOpportunity {
            opportunity: sample_details(title),
            score,
        }
    }

    #[test]
    fn test_priority_level_is_capitalized() {
        let result: ApplicationStrategyResult = parse(strategy_json(&[0.6], 40)).unwrap();
        assert_eq!(
            result.prioritized_applications[0].priority_level,
            PriorityLevel::High
        );
        assert_eq!(result.effort_estimate_total_hours, 40);
    }

    #[test]
    fn test_lowercase_priority_level_is_rejected() {
        let mut value = strategy_json(&[0.6], 10);
        value["prioritized_applications"][0]["priority_level"] = json!("high");
        assert!(parse::<ApplicationStrategyResult>(value).is_err());
    }

    #[test]
    fn test_null_deadline_is_accepted() {
        let mut value = strategy_json(&[0.6], 10);
        value["prioritized_applications"][0]["deadline"] = json!(null);
        let result: ApplicationStrategyResult = parse(value).unwrap();
        assert_eq!(result.prioritized_applications[0].deadline, None);
    }

    #[test]
    fn test_week_range_label_is_accepted() {
        let mut value = strategy_json(&[0.6], 10);
        value["weekly_timeline"][0]["week"] = json!("Week 1-2");
        let result: ApplicationStrategyResult = parse(value).unwrap();
        assert_eq!(result.weekly_timeline[0].week, "Week 1-2");
    }

    #[test]
    fn test_integral_float_hours_are_accepted() {
        let mut value = strategy_json(&[0.6], 10);
        value["effort_estimate_total_hours"] = json!(40.0);
        value["prioritized_applications"][0]["estimated_effort_hours"] = json!(12.0);
        let result: ApplicationStrategyResult = parse(value).unwrap();
        assert_eq!(result.effort_estimate_total_hours, 40);
        assert_eq!(result.prioritized_applications[0].estimated_effort_hours, 12);
    }

    #[test]
    fn test_fractional_effort_hours_are_rejected() {
        let mut value = strategy_json(&[0.6], 10);
        value["effort_estimate_total_hours"] = json!(12.5);
        assert!(parse::<ApplicationStrategyResult>(value).is_err());
    }

    #[test]
    fn test_render_formats_score_and_rolling_deadline() {
        let mut item = scored("Open Call", 0.756);
        item.opportunity.deadline = None;
        let rendered = render_opportunities(&[item]);
        assert!(rendered.contains("Match Score: 76%"));
        assert!(rendered.contains("Deadline: Rolling"));
    }

    #[test]
    fn test_render_caps_at_ten_entries() {
        let items: Vec<_> = (0..12).map(|i| scored(&format!("Opp {i}"), 0.5)).collect();
        let rendered = render_opportunities(&items);
        assert_eq!(rendered.matches("\n---\n").count(), 9);
        assert!(rendered.contains("Title: Opp 9"));
        assert!(!rendered.contains("Title: Opp 10"));
    }

    #[tokio::test]
    async fn test_plan_applications_uses_strategy_schema() {
        let provider = ScriptedProvider::new(|_| Ok(strategy_json(&[0.7, 0.5], 30)));
        let calls = provider.calls();
        let llm = provider.into_client();

        let result = plan_applications(&llm, &sample_profile(), &[scored("Alpha", 0.9)])
            .await
            .unwrap();
        assert_eq!(result.prioritized_applications.len(), 2);

        let calls = calls.lock().unwrap();
        assert_eq!(calls[0].schema_name, "application_strategy");
        assert!(calls[0].prompt.contains("Title: Alpha"));
    }

    #[tokio::test]
    async fn test_plan_applications_absorbs_failure() {
        let llm = ScriptedProvider::failing("down").into_client();
        assert!(
            plan_applications(&llm, &sample_profile(), &[scored("Alpha", 0.9)])
                .await
                .is_none()
        );
    }

    #[test]
    fn test_schema_fields_match_result_struct() {
        assert_schema_matches_struct::<ApplicationStrategyResult>(strategy_json(&[0.6], 10));
    }
}
