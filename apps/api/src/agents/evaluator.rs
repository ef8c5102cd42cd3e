//! Match evaluator. Unlike the other agents it never yields `None`: a failed
//! call becomes a zero-score sentinel so callers always have something to
//! display and persist.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::fill_profile;
use super::prompts::{EVALUATOR_SYSTEM, EVALUATOR_TEMPLATE};
use crate::llm_client::prompts::with_structured_output;
use crate::llm_client::{GenerationError, LlmClient, ModelParams};
use crate::models::opportunity::OpportunityDetails;
use crate::models::profile::Profile;
use crate::schema::{Field, ObjectSchema, StructuredOutput};

const TEMPERATURE: f32 = 0.3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchEvaluation {
    /// 0.0 – 1.0
    pub compatibility_score: f64,
    pub strengths: String,
    pub gaps: String,
    pub recommendation: String,
}

impl StructuredOutput for MatchEvaluation {
    fn schema() -> ObjectSchema {
        ObjectSchema::new(
            "match_result",
            vec![
                Field::number_in("compatibility_score", 0.0, 1.0),
                Field::string("strengths"),
                Field::string("gaps"),
                Field::string("recommendation"),
            ],
        )
    }
}

impl MatchEvaluation {
    /// Placeholder returned in place of a failed evaluation.
    pub fn sentinel(error: &GenerationError) -> Self {
        Self {
            compatibility_score: 0.0,
            strengths: "Evaluation could not be completed, so no strengths were identified."
                .to_string(),
            gaps: "Unable to analyze at this time.".to_string(),
            recommendation: format!("Evaluation failed: {error}. Please try again later."),
        }
    }
}

fn render_prompt(profile: &Profile, opportunity: &OpportunityDetails) -> String {
    fill_profile(EVALUATOR_TEMPLATE, profile)
        .replace("{opp_title}", &opportunity.title)
        .replace("{opp_type}", &opportunity.opp_type)
        .replace("{opp_description}", &opportunity.description)
        .replace("{opp_requirements}", &opportunity.requirements)
}

/// Scores one profile/opportunity pair.
pub async fn evaluate_match(
    llm: &LlmClient,
    profile: &Profile,
    opportunity: &OpportunityDetails,
) -> MatchEvaluation {
    let system = with_structured_output(EVALUATOR_SYSTEM);
    let prompt = render_prompt(profile, opportunity);
    let params = ModelParams::with_temperature(TEMPERATURE);

    match llm.invoke::<MatchEvaluation>(&system, &prompt, &params).await {
        Ok(evaluation) => evaluation,
        Err(e) => {
            warn!(
                agent = "evaluator",
                opportunity = %opportunity.title,
                error = %e,
                "Evaluation degraded to sentinel"
            );
            MatchEvaluation::sentinel(&e)
        }
    }
}
