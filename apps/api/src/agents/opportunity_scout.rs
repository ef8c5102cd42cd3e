//! Opportunity Scout: search queries and similar or overlooked programs,
//! seeded by the caller's best matches so far.

use serde::{Deserialize, Serialize};

use super::prompts::{OPPORTUNITY_SCOUT_SYSTEM, OPPORTUNITY_SCOUT_TEMPLATE};
use super::{fill_profile, run_structured, truncate_chars, Priority, PRIORITIES};
use crate::llm_client::LlmClient;
use crate::models::opportunity::OpportunityDetails;
use crate::models::profile::Profile;
use crate::schema::{Field, FieldType, ObjectSchema, StructuredOutput};

const TEMPERATURE: f32 = 0.5;
const DESCRIPTION_PREVIEW_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub query: String,
    pub reasoning: String,
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarOpportunity {
    pub title: String,
    #[serde(rename = "type")]
    pub opp_type: String,
    pub why_similar: String,
    /// 0.0 – 1.0
    pub relevance_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpportunitySearchResult {
    pub search_queries: Vec<SearchQuery>,
    pub similar_opportunities: Vec<SimilarOpportunity>,
    pub hidden_opportunities: Vec<String>,
    pub recommendation: String,
}

impl StructuredOutput for OpportunitySearchResult {
    fn schema() -> ObjectSchema {
        let query = ObjectSchema::new(
            "search_query",
            vec![
                Field::string("query"),
                Field::string("reasoning"),
                Field::string_enum("priority", PRIORITIES),
            ],
        );
        let similar = ObjectSchema::new(
            "similar_opportunity",
            vec![
                Field::string("title"),
                Field::string("type"),
                Field::string("why_similar"),
                Field::number_in("relevance_score", 0.0, 1.0),
            ],
        );

        ObjectSchema::new(
            "opportunity_search",
            vec![
                Field::array("search_queries", FieldType::object(query)),
                Field::array("similar_opportunities", FieldType::object(similar)),
                Field::array("hidden_opportunities", FieldType::string()),
                Field::string("recommendation"),
            ],
        )
    }
}

fn render_top_matches(top: &[&OpportunityDetails]) -> String {
    if top.is_empty() {
        return "No matches yet".to_string();
    }
    top.iter()
        .map(|opp| {
            format!(
                "- {} ({}): {}",
                opp.title,
                opp.opp_type,
                truncate_chars(&opp.description, DESCRIPTION_PREVIEW_CHARS)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub async fn scout_opportunities(
    llm: &LlmClient,
    profile: &Profile,
    top: &[&OpportunityDetails],
) -> Option<OpportunitySearchResult> {
    let prompt = fill_profile(OPPORTUNITY_SCOUT_TEMPLATE, profile)
        .replace("{top_matches}", &render_top_matches(top));
    run_structured(
        llm,
        "opportunity_scout",
        OPPORTUNITY_SCOUT_SYSTEM,
        &prompt,
        TEMPERATURE,
    )
    .await
}
