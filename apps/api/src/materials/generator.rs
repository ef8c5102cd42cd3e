//! Application material generation: one structured call per request.
//!
//! Not an agent. A failed call is the request's failure and surfaces as
//! `AppError::Llm` rather than degrading.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::agents::fill_profile;
use crate::errors::AppError;
use crate::llm_client::prompts::with_structured_output;
use crate::llm_client::{LlmClient, ModelParams};
use crate::materials::prompts::{prompts_for, MATERIAL_TEMPLATE};
use crate::models::material::MaterialType;
use crate::models::opportunity::OpportunityDetails;
use crate::models::profile::Profile;
use crate::schema::{Field, FieldType, ObjectSchema, StructuredOutput};

const TEMPERATURE: f32 = 0.5;
pub const DEFAULT_WORD_COUNT: u32 = 500;
pub const MIN_WORD_COUNT: u32 = 200;
pub const MAX_WORD_COUNT: u32 = 2000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedMaterial {
    pub material_type: MaterialType,
    pub content: String,
    pub word_count: i32,
    pub key_points_highlighted: Vec<String>,
    pub suggestions_for_improvement: String,
}

impl StructuredOutput for GeneratedMaterial {
    fn schema() -> ObjectSchema {
        ObjectSchema::new(
            "application_material",
            vec![
                Field::string_enum("material_type", MaterialType::ALL),
                Field::string("content"),
                Field::integer("word_count"),
                Field::array("key_points_highlighted", FieldType::string()),
                Field::string("suggestions_for_improvement"),
            ],
        )
    }
}

pub fn count_words(text: &str) -> i32 {
    text.split_whitespace().count() as i32
}

fn render_prompt(
    profile: &Profile,
    opportunity: &OpportunityDetails,
    material_type: MaterialType,
    structure: &str,
    target_word_count: u32,
) -> String {
    fill_profile(MATERIAL_TEMPLATE, profile)
        .replace("{opp_title}", &opportunity.title)
        .replace("{opp_type}", &opportunity.opp_type)
        .replace("{opp_description}", &opportunity.description)
        .replace("{opp_requirements}", &opportunity.requirements)
        .replace("{material_label}", &material_type.label())
        .replace("{structure}", structure)
        .replace("{target_word_count}", &target_word_count.to_string())
}

/// Generates one material. The model's own word count and type are not
/// trusted: both are overwritten from the content and the request.
pub async fn generate_material(
    llm: &LlmClient,
    profile: &Profile,
    opportunity: &OpportunityDetails,
    material_type: MaterialType,
    target_word_count: u32,
) -> Result<GeneratedMaterial, AppError> {
    let (system, structure) = prompts_for(material_type);
    let system = with_structured_output(system);
    let prompt = render_prompt(
        profile,
        opportunity,
        material_type,
        structure,
        target_word_count,
    );

    let mut material: GeneratedMaterial = llm
        .invoke(&system, &prompt, &ModelParams::with_temperature(TEMPERATURE))
        .await
        .map_err(|e| AppError::Llm(e.to_string()))?;

    material.word_count = count_words(&material.content);
    material.material_type = material_type;

    info!(
        material_type = material_type.as_str(),
        word_count = material.word_count,
        target = target_word_count,
        "Generated application material"
    );

    Ok(material)
}
