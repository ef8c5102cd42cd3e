//! Structured agents. Each agent renders a fixed prompt template, calls
//! `LlmClient::invoke` exactly once with its own output schema, and returns a
//! fully validated typed result.
//!
//! Agents never return errors. A transport failure, timeout or schema
//! violation is logged and becomes `None` ("this agent had no opinion"). The
//! match evaluator is the exception: it degrades to a zero-score sentinel
//! because its callers always need something to display.

pub mod application_strategist;
pub mod evaluator;
pub mod opportunity_scout;
pub mod profile_optimizer;
pub mod prompts;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::llm_client::prompts::with_structured_output;
use crate::llm_client::{LlmClient, ModelParams};
use crate::models::profile::Profile;
use crate::schema::StructuredOutput;

/// Allowed values for [`Priority`] in output schemas.
pub(crate) const PRIORITIES: &[&str] = &["high", "medium", "low"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// Runs one structured call, absorbing any failure into `None`.
pub(crate) async fn run_structured<T: StructuredOutput>(
    llm: &LlmClient,
    agent: &'static str,
    system: &str,
    prompt: &str,
    temperature: f32,
) -> Option<T> {
    let system = with_structured_output(system);
    let params = ModelParams::with_temperature(temperature);

    match llm.invoke::<T>(&system, prompt, &params).await {
        Ok(result) => Some(result),
        Err(e) => {
            warn!(agent, error = %e, "Agent produced no result");
            None
        }
    }
}

/// Fills the profile placeholders shared by every agent template.
pub(crate) fn fill_profile(template: &str, profile: &Profile) -> String {
    template
        .replace("{name}", &profile.name)
        .replace("{education_level}", &profile.education_level)
        .replace("{field_of_study}", &profile.field_of_study)
        .replace("{gpa}", &profile.gpa_display())
        .replace("{experience_years}", &profile.experience_years.to_string())
        .replace("{skills}", &profile.skills)
        .replace("{languages}", &profile.languages)
        .replace("{achievements}", &profile.achievements)
        .replace("{goals}", &profile.goals)
}

/// Truncates to `max` characters, marking the cut with "...".
pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
