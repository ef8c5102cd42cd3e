//! Strategy orchestrator.
//!
//! Fans out the three planning agents concurrently, waits for all of them to
//! settle, and merges whatever came back into one `StrategyResult`. An agent
//! that fails or is skipped leaves its section empty; the run itself never
//! fails.
//!
//! Branches run inside the request future via `tokio::join!`. Nothing is
//! spawned, so dropping the request (client disconnect) drops every
//! in-flight model call with it.

pub mod handlers;

use std::collections::HashMap;

use serde::{Serialize, Serializer};
use tracing::info;
use uuid::Uuid;

use crate::agents::application_strategist::{plan_applications, ApplicationStrategyResult};
use crate::agents::opportunity_scout::{scout_opportunities, OpportunitySearchResult};
use crate::agents::profile_optimizer::{optimize_profile, ProfileOptimizationResult};
use crate::llm_client::LlmClient;
use crate::models::match_result::MatchResultRow;
use crate::models::opportunity::{Opportunity, OpportunityDetails, ScoredOpportunity};
use crate::models::profile::Profile;

const TOP_OPPORTUNITIES: usize = 3;
const QUICK_WIN_ACTIONS: usize = 3;
const GAP_ACTIONS: usize = 2;
const MAX_PRIORITY_ACTIONS: usize = 5;
const NEXT_STEP_APPLICATIONS: usize = 3;
const MAX_NEXT_STEPS: usize = 5;
const SUCCESS_SAMPLE: usize = 5;

/// Score given to a chosen opportunity that has never been evaluated.
pub const UNSCORED_DEFAULT: f64 = 0.5;
/// History window searched for the latest score of a chosen opportunity.
pub const SCORE_LOOKUP_WINDOW: i64 = 100;
/// History window used when the caller names no opportunities.
pub const RECENT_HISTORY_WINDOW: i64 = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyResult {
    #[serde(serialize_with = "section_or_empty")]
    pub profile_optimization: Option<ProfileOptimizationResult>,
    #[serde(serialize_with = "section_or_empty")]
    pub search_strategies: Option<OpportunitySearchResult>,
    #[serde(serialize_with = "section_or_empty")]
    pub application_strategy: Option<ApplicationStrategyResult>,
    pub priority_actions: Vec<String>,
    pub success_probability: f64,
    pub time_investment_hours: i64,
    pub recommended_next_steps: Vec<String>,
}

/// Absent sections serialize as `{}` so clients can always index into them.
fn section_or_empty<T, S>(section: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Serialize,
    S: Serializer,
{
    match section {
        Some(value) => value.serialize(serializer),
        None => serde_json::Map::new().serialize(serializer),
    }
}

/// Runs the three agents and synthesizes their outputs.
///
/// `opportunities` is used in the order given; the first three seed the
/// scout. The scout is skipped when the list is empty, and so is the
/// strategist.
pub async fn run_strategy(
    llm: &LlmClient,
    profile: &Profile,
    opportunities: &[ScoredOpportunity],
) -> StrategyResult {
    let top: Vec<&OpportunityDetails> = opportunities
        .iter()
        .take(TOP_OPPORTUNITIES)
        .map(|item| &item.opportunity)
        .collect();

    let (profile_result, search_result, application_result) = tokio::join!(
        optimize_profile(llm, profile),
        async {
            if top.is_empty() {
                None
            } else {
                scout_opportunities(llm, profile, &top).await
            }
        },
        async {
            if opportunities.is_empty() {
                None
            } else {
                plan_applications(llm, profile, opportunities).await
            }
        },
    );

    let result = synthesize(profile_result, search_result, application_result);

    info!(
        opportunities = opportunities.len(),
        profile = result.profile_optimization.is_some(),
        search = result.search_strategies.is_some(),
        applications = result.application_strategy.is_some(),
        success_probability = result.success_probability,
        "Strategy run complete"
    );

    result
}

/// Deterministic merge of the settled agent outputs.
pub fn synthesize(
    profile_result: Option<ProfileOptimizationResult>,
    search_result: Option<OpportunitySearchResult>,
    application_result: Option<ApplicationStrategyResult>,
) -> StrategyResult {
    let mut priority_actions = Vec::new();
    if let Some(prof) = &profile_result {
        priority_actions.extend(
            prof.quick_wins
                .iter()
                .take(QUICK_WIN_ACTIONS)
                .map(|win| win.action.clone()),
        );
        priority_actions.extend(
            prof.critical_gaps
                .iter()
                .take(GAP_ACTIONS)
                .map(|gap| format!("Address: {}", gap.description)),
        );
    }
    priority_actions.truncate(MAX_PRIORITY_ACTIONS);

    let mut recommended_next_steps: Vec<String> = application_result
        .iter()
        .flat_map(|strategy| strategy.prioritized_applications.iter())
        .take(NEXT_STEP_APPLICATIONS)
        .map(|app| {
            format!(
                "{} - {} priority",
                app.opportunity_title,
                app.priority_level.as_str()
            )
        })
        .collect();
    recommended_next_steps.truncate(MAX_NEXT_STEPS);

    let success_probability = success_probability(&profile_result, &application_result);
    let time_investment_hours = application_result
        .as_ref()
        .map(|s| s.effort_estimate_total_hours)
        .unwrap_or(0);

    StrategyResult {
        profile_optimization: profile_result,
        search_strategies: search_result,
        application_strategy: application_result,
        priority_actions,
        success_probability,
        time_investment_hours,
        recommended_next_steps,
    }
}

fn success_probability(
    profile_result: &Option<ProfileOptimizationResult>,
    application_result: &Option<ApplicationStrategyResult>,
) -> f64 {
    let (Some(prof), Some(strategy)) = (profile_result, application_result) else {
        return 0.0;
    };
    let sample: Vec<f64> = strategy
        .prioritized_applications
        .iter()
        .take(SUCCESS_SAMPLE)
        .map(|app| app.success_probability)
        .collect();
    if sample.is_empty() {
        return 0.0;
    }

    let application_mean = sample.iter().sum::<f64>() / sample.len() as f64;
    let profile_factor = prof.profile_strength_score / 10.0;
    round3((application_mean + profile_factor) / 2.0)
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Pairs the caller's chosen opportunities with their latest score.
///
/// `opportunities` keeps its listing order. `history` is newest first, so
/// the first entry for an opportunity is its latest evaluation.
pub fn score_selected(
    opportunities: Vec<Opportunity>,
    selected: &[Uuid],
    history: &[MatchResultRow],
) -> Vec<ScoredOpportunity> {
    let mut latest: HashMap<Uuid, f64> = HashMap::new();
    for row in history {
        if let Some(id) = row.opportunity_id {
            latest.entry(id).or_insert(row.compatibility_score);
        }
    }

    opportunities
        .into_iter()
        .filter(|opp| selected.contains(&opp.id))
        .map(|opp| ScoredOpportunity {
            score: latest.get(&opp.id).copied().unwrap_or(UNSCORED_DEFAULT),
            opportunity: opp.details,
        })
        .collect()
}

/// Turns recent history into scored opportunities, dropping entries whose
/// opportunity no longer exists. Keeps history order.
pub fn score_from_history(
    history: &[MatchResultRow],
    opportunities: Vec<Opportunity>,
) -> Vec<ScoredOpportunity> {
    let by_id: HashMap<Uuid, OpportunityDetails> = opportunities
        .into_iter()
        .map(|opp| (opp.id, opp.details))
        .collect();

    history
        .iter()
        .filter_map(|row| {
            let details = by_id.get(&row.opportunity_id?)?;
            Some(ScoredOpportunity {
                opportunity: details.clone(),
                score: row.compatibility_score,
            })
        })
        .collect()
}
