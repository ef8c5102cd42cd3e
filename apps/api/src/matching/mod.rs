//! Single and batch match evaluation.
//!
//! A batch runs one fetch → evaluate → persist pipeline per opportunity id,
//! all concurrently inside the request future. Every pipeline settles on its
//! own: a failure is recorded against its id and never stops the siblings.

pub mod handlers;

use std::cmp::Ordering;
use std::collections::HashSet;

use futures::future::join_all;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::agents::evaluator::{evaluate_match, MatchEvaluation};
use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::models::opportunity::OpportunityDetails;
use crate::models::profile::Profile;
use crate::repository::Repository;

/// One successful batch pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEvaluation {
    pub opportunity_id: Uuid,
    pub opportunity_title: String,
    pub compatibility_score: f64,
    pub strengths: String,
    pub gaps: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedEvaluation {
    pub opportunity_id: Uuid,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchEvaluation {
    /// Highest compatibility first; ties keep request order.
    pub results: Vec<RankedEvaluation>,
    pub failed: Vec<FailedEvaluation>,
}

/// Evaluates one opportunity. Never fails; see `MatchEvaluation::sentinel`.
pub async fn evaluate_single(
    llm: &LlmClient,
    profile: &Profile,
    opportunity: &OpportunityDetails,
) -> MatchEvaluation {
    evaluate_match(llm, profile, opportunity).await
}

/// Rejects an empty id list or one with duplicates.
pub fn validate_batch_ids(ids: &[Uuid]) -> Result<(), AppError> {
    if ids.is_empty() {
        return Err(AppError::Validation(
            "opportunity_ids must contain at least one id".to_string(),
        ));
    }
    let mut seen = HashSet::with_capacity(ids.len());
    for id in ids {
        if !seen.insert(id) {
            return Err(AppError::Validation(format!(
                "opportunity_ids contains {id} more than once"
            )));
        }
    }
    Ok(())
}

async fn evaluate_one(
    repo: &dyn Repository,
    llm: &LlmClient,
    user_id: Uuid,
    profile: &Profile,
    opportunity_id: Uuid,
) -> Result<RankedEvaluation, AppError> {
    let opportunity = repo.get_opportunity(user_id, opportunity_id).await?;
    let evaluation = evaluate_match(llm, profile, &opportunity.details).await;
    repo.save_match_result(user_id, &opportunity.details, &evaluation, Some(opportunity_id))
        .await?;

    Ok(RankedEvaluation {
        opportunity_id,
        opportunity_title: opportunity.details.title,
        compatibility_score: evaluation.compatibility_score,
        strengths: evaluation.strengths,
        gaps: evaluation.gaps,
        recommendation: evaluation.recommendation,
    })
}

/// Evaluates every id concurrently and ranks the survivors.
pub async fn evaluate_batch(
    repo: &dyn Repository,
    llm: &LlmClient,
    user_id: Uuid,
    profile: &Profile,
    opportunity_ids: &[Uuid],
) -> Result<BatchEvaluation, AppError> {
    validate_batch_ids(opportunity_ids)?;

    let settled = join_all(
        opportunity_ids
            .iter()
            .map(|&id| evaluate_one(repo, llm, user_id, profile, id)),
    )
    .await;

    let mut results = Vec::with_capacity(settled.len());
    let mut failed = Vec::new();
    for (&opportunity_id, outcome) in opportunity_ids.iter().zip(settled) {
        match outcome {
            Ok(ranked) => results.push(ranked),
            Err(e) => {
                warn!(%opportunity_id, error = %e, "Batch evaluation failed for opportunity");
                failed.push(FailedEvaluation {
                    opportunity_id,
                    reason: e.to_string(),
                });
            }
        }
    }

    rank(&mut results);

    info!(
        requested = opportunity_ids.len(),
        succeeded = results.len(),
        failed = failed.len(),
        "Batch evaluation complete"
    );

    Ok(BatchEvaluation { results, failed })
}

/// Stable descending sort on compatibility.
fn rank(results: &mut [RankedEvaluation]) {
    results.sort_by(|a, b| {
        b.compatibility_score
            .partial_cmp(&a.compatibility_score)
            .unwrap_or(Ordering::Equal)
    });
}
