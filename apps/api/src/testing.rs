//! Test doubles: a scripted model provider and an in-memory repository.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::agents::evaluator::MatchEvaluation;
use crate::errors::AppError;
use crate::llm_client::{GenerationError, GenerationRequest, LlmClient, ModelProvider};
use crate::materials::generator::GeneratedMaterial;
use crate::models::match_result::{HistoryStats, MatchResultRow};
use crate::models::material::MaterialRow;
use crate::models::opportunity::{
    ApplicationStatus, Opportunity, OpportunityDetails, OpportunityPatch, OpportunityStatusRow,
};
use crate::models::profile::{Profile, ProfileInput};
use crate::repository::Repository;
use crate::schema::{parse, FieldType, ObjectSchema, StructuredOutput};

// ────────────────────────────────────────────────────────────────────────────
// Scripted provider
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub schema_name: String,
    pub system: String,
    pub prompt: String,
    pub temperature: f32,
    pub attachment_types: Vec<String>,
}

type Script = dyn Fn(&RecordedCall) -> Result<Value, GenerationError> + Send + Sync;

/// A `ModelProvider` whose answers come from a closure over the call.
pub struct ScriptedProvider {
    script: Arc<Script>,
    delay: Option<Duration>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl ScriptedProvider {
    pub fn new<F>(script: F) -> Self
    where
        F: Fn(&RecordedCall) -> Result<Value, GenerationError> + Send + Sync + 'static,
    {
        Self {
            script: Arc::new(script),
            delay: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every call fails with a 503.
    pub fn failing(message: &'static str) -> Self {
        Self::new(move |_| {
            Err(GenerationError::Api {
                status: 503,
                message: message.to_string(),
            })
        })
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Arc<Mutex<Vec<RecordedCall>>> {
        Arc::clone(&self.calls)
    }

    pub fn into_client(self) -> LlmClient {
        LlmClient::new(Arc::new(self), Duration::from_secs(30))
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<Value, GenerationError> {
        let call = RecordedCall {
            schema_name: request.schema.name.to_string(),
            system: request.system.to_string(),
            prompt: request.prompt.to_string(),
            temperature: request.params.temperature,
            attachment_types: request
                .attachments
                .iter()
                .map(|a| a.media_type.clone())
                .collect(),
        };
        self.calls.lock().unwrap().push(call.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.script)(&call)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Fixtures
// ────────────────────────────────────────────────────────────────────────────

pub fn sample_profile() -> Profile {
    Profile {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        name: "Amina Okafor".to_string(),
        education_level: "Master's".to_string(),
        field_of_study: "Environmental Engineering".to_string(),
        gpa: Some(3.7),
        skills: "Python, GIS, hydrology modelling".to_string(),
        experience_years: 2,
        languages: "English, French".to_string(),
        achievements: "Published water quality study".to_string(),
        goals: "PhD in climate adaptation".to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn sample_profile_input() -> ProfileInput {
    serde_json::from_value(json!({
        "name": "Amina Okafor",
        "education_level": "Master's",
        "field_of_study": "Environmental Engineering",
        "gpa": 3.7,
        "skills": "Python, GIS, hydrology modelling",
        "experience_years": 2,
        "languages": "English, French",
        "achievements": "Published water quality study",
        "goals": "PhD in climate adaptation"
    }))
    .unwrap()
}

pub fn sample_details(title: &str) -> OpportunityDetails {
    OpportunityDetails {
        title: title.to_string(),
        opp_type: "scholarship".to_string(),
        description: format!("{title} supports graduate research in water systems"),
        requirements: "Master's degree, research proposal".to_string(),
        deadline: Some("2027-03-01".to_string()),
        provider: None,
        funding: None,
        location: None,
        link: None,
    }
}

/// A valid profile optimizer payload with `wins` quick wins and `gaps`
/// critical gaps, numbered from 1.
pub fn optimization_json(strength: f64, wins: usize, gaps: usize) -> Value {
    let plan = |period: &str| {
        json!({
            "period": period,
            "goals": ["Strengthen research profile"],
            "tasks": ["Draft statement"],
            "success_metrics": ["Draft reviewed"]
        })
    };
    json!({
        "profile_strength_score": strength,
        "completeness_percentage": 80,
        "match_potential_increase": 25,
        "critical_gaps": (1..=gaps).map(|i| json!({
            "category": "Experience",
            "severity": "critical",
            "description": format!("gap {i}"),
            "impact": "Limits eligibility"
        })).collect::<Vec<_>>(),
        "quick_wins": (1..=wins).map(|i| json!({
            "action": format!("win {i}"),
            "impact": "Visible improvement",
            "time_estimate": "2 hours",
            "priority": "high"
        })).collect::<Vec<_>>(),
        "high_impact_improvements": [{
            "area": "Publications",
            "current_state": "One paper",
            "target_state": "Two papers",
            "action_steps": ["Submit second manuscript"],
            "timeline": "90 days",
            "impact_score": 0.8
        }],
        "action_plan_30_days": plan("Days 1-30"),
        "action_plan_60_days": plan("Days 31-60"),
        "action_plan_90_days": plan("Days 61-90"),
        "overall_recommendation": "Solid foundation"
    })
}

pub fn scout_json() -> Value {
    json!({
        "search_queries": [{
            "query": "hydrology PhD scholarship",
            "reasoning": "Matches research focus",
            "priority": "high"
        }],
        "similar_opportunities": [{
            "title": "Water Futures Fellowship",
            "type": "fellowship",
            "why_similar": "Same research area",
            "relevance_score": 0.7
        }],
        "hidden_opportunities": ["Regional water authority grants"],
        "recommendation": "Target research-heavy programs"
    })
}

/// A valid strategist payload with one prioritized application per
/// success probability, titled "App 1", "App 2", ...
pub fn strategy_json(probabilities: &[f64], total_hours: i64) -> Value {
    let levels = ["High", "Medium", "Low"];
    json!({
        "prioritized_applications": probabilities.iter().enumerate().map(|(i, p)| json!({
            "opportunity_title": format!("App {}", i + 1),
            "priority_level": levels[i % 3],
            "match_score": 0.8,
            "deadline": "2027-03-01",
            "reasoning": "Good fit",
            "estimated_effort_hours": 10,
            "success_probability": p,
            "roi_score": 0.5
        })).collect::<Vec<_>>(),
        "weekly_timeline": [{
            "week": "Week 1",
            "tasks": ["Collect transcripts"],
            "deadline_focus": ["App 1"]
        }],
        "strategy_summary": "Focus on strongest matches",
        "effort_estimate_total_hours": total_hours,
        "recommended_focus": ["App 1"]
    })
}

pub fn evaluation_json(score: f64) -> Value {
    json!({
        "compatibility_score": score,
        "strengths": "Relevant research",
        "gaps": "Limited teaching",
        "recommendation": "Apply"
    })
}

/// Parses `raw` and checks that the declared schema and `T`'s serialized
/// form name the same fields at every level. Arrays are checked through
/// their elements, so `raw` needs at least one element in each.
pub fn assert_schema_matches_struct<T: StructuredOutput + Serialize>(raw: Value) {
    let parsed: T = parse(raw).unwrap();
    let serialized = serde_json::to_value(&parsed).unwrap();
    assert_object_fields(&serialized, &T::schema(), "$");
}

fn assert_object_fields(value: &Value, schema: &ObjectSchema, path: &str) {
    let object = value
        .as_object()
        .unwrap_or_else(|| panic!("{path} did not serialize as an object"));
    let mut declared: Vec<&str> = schema.fields.iter().map(|f| f.name).collect();
    let mut serialized: Vec<&str> = object.keys().map(String::as_str).collect();
    declared.sort_unstable();
    serialized.sort_unstable();
    assert_eq!(declared, serialized, "fields differ at {path} ({})", schema.name);

    for field in &schema.fields {
        assert_nested_fields(&object[field.name], &field.ty, &format!("{path}.{}", field.name));
    }
}

fn assert_nested_fields(value: &Value, ty: &FieldType, path: &str) {
    match ty {
        FieldType::Object(schema) => assert_object_fields(value, schema, path),
        FieldType::Array(item) => {
            let items = value.as_array().unwrap_or_else(|| panic!("{path} is not an array"));
            assert!(!items.is_empty(), "{path} needs an element to check");
            for (i, element) in items.iter().enumerate() {
                assert_nested_fields(element, item, &format!("{path}[{i}]"));
            }
        }
        FieldType::String { .. } | FieldType::Number { .. } | FieldType::Integer => {}
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory repository
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Store {
    profiles: HashMap<Uuid, Profile>,
    opportunities: Vec<Opportunity>,
    statuses: HashMap<(Uuid, Uuid), OpportunityStatusRow>,
    match_results: Vec<MatchResultRow>,
    materials: Vec<MaterialRow>,
}

/// Vec-backed `Repository`. Insertion order stands in for timestamps, so
/// "newest first" means reverse insertion order.
#[derive(Default)]
pub struct InMemoryRepository {
    store: Mutex<Store>,
    failing_saves: Mutex<HashSet<Uuid>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `save_match_result` fail for this opportunity id.
    pub fn fail_saves_for(&self, opportunity_id: Uuid) {
        self.failing_saves.lock().unwrap().insert(opportunity_id);
    }

    pub fn match_result_count(&self) -> usize {
        self.store.lock().unwrap().match_results.len()
    }

    fn with_status(store: &Store, mut opportunity: Opportunity) -> Opportunity {
        opportunity.status = store
            .statuses
            .get(&(opportunity.user_id, opportunity.id))
            .map(|s| s.status.clone());
        opportunity
    }
}

fn not_found(kind: &str, id: Uuid) -> AppError {
    AppError::NotFound(format!("{kind} {id} not found"))
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, AppError> {
        Ok(self.store.lock().unwrap().profiles.get(&user_id).cloned())
    }

    async fn upsert_profile(
        &self,
        user_id: Uuid,
        input: &ProfileInput,
    ) -> Result<Profile, AppError> {
        let mut store = self.store.lock().unwrap();
        let now = Utc::now();
        let existing = store.profiles.get(&user_id);
        let profile = Profile {
            id: existing.map(|p| p.id).unwrap_or_else(Uuid::new_v4),
            user_id,
            name: input.name.clone(),
            education_level: input.education_level.as_str().to_string(),
            field_of_study: input.field_of_study.clone(),
            gpa: input.gpa,
            skills: input.skills.clone(),
            experience_years: input.experience_years,
            languages: input.languages.clone(),
            achievements: input.achievements.clone(),
            goals: input.goals.clone(),
            created_at: existing.map(|p| p.created_at).unwrap_or(now),
            updated_at: now,
        };
        store.profiles.insert(user_id, profile.clone());
        Ok(profile)
    }

    async fn delete_profile(&self, user_id: Uuid) -> Result<(), AppError> {
        match self.store.lock().unwrap().profiles.remove(&user_id) {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound("Profile not found".to_string())),
        }
    }

    async fn list_opportunities(
        &self,
        user_id: Uuid,
        query: Option<&str>,
    ) -> Result<Vec<Opportunity>, AppError> {
        let store = self.store.lock().unwrap();
        let needle = query.map(str::to_lowercase);
        Ok(store
            .opportunities
            .iter()
            .rev()
            .filter(|o| o.user_id == user_id)
            .filter(|o| match &needle {
                Some(n) => [&o.details.title, &o.details.opp_type, &o.details.description]
                    .iter()
                    .any(|f| f.to_lowercase().contains(n)),
                None => true,
            })
            .map(|o| Self::with_status(&store, o.clone()))
            .collect())
    }

    async fn get_opportunity(&self, user_id: Uuid, id: Uuid) -> Result<Opportunity, AppError> {
        let store = self.store.lock().unwrap();
        store
            .opportunities
            .iter()
            .find(|o| o.id == id && o.user_id == user_id)
            .map(|o| Self::with_status(&store, o.clone()))
            .ok_or_else(|| not_found("Opportunity", id))
    }

    async fn create_opportunity(
        &self,
        user_id: Uuid,
        details: &OpportunityDetails,
        source: &str,
    ) -> Result<Opportunity, AppError> {
        let opportunity = Opportunity {
            id: Uuid::new_v4(),
            user_id,
            details: details.clone(),
            source: Some(source.to_string()),
            status: None,
            saved_at: Utc::now(),
        };
        self.store
            .lock()
            .unwrap()
            .opportunities
            .push(opportunity.clone());
        Ok(opportunity)
    }

    async fn update_opportunity(
        &self,
        user_id: Uuid,
        id: Uuid,
        patch: &OpportunityPatch,
    ) -> Result<Opportunity, AppError> {
        let mut store = self.store.lock().unwrap();
        let opportunity = store
            .opportunities
            .iter_mut()
            .find(|o| o.id == id && o.user_id == user_id)
            .ok_or_else(|| not_found("Opportunity", id))?;
        patch.apply(&mut opportunity.details);
        let updated = opportunity.clone();
        Ok(Self::with_status(&store, updated))
    }

    async fn delete_opportunity(&self, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
        let mut store = self.store.lock().unwrap();
        let before = store.opportunities.len();
        store
            .opportunities
            .retain(|o| !(o.id == id && o.user_id == user_id));
        if store.opportunities.len() == before {
            return Err(not_found("Opportunity", id));
        }
        store.statuses.remove(&(user_id, id));
        for result in store.match_results.iter_mut() {
            if result.opportunity_id == Some(id) {
                result.opportunity_id = None;
            }
        }
        Ok(())
    }

    async fn set_opportunity_status(
        &self,
        user_id: Uuid,
        id: Uuid,
        status: ApplicationStatus,
    ) -> Result<OpportunityStatusRow, AppError> {
        let mut store = self.store.lock().unwrap();
        if !store
            .opportunities
            .iter()
            .any(|o| o.id == id && o.user_id == user_id)
        {
            return Err(not_found("Opportunity", id));
        }
        let row = OpportunityStatusRow {
            user_id,
            opportunity_id: id,
            status: status.as_str().to_string(),
            updated_at: Utc::now(),
        };
        store.statuses.insert((user_id, id), row.clone());
        Ok(row)
    }

    async fn save_match_result(
        &self,
        user_id: Uuid,
        snapshot: &OpportunityDetails,
        evaluation: &MatchEvaluation,
        opportunity_id: Option<Uuid>,
    ) -> Result<MatchResultRow, AppError> {
        if let Some(id) = opportunity_id {
            if self.failing_saves.lock().unwrap().contains(&id) {
                return Err(AppError::Internal(anyhow::anyhow!("disk full")));
            }
        }
        let row = MatchResultRow {
            id: Uuid::new_v4(),
            user_id,
            opportunity_id,
            opportunity_title: snapshot.title.clone(),
            opportunity_type: snapshot.opp_type.clone(),
            opportunity_description: snapshot.description.clone(),
            compatibility_score: evaluation.compatibility_score,
            strengths: evaluation.strengths.clone(),
            gaps: evaluation.gaps.clone(),
            recommendation: evaluation.recommendation.clone(),
            evaluated_at: Utc::now(),
        };
        self.store.lock().unwrap().match_results.push(row.clone());
        Ok(row)
    }

    async fn list_match_results(
        &self,
        user_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<MatchResultRow>, AppError> {
        let store = self.store.lock().unwrap();
        let limit = limit.map(|l| l.max(0) as usize).unwrap_or(usize::MAX);
        Ok(store
            .match_results
            .iter()
            .rev()
            .filter(|r| r.user_id == user_id)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn get_match_result(&self, user_id: Uuid, id: Uuid) -> Result<MatchResultRow, AppError> {
        self.store
            .lock()
            .unwrap()
            .match_results
            .iter()
            .find(|r| r.id == id && r.user_id == user_id)
            .cloned()
            .ok_or_else(|| not_found("Match result", id))
    }

    async fn delete_match_result(&self, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
        let mut store = self.store.lock().unwrap();
        let before = store.match_results.len();
        store
            .match_results
            .retain(|r| !(r.id == id && r.user_id == user_id));
        if store.match_results.len() == before {
            return Err(not_found("Match result", id));
        }
        Ok(())
    }

    async fn history_stats(&self, user_id: Uuid) -> Result<HistoryStats, AppError> {
        let store = self.store.lock().unwrap();
        let scores: Vec<f64> = store
            .match_results
            .iter()
            .filter(|r| r.user_id == user_id)
            .map(|r| r.compatibility_score)
            .collect();
        let total = scores.len() as i64;
        let avg = if scores.is_empty() {
            0.0
        } else {
            scores.iter().sum::<f64>() / scores.len() as f64
        };
        let best = scores.iter().copied().fold(0.0, f64::max);
        let materials = store
            .materials
            .iter()
            .filter(|m| m.user_id == user_id)
            .count() as i64;
        Ok(HistoryStats::new(total, avg, best, materials))
    }

    async fn save_material(
        &self,
        user_id: Uuid,
        material: &GeneratedMaterial,
        opportunity_id: Option<Uuid>,
        opportunity_title: Option<&str>,
    ) -> Result<MaterialRow, AppError> {
        let row = MaterialRow {
            id: Uuid::new_v4(),
            user_id,
            opportunity_id,
            material_type: material.material_type.as_str().to_string(),
            content: material.content.clone(),
            word_count: material.word_count,
            key_points_highlighted: material.key_points_highlighted.clone(),
            suggestions_for_improvement: material.suggestions_for_improvement.clone(),
            opportunity_title: opportunity_title.map(str::to_string),
            generated_at: Utc::now(),
        };
        self.store.lock().unwrap().materials.push(row.clone());
        Ok(row)
    }

    async fn list_materials(&self, user_id: Uuid) -> Result<Vec<MaterialRow>, AppError> {
        Ok(self
            .store
            .lock()
            .unwrap()
            .materials
            .iter()
            .rev()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn get_material(&self, user_id: Uuid, id: Uuid) -> Result<MaterialRow, AppError> {
        self.store
            .lock()
            .unwrap()
            .materials
            .iter()
            .find(|m| m.id == id && m.user_id == user_id)
            .cloned()
            .ok_or_else(|| not_found("Material", id))
    }

    async fn delete_material(&self, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
        let mut store = self.store.lock().unwrap();
        let before = store.materials.len();
        store
            .materials
            .retain(|m| !(m.id == id && m.user_id == user_id));
        if store.materials.len() == before {
            return Err(not_found("Material", id));
        }
        Ok(())
    }
}
