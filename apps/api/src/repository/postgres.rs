//! PostgreSQL-backed repository. The pool is shared by every concurrent
//! branch of a request; sqlx pooling makes that safe without extra locking.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::Repository;
use crate::agents::evaluator::MatchEvaluation;
use crate::errors::AppError;
use crate::materials::generator::GeneratedMaterial;
use crate::models::match_result::{HistoryStats, MatchResultRow};
use crate::models::material::MaterialRow;
use crate::models::opportunity::{
    ApplicationStatus, Opportunity, OpportunityDetails, OpportunityPatch, OpportunityStatusRow,
};
use crate::models::profile::{Profile, ProfileInput};

/// Opportunity columns joined with the owner's pipeline status.
const OPPORTUNITY_SELECT: &str = r#"
    SELECT o.id, o.user_id, o.title, o.opp_type, o.description, o.requirements,
           o.deadline, o.provider, o.funding, o.location, o.link, o.source,
           s.status, o.saved_at
    FROM opportunities o
    LEFT JOIN opportunity_statuses s
           ON s.opportunity_id = o.id AND s.user_id = o.user_id
"#;

#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn not_found(kind: &str, id: Uuid) -> AppError {
    AppError::NotFound(format!("{kind} {id} not found"))
}

/// Escapes LIKE wildcards so a search for "100%" matches literally.
fn like_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[async_trait]
impl Repository for PgRepository {
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, AppError> {
        Ok(
            sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn upsert_profile(
        &self,
        user_id: Uuid,
        input: &ProfileInput,
    ) -> Result<Profile, AppError> {
        Ok(sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles
                (user_id, name, education_level, field_of_study, gpa, skills,
                 experience_years, languages, achievements, goals)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (user_id) DO UPDATE SET
                name = EXCLUDED.name,
                education_level = EXCLUDED.education_level,
                field_of_study = EXCLUDED.field_of_study,
                gpa = EXCLUDED.gpa,
                skills = EXCLUDED.skills,
                experience_years = EXCLUDED.experience_years,
                languages = EXCLUDED.languages,
                achievements = EXCLUDED.achievements,
                goals = EXCLUDED.goals,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&input.name)
        .bind(input.education_level.as_str())
        .bind(&input.field_of_study)
        .bind(input.gpa)
        .bind(&input.skills)
        .bind(input.experience_years)
        .bind(&input.languages)
        .bind(&input.achievements)
        .bind(&input.goals)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn delete_profile(&self, user_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM profiles WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Profile not found".to_string()));
        }
        Ok(())
    }

    async fn list_opportunities(
        &self,
        user_id: Uuid,
        query: Option<&str>,
    ) -> Result<Vec<Opportunity>, AppError> {
        let rows = match query.map(str::trim).filter(|q| !q.is_empty()) {
            Some(q) => {
                let sql = format!(
                    "{OPPORTUNITY_SELECT} WHERE o.user_id = $1 \
                     AND (o.title ILIKE $2 OR o.opp_type ILIKE $2 OR o.description ILIKE $2) \
                     ORDER BY o.saved_at DESC"
                );
                sqlx::query_as::<_, Opportunity>(&sql)
                    .bind(user_id)
                    .bind(like_pattern(q))
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!("{OPPORTUNITY_SELECT} WHERE o.user_id = $1 ORDER BY o.saved_at DESC");
                sqlx::query_as::<_, Opportunity>(&sql)
                    .bind(user_id)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows)
    }

    async fn get_opportunity(&self, user_id: Uuid, id: Uuid) -> Result<Opportunity, AppError> {
        let sql = format!("{OPPORTUNITY_SELECT} WHERE o.user_id = $1 AND o.id = $2");
        sqlx::query_as::<_, Opportunity>(&sql)
            .bind(user_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found("Opportunity", id))
    }

    async fn create_opportunity(
        &self,
        user_id: Uuid,
        details: &OpportunityDetails,
        source: &str,
    ) -> Result<Opportunity, AppError> {
        Ok(sqlx::query_as::<_, Opportunity>(
            r#"
            INSERT INTO opportunities
                (user_id, title, opp_type, description, requirements,
                 deadline, provider, funding, location, link, source)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id, user_id, title, opp_type, description, requirements,
                      deadline, provider, funding, location, link, source,
                      NULL::TEXT AS status, saved_at
            "#,
        )
        .bind(user_id)
        .bind(&details.title)
        .bind(&details.opp_type)
        .bind(&details.description)
        .bind(&details.requirements)
        .bind(&details.deadline)
        .bind(&details.provider)
        .bind(&details.funding)
        .bind(&details.location)
        .bind(&details.link)
        .bind(source)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn update_opportunity(
        &self,
        user_id: Uuid,
        id: Uuid,
        patch: &OpportunityPatch,
    ) -> Result<Opportunity, AppError> {
        let mut opportunity = self.get_opportunity(user_id, id).await?;
        patch.apply(&mut opportunity.details);
        let d = &opportunity.details;

        sqlx::query(
            r#"
            UPDATE opportunities SET
                title = $3, opp_type = $4, description = $5, requirements = $6,
                deadline = $7, provider = $8, funding = $9, location = $10, link = $11
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(&d.title)
        .bind(&d.opp_type)
        .bind(&d.description)
        .bind(&d.requirements)
        .bind(&d.deadline)
        .bind(&d.provider)
        .bind(&d.funding)
        .bind(&d.location)
        .bind(&d.link)
        .execute(&self.pool)
        .await?;

        Ok(opportunity)
    }

    async fn delete_opportunity(&self, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM opportunities WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found("Opportunity", id));
        }
        Ok(())
    }

    async fn set_opportunity_status(
        &self,
        user_id: Uuid,
        id: Uuid,
        status: ApplicationStatus,
    ) -> Result<OpportunityStatusRow, AppError> {
        self.get_opportunity(user_id, id).await?;

        Ok(sqlx::query_as::<_, OpportunityStatusRow>(
            r#"
            INSERT INTO opportunity_statuses (user_id, opportunity_id, status)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, opportunity_id) DO UPDATE SET
                status = EXCLUDED.status,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(id)
        .bind(status.as_str())
        .fetch_one(&self.pool)
        .await?)
    }

    async fn save_match_result(
        &self,
        user_id: Uuid,
        snapshot: &OpportunityDetails,
        evaluation: &MatchEvaluation,
        opportunity_id: Option<Uuid>,
    ) -> Result<MatchResultRow, AppError> {
        Ok(sqlx::query_as::<_, MatchResultRow>(
            r#"
            INSERT INTO match_results
                (user_id, opportunity_id, opportunity_title, opportunity_type,
                 opportunity_description, compatibility_score, strengths, gaps, recommendation)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(opportunity_id)
        .bind(&snapshot.title)
        .bind(&snapshot.opp_type)
        .bind(&snapshot.description)
        .bind(evaluation.compatibility_score)
        .bind(&evaluation.strengths)
        .bind(&evaluation.gaps)
        .bind(&evaluation.recommendation)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn list_match_results(
        &self,
        user_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<MatchResultRow>, AppError> {
        // LIMIT NULL means no limit in PostgreSQL.
        Ok(sqlx::query_as::<_, MatchResultRow>(
            "SELECT * FROM match_results WHERE user_id = $1 ORDER BY evaluated_at DESC LIMIT $2",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn get_match_result(&self, user_id: Uuid, id: Uuid) -> Result<MatchResultRow, AppError> {
        sqlx::query_as::<_, MatchResultRow>(
            "SELECT * FROM match_results WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found("Match result", id))
    }

    async fn delete_match_result(&self, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM match_results WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found("Match result", id));
        }
        Ok(())
    }

    async fn history_stats(&self, user_id: Uuid) -> Result<HistoryStats, AppError> {
        let (total, avg_score, best_match): (i64, f64, f64) = sqlx::query_as(
            r#"
            SELECT COUNT(*),
                   COALESCE(AVG(compatibility_score), 0)::FLOAT8,
                   COALESCE(MAX(compatibility_score), 0)::FLOAT8
            FROM match_results
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        let materials_generated: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM generated_materials WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(HistoryStats::new(
            total,
            avg_score,
            best_match,
            materials_generated,
        ))
    }

    async fn save_material(
        &self,
        user_id: Uuid,
        material: &GeneratedMaterial,
        opportunity_id: Option<Uuid>,
        opportunity_title: Option<&str>,
    ) -> Result<MaterialRow, AppError> {
        Ok(sqlx::query_as::<_, MaterialRow>(
            r#"
            INSERT INTO generated_materials
                (user_id, opportunity_id, material_type, content, word_count,
                 key_points_highlighted, suggestions_for_improvement, opportunity_title)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(opportunity_id)
        .bind(material.material_type.as_str())
        .bind(&material.content)
        .bind(material.word_count)
        .bind(&material.key_points_highlighted)
        .bind(&material.suggestions_for_improvement)
        .bind(opportunity_title)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn list_materials(&self, user_id: Uuid) -> Result<Vec<MaterialRow>, AppError> {
        Ok(sqlx::query_as::<_, MaterialRow>(
            "SELECT * FROM generated_materials WHERE user_id = $1 ORDER BY generated_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn get_material(&self, user_id: Uuid, id: Uuid) -> Result<MaterialRow, AppError> {
        sqlx::query_as::<_, MaterialRow>(
            "SELECT * FROM generated_materials WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found("Material", id))
    }

    async fn delete_material(&self, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM generated_materials WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found("Material", id));
        }
        Ok(())
    }
}
