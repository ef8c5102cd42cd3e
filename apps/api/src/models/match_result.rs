use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Append-only snapshot of one evaluation. The opportunity fields are
/// denormalized so history survives edits and deletes of the opportunity.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MatchResultRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub opportunity_id: Option<Uuid>,
    pub opportunity_title: String,
    pub opportunity_type: String,
    pub opportunity_description: String,
    pub compatibility_score: f64,
    pub strengths: String,
    pub gaps: String,
    pub recommendation: String,
    pub evaluated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryStats {
    pub total: i64,
    /// Rounded to 3 decimal places.
    pub avg_score: f64,
    pub best_match: f64,
    pub materials_generated: i64,
}

impl HistoryStats {
    pub fn new(total: i64, avg_score: f64, best_match: f64, materials_generated: i64) -> Self {
        Self {
            total,
            avg_score: (avg_score * 1000.0).round() / 1000.0,
            best_match,
            materials_generated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_round_average_to_three_places() {
        let stats = HistoryStats::new(3, 0.666_666_7, 0.9, 2);
        assert_eq!(stats.avg_score, 0.667);
        assert_eq!(stats.best_match, 0.9);
    }

    #[test]
    fn test_empty_history_stats_are_zero() {
        let stats = HistoryStats::new(0, 0.0, 0.0, 0);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.avg_score, 0.0);
    }
}
