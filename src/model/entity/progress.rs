use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use crate::web::AuthenticatedUser;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStatus {
    InProgress,
    Completed,
}

impl std::fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InProgress => write!(f, "IN_PROGRESS"),
            Self::Completed => write!(f, "COMPLETED"),
        }
    }
}

/// Tracked state of a user against an exercise, kept separate from the
/// per-submission attempt log.
#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct ExerciseProgress {
    id: Uuid,
    user_id: Uuid,
    exercise_id: Uuid,
    status: String,
    score: i32,
    started_at: DateTime<Utc>,
}

impl ResourceTyped for ExerciseProgress {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Progress
    }
}

impl ExerciseProgress {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn exercise_id(&self) -> Uuid {
        self.exercise_id
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}

impl ExerciseProgress {
    /// Progress rows started in `[from, until)`; an open `until` means
    /// "up to now".
    pub async fn count_started(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        from: DateTime<Utc>,
        until: Option<DateTime<Utc>>,
    ) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM exercise_progress
            WHERE started_at >= $1 AND ($2::TIMESTAMPTZ IS NULL OR started_at < $2)
            "#,
        )
        .bind(from)
        .bind(until)
        .fetch_one(mm.executor())
        .await?;
        Ok(result)
    }

    pub async fn count_completed(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        from: DateTime<Utc>,
        until: Option<DateTime<Utc>>,
    ) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM exercise_progress
            WHERE status = 'COMPLETED'
              AND started_at >= $1 AND ($2::TIMESTAMPTZ IS NULL OR started_at < $2)
            "#,
        )
        .bind(from)
        .bind(until)
        .fetch_one(mm.executor())
        .await?;
        Ok(result)
    }

    pub async fn completed_scores(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        from: DateTime<Utc>,
        until: Option<DateTime<Utc>>,
    ) -> DatabaseResult<Vec<i32>> {
        let scores: Vec<i32> = sqlx::query_scalar(
            r#"
            SELECT score FROM exercise_progress
            WHERE status = 'COMPLETED'
              AND started_at >= $1 AND ($2::TIMESTAMPTZ IS NULL OR started_at < $2)
            "#,
        )
        .bind(from)
        .bind(until)
        .fetch_all(mm.executor())
        .await?;
        Ok(scores)
    }
}
