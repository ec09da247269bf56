use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use crate::web::AuthenticatedUser;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// One scored submission. Append-only: repeated submissions for the
/// same exercise create new rows.
#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct ExerciseAttempt {
    id: Uuid,
    user_id: Uuid,
    exercise_id: Uuid,
    completed: bool,
    score: i32,
    completed_at: DateTime<Utc>,
}

impl ResourceTyped for ExerciseAttempt {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Attempt
    }
}

impl ExerciseAttempt {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn exercise_id(&self) -> Uuid {
        self.exercise_id
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }
}

pub struct ExerciseAttemptCreate {
    pub user_id: Uuid,
    pub exercise_id: Uuid,
    pub score: i32,
}

impl ExerciseAttempt {
    /// Records a graded submission. The attempt row and its progress row
    /// commit in one transaction, so the dashboard aggregates never see
    /// one without the other.
    pub async fn create_completed(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: ExerciseAttemptCreate,
    ) -> DatabaseResult<Self> {
        let mut tx = mm.executor().begin().await?;

        let attempt: Self = sqlx::query_as(
            r#"
            INSERT INTO exercise_attempts (id, user_id, exercise_id, completed, score)
            VALUES ($1,$2,$3,TRUE,$4)
            RETURNING id, user_id, exercise_id, completed, score, completed_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.user_id)
        .bind(data.exercise_id)
        .bind(data.score)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO exercise_progress (id, user_id, exercise_id, status, score)
            VALUES ($1,$2,$3,$4,$5)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(attempt.user_id)
        .bind(attempt.exercise_id)
        .bind(super::progress::ProgressStatus::Completed.to_string())
        .bind(attempt.score)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(attempt)
    }
}

/// A completed attempt joined with the names the activity feed renders.
#[derive(Debug, FromRow)]
pub struct CompletedAttemptRow {
    pub id: Uuid,
    pub user_name: String,
    pub exercise_title: String,
    pub completed_at: DateTime<Utc>,
}

/// Per-student score totals over completed attempts; the ranking itself
/// happens in `stats`.
#[derive(Debug, FromRow)]
pub struct StudentScoreRow {
    pub user_id: Uuid,
    pub name: String,
    pub total_score: i64,
    pub completed: i64,
}

impl ExerciseAttempt {
    pub async fn recent_completed(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        limit: i64,
    ) -> DatabaseResult<Vec<CompletedAttemptRow>> {
        let rows: Vec<CompletedAttemptRow> = sqlx::query_as(
            r#"
            SELECT a.id, u.name AS user_name, e.title AS exercise_title, a.completed_at
            FROM exercise_attempts a
            JOIN users u ON u.id = a.user_id
            JOIN exercises e ON e.id = a.exercise_id
            WHERE a.completed = TRUE
            ORDER BY a.completed_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(mm.executor())
        .await?;

        Ok(rows)
    }

    pub async fn student_scores(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Vec<StudentScoreRow>> {
        let rows: Vec<StudentScoreRow> = sqlx::query_as(
            r#"
            SELECT u.id AS user_id, u.name,
                   COALESCE(SUM(a.score), 0)::BIGINT AS total_score,
                   COUNT(a.id)::BIGINT AS completed
            FROM users u
            JOIN exercise_attempts a ON a.user_id = u.id AND a.completed = TRUE
            WHERE u.role = 'student'
            GROUP BY u.id, u.name
            "#,
        )
        .fetch_all(mm.executor())
        .await?;

        Ok(rows)
    }
}
