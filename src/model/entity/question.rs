use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use crate::web::AuthenticatedUser;
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// One question of an exercise. `options` holds the choice strings as a
/// JSON-serialized array; dictation questions keep it empty.
#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Question {
    id: Uuid,
    exercise_id: Uuid,
    prompt: String,
    options: String,
    correct_answer: String,
    position: i32,
}

#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct QuestionCreate {
    pub prompt: String,
    #[serde(default)]
    pub options: Vec<String>,
    pub correct_answer: String,
}

impl ResourceTyped for Question {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Question
    }
}

impl Question {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn exercise_id(&self) -> Uuid {
        self.exercise_id
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    pub fn position(&self) -> i32 {
        self.position
    }

    pub fn options_list(&self) -> DatabaseResult<Vec<String>> {
        let options = serde_json::from_str(&self.options)?;
        Ok(options)
    }
}

impl Question {
    /// Inserts a fresh question set for an exercise, preserving the
    /// payload order via `position`.
    pub async fn create_all(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        exercise_id: Uuid,
        questions: Vec<QuestionCreate>,
    ) -> DatabaseResult<Vec<Self>> {
        let mut created = Vec::with_capacity(questions.len());
        for (position, data) in questions.into_iter().enumerate() {
            let options = serde_json::to_string(&data.options)?;
            let row: Self = sqlx::query_as(
                r#"
                INSERT INTO questions (id, exercise_id, prompt, options, correct_answer, position)
                VALUES ($1,$2,$3,$4,$5,$6)
                RETURNING id, exercise_id, prompt, options, correct_answer, position
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(exercise_id)
            .bind(&data.prompt)
            .bind(&options)
            .bind(&data.correct_answer)
            .bind(position as i32)
            .fetch_one(mm.executor())
            .await?;
            created.push(row);
        }

        Ok(created)
    }

    /// Appends one question after the exercise's current last position.
    pub async fn append(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        exercise_id: Uuid,
        data: QuestionCreate,
    ) -> DatabaseResult<Self> {
        let options = serde_json::to_string(&data.options)?;
        let row: Self = sqlx::query_as(
            r#"
            INSERT INTO questions (id, exercise_id, prompt, options, correct_answer, position)
            SELECT $1, $2, $3, $4, $5, COALESCE(MAX(position) + 1, 0)
            FROM questions WHERE exercise_id = $2
            RETURNING id, exercise_id, prompt, options, correct_answer, position
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(exercise_id)
        .bind(&data.prompt)
        .bind(&options)
        .bind(&data.correct_answer)
        .fetch_one(mm.executor())
        .await?;

        Ok(row)
    }

    pub async fn find_all_by_exercise(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        exercise_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        let rows: Vec<Self> = sqlx::query_as(
            r#"
            SELECT *
            FROM questions q
            WHERE q.exercise_id = $1
            ORDER BY q.position
            "#,
        )
        .bind(exercise_id)
        .fetch_all(mm.executor())
        .await?;

        Ok(rows)
    }

    pub async fn delete_all_by_exercise(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        exercise_id: Uuid,
    ) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM questions WHERE exercise_id = $1")
            .bind(exercise_id)
            .execute(mm.executor())
            .await?;
        Ok(())
    }
}
