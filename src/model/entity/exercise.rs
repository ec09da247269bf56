use std::str::FromStr;

use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use sqlx::prelude::Row;
use uuid::Uuid;

/// The closed set of exercise types the platform supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseType {
    Reading,
    Listening,
    Dictation,
}

impl ExerciseType {
    /// Reading and listening present answer options; dictation is free
    /// text.
    pub fn is_choice_based(&self) -> bool {
        matches!(self, Self::Reading | Self::Listening)
    }
}

impl FromStr for ExerciseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reading" => Ok(Self::Reading),
            "listening" => Ok(Self::Listening),
            "dictation" => Ok(Self::Dictation),
            other => Err(format!("unknown exercise type: {other}")),
        }
    }
}

impl std::fmt::Display for ExerciseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reading => write!(f, "reading"),
            Self::Listening => write!(f, "listening"),
            Self::Dictation => write!(f, "dictation"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Exercise {
    id: Uuid,
    title: String,
    description: String,
    exercise_type: String,
    content: String,
    audio_url: Option<String>,
    language_id: String,
    level_id: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ExerciseCreateUpdate {
    pub title: String,
    pub description: String,
    pub exercise_type: String,
    pub content: String,
    pub audio_url: Option<String>,
    pub language_id: String,
    pub level_id: String,
}

impl ResourceTyped for Exercise {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Exercise
    }
}

impl Exercise {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Stored values are validated at authoring time; unparseable rows
    /// degrade to reading, matching how roles degrade to student.
    pub fn exercise_type(&self) -> ExerciseType {
        self.exercise_type
            .parse()
            .unwrap_or(ExerciseType::Reading)
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn audio_url(&self) -> Option<&str> {
        self.audio_url.as_deref()
    }

    pub fn language_id(&self) -> &str {
        &self.language_id
    }

    pub fn level_id(&self) -> &str {
        &self.level_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[async_trait]
impl CrudRepository<Exercise, ExerciseCreateUpdate, Uuid> for Exercise {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: ExerciseCreateUpdate,
    ) -> DatabaseResult<Self> {
        let result = sqlx::query(
            r#"
            INSERT INTO exercises (id, title, description, exercise_type, content, audio_url, language_id, level_id)
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
            RETURNING id, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.exercise_type)
        .bind(&data.content)
        .bind(&data.audio_url)
        .bind(&data.language_id)
        .bind(&data.level_id)
        .fetch_one(mm.executor())
        .await?;

        let id = result.try_get("id")?;
        let created_at = result.try_get("created_at")?;
        Ok(Exercise {
            id,
            title: data.title,
            description: data.description,
            exercise_type: data.exercise_type,
            content: data.content,
            audio_url: data.audio_url,
            language_id: data.language_id,
            level_id: data.level_id,
            created_at,
        })
    }

    async fn update(
        mut self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: ExerciseCreateUpdate,
    ) -> DatabaseResult<Self> {
        sqlx::query(
            r#"
            UPDATE exercises
            SET title = $1, description = $2, exercise_type = $3, content = $4,
                audio_url = $5, language_id = $6, level_id = $7
            WHERE id = $8
            "#,
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.exercise_type)
        .bind(&data.content)
        .bind(&data.audio_url)
        .bind(&data.language_id)
        .bind(&data.level_id)
        .bind(self.id)
        .execute(mm.executor())
        .await?;

        self.title = data.title;
        self.description = data.description;
        self.exercise_type = data.exercise_type;
        self.content = data.content;
        self.audio_url = data.audio_url;
        self.language_id = data.language_id;
        self.level_id = data.level_id;
        Ok(self)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        // questions cascade with the exercise
        sqlx::query("DELETE FROM exercises WHERE id = $1")
            .bind(self.id)
            .execute(mm.executor())
            .await?;
        Ok(())
    }

    async fn find_by_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM exercises WHERE id = $1")
            .bind(id)
            .fetch_one(mm.executor())
            .await;
        if let Err(sqlx::Error::RowNotFound) = result {
            return Ok(None);
        }

        Ok(Some(result?))
    }

    async fn list(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM exercises ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM exercises")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

// Utils
impl Exercise {
    pub async fn search(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        text: Option<&str>,
    ) -> DatabaseResult<Vec<Self>> {
        let rows: Vec<Self> = sqlx::query_as(
            r#"
            SELECT *
            FROM exercises
            WHERE $1::TEXT IS NULL
               OR title ILIKE '%' || $1 || '%'
               OR description ILIKE '%' || $1 || '%'
            ORDER BY created_at DESC
            "#,
        )
        .bind(text)
        .fetch_all(mm.executor())
        .await?;

        Ok(rows)
    }

    pub async fn count_created_before(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        cutoff: DateTime<Utc>,
    ) -> DatabaseResult<i64> {
        let result: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM exercises WHERE created_at < $1")
                .bind(cutoff)
                .fetch_one(mm.executor())
                .await?;
        Ok(result)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn exercise_type_parses_the_closed_set() {
        assert_eq!("reading".parse::<ExerciseType>().unwrap(), ExerciseType::Reading);
        assert_eq!("dictation".parse::<ExerciseType>().unwrap(), ExerciseType::Dictation);
        assert!("speaking".parse::<ExerciseType>().is_err());
    }

    #[test]
    fn choice_based_excludes_dictation() {
        assert!(ExerciseType::Reading.is_choice_based());
        assert!(ExerciseType::Listening.is_choice_based());
        assert!(!ExerciseType::Dictation.is_choice_based());
    }
}
