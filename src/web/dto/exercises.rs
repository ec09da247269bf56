use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::DatabaseResult;
use crate::model::entity::{Exercise, ExerciseCreateUpdate, Question, QuestionCreate};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ExerciseBody {
    pub title: String,
    pub description: String,
    pub exercise_type: String,
    pub content: String,
    pub audio_url: Option<String>,
    pub language_id: String,
    pub level_id: String,
    #[serde(default)]
    pub questions: Vec<QuestionCreate>,
}

impl From<&ExerciseBody> for ExerciseCreateUpdate {
    fn from(body: &ExerciseBody) -> Self {
        Self {
            title: body.title.clone(),
            description: body.description.clone(),
            exercise_type: body.exercise_type.clone(),
            content: body.content.clone(),
            audio_url: body.audio_url.clone(),
            language_id: body.language_id.clone(),
            level_id: body.level_id.clone(),
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ExerciseSummary {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub exercise_type: String,
    pub language_id: String,
    pub level_id: String,
}

impl From<Exercise> for ExerciseSummary {
    fn from(e: Exercise) -> Self {
        Self {
            id: e.id(),
            title: e.title().to_string(),
            description: e.description().to_string(),
            exercise_type: e.exercise_type().to_string(),
            language_id: e.language_id().to_string(),
            level_id: e.level_id().to_string(),
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct QuestionResponse {
    pub id: Uuid,
    pub prompt: String,
    pub options: Vec<String>,
    /// Present only for admins; students never see the answer key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
}

impl QuestionResponse {
    pub fn from_question(q: &Question, include_answer: bool) -> DatabaseResult<Self> {
        Ok(Self {
            id: q.id(),
            prompt: q.prompt().to_string(),
            options: q.options_list()?,
            correct_answer: include_answer.then(|| q.correct_answer().to_string()),
        })
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ExerciseResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub exercise_type: String,
    pub content: String,
    pub audio_url: Option<String>,
    pub language_id: String,
    pub level_id: String,
    pub questions: Vec<QuestionResponse>,
}

impl ExerciseResponse {
    pub fn new(
        exercise: Exercise,
        questions: &[Question],
        include_answers: bool,
    ) -> DatabaseResult<Self> {
        let questions = questions
            .iter()
            .map(|q| QuestionResponse::from_question(q, include_answers))
            .collect::<DatabaseResult<Vec<_>>>()?;

        Ok(Self {
            id: exercise.id(),
            title: exercise.title().to_string(),
            description: exercise.description().to_string(),
            exercise_type: exercise.exercise_type().to_string(),
            content: exercise.content().to_string(),
            audio_url: exercise.audio_url().map(String::from),
            language_id: exercise.language_id().to_string(),
            level_id: exercise.level_id().to_string(),
            questions,
        })
    }
}
