use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router, middleware, response::IntoResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::grading::{self, GradingError};
use crate::model::entity::{
    Exercise, ExerciseAttempt, ExerciseAttemptCreate, ExerciseType, Language, Level, Question,
};
use crate::model::{CrudRepository, Operation, ResourceType, ResourceTyped, authorize};
use crate::web::dto::exercises::{ExerciseBody, ExerciseResponse, ExerciseSummary};
use crate::web::dto::submissions::{SubmissionResponse, SubmitAnswersRequest};
use crate::web::error::ErrorResponse;
use crate::web::{
    AppState, AuthenticatedUser, RequestContext, UserRole, WebError, WebResult, middlewares,
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(exercises_list_handler).post(exercises_create_handler))
        .route(
            "/{id}",
            get(exercises_get_handler)
                .put(exercises_update_handler)
                .delete(exercises_delete_handler),
        )
        .route("/{id}/submit", post(exercises_submit_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ExerciseSearchQuery {
    pub search: Option<String>,
}

/// Payload checks that run before anything is written: the type must be
/// one of the closed set, and a choice question's answer key must be one
/// of its options.
fn validate_exercise_body(body: &ExerciseBody) -> WebResult<ExerciseType> {
    let exercise_type: ExerciseType = body.exercise_type.parse().map_err(|e: String| {
        WebError::resource_bad_request(Exercise::get_resource_type(), e)
    })?;

    if exercise_type.is_choice_based() {
        for q in &body.questions {
            if q.options.is_empty() {
                return Err(WebError::resource_bad_request(
                    ResourceType::Question,
                    format!("question \"{}\" has no options", q.prompt),
                ));
            }
            if !q.options.contains(&q.correct_answer) {
                return Err(WebError::resource_bad_request(
                    ResourceType::Question,
                    format!(
                        "correct answer of question \"{}\" is not one of its options",
                        q.prompt
                    ),
                ));
            }
        }
    }

    Ok(exercise_type)
}

/// The referenced language and level must exist; a typo answers 400, not
/// a foreign key violation.
async fn validate_reference_data(
    state: &AppState,
    user: &AuthenticatedUser,
    body: &ExerciseBody,
) -> WebResult<()> {
    let language = Language::find_by_id(state.pool(), user, &body.language_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Language::get_resource_type(), e))?;
    if language.is_none() {
        return Err(WebError::resource_bad_request(
            Language::get_resource_type(),
            format!("unknown language: {}", body.language_id),
        ));
    }

    let level = Level::find_by_id(state.pool(), user, &body.level_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Level::get_resource_type(), e))?;
    if level.is_none() {
        return Err(WebError::resource_bad_request(
            Level::get_resource_type(),
            format!("unknown level: {}", body.level_id),
        ));
    }

    Ok(())
}

#[utoipa::path(
    get,
    path = "/api/v1/exercises/",
    description = "Lists exercise summaries, optionally filtered by search text",
    params(
        ("search" = Option<String>, Query, description = "Text filter over title and description")
    ),
    responses(
        (status = 200, description = "Exercises found", body = Vec<ExerciseSummary>),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "exercises"
)]
async fn exercises_list_handler(
    State(state): State<AppState>,
    Query(query): Query<ExerciseSearchQuery>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    authorize(user, Operation::BrowseCatalog)
        .map_err(|_| WebError::resource_forbidden(Exercise::get_resource_type()))?;

    let exercises = Exercise::search(state.pool(), user, query.search.as_deref())
        .await
        .map_err(|e| WebError::resource_fetch_error(Exercise::get_resource_type(), e))?;

    let summaries: Vec<ExerciseSummary> =
        exercises.into_iter().map(ExerciseSummary::from).collect();

    Ok((StatusCode::OK, Json(summaries)))
}

#[utoipa::path(
    get,
    path = "/api/v1/exercises/{id}",
    description = "Fetches an exercise with its ordered questions",
    params(
        ("id" = Uuid, Path, description = "ID of the exercise to get")
    ),
    responses(
        (status = 200, description = "Exercise found", body = ExerciseResponse),
        (status = 404, description = "Exercise not found", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "exercises"
)]
async fn exercises_get_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    authorize(user, Operation::BrowseCatalog)
        .map_err(|_| WebError::resource_forbidden(Exercise::get_resource_type()))?;

    let exercise = Exercise::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Exercise::get_resource_type(), e))?;

    let Some(exercise) = exercise else {
        return Err(WebError::resource_not_found(Exercise::get_resource_type()));
    };

    let questions = Question::find_all_by_exercise(state.pool(), user, exercise.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Question::get_resource_type(), e))?;

    let include_answers = user.user_role() == UserRole::Admin;
    let response = ExerciseResponse::new(exercise, &questions, include_answers)
        .map_err(|e| WebError::resource_fetch_error(Question::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/v1/exercises/",
    description = "Creates an exercise together with its question set",
    request_body = ExerciseBody,
    responses(
        (status = 200, description = "Exercise created", body = ExerciseResponse),
        (status = 400, description = "Malformed payload", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Only admins author exercises", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "exercises"
)]
async fn exercises_create_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(payload): Json<ExerciseBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    authorize(user, Operation::AuthorExercises)
        .map_err(|_| WebError::resource_forbidden(Exercise::get_resource_type()))?;

    validate_exercise_body(&payload)?;
    validate_reference_data(&state, user, &payload).await?;

    let exercise = Exercise::create(state.pool(), user, (&payload).into())
        .await
        .map_err(|e| WebError::resource_fetch_error(Exercise::get_resource_type(), e))?;

    let questions = Question::create_all(state.pool(), user, exercise.id(), payload.questions)
        .await
        .map_err(|e| WebError::resource_fetch_error(Question::get_resource_type(), e))?;

    let response = ExerciseResponse::new(exercise, &questions, true)
        .map_err(|e| WebError::resource_fetch_error(Question::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    put,
    path = "/api/v1/exercises/{id}",
    description = "Updates an exercise and replaces its question set",
    params(
        ("id" = Uuid, Path, description = "ID of the exercise to update")
    ),
    request_body = ExerciseBody,
    responses(
        (status = 200, description = "Exercise updated", body = ExerciseResponse),
        (status = 400, description = "Malformed payload", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Only admins author exercises", body = ErrorResponse),
        (status = 404, description = "Exercise not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "exercises"
)]
async fn exercises_update_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
    Json(payload): Json<ExerciseBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    authorize(user, Operation::AuthorExercises)
        .map_err(|_| WebError::resource_forbidden(Exercise::get_resource_type()))?;

    validate_exercise_body(&payload)?;
    validate_reference_data(&state, user, &payload).await?;

    let found = Exercise::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Exercise::get_resource_type(), e))?;

    let Some(found) = found else {
        return Err(WebError::resource_not_found(Exercise::get_resource_type()));
    };

    let updated = found
        .update(state.pool(), user, (&payload).into())
        .await
        .map_err(|e| WebError::resource_fetch_error(Exercise::get_resource_type(), e))?;

    Question::delete_all_by_exercise(state.pool(), user, updated.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Question::get_resource_type(), e))?;
    let questions = Question::create_all(state.pool(), user, updated.id(), payload.questions)
        .await
        .map_err(|e| WebError::resource_fetch_error(Question::get_resource_type(), e))?;

    let response = ExerciseResponse::new(updated, &questions, true)
        .map_err(|e| WebError::resource_fetch_error(Question::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/exercises/{id}",
    description = "Deletes an exercise; its questions cascade",
    params(
        ("id" = Uuid, Path, description = "ID of the exercise to delete")
    ),
    responses(
        (status = 200, description = "Exercise deleted"),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Only admins author exercises", body = ErrorResponse),
        (status = 404, description = "Exercise not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "exercises"
)]
async fn exercises_delete_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    authorize(user, Operation::AuthorExercises)
        .map_err(|_| WebError::resource_forbidden(Exercise::get_resource_type()))?;

    let found = Exercise::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Exercise::get_resource_type(), e))?;

    let Some(found) = found else {
        return Err(WebError::resource_not_found(Exercise::get_resource_type()));
    };

    found
        .delete(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(Exercise::get_resource_type(), e))?;

    Ok(StatusCode::OK)
}

#[utoipa::path(
    post,
    path = "/api/v1/exercises/{id}/submit",
    description = "Grades a complete answer map and records the attempt",
    params(
        ("id" = Uuid, Path, description = "ID of the exercise being answered")
    ),
    request_body = SubmitAnswersRequest,
    responses(
        (status = 200, description = "Submission graded", body = SubmissionResponse),
        (status = 400, description = "One or more questions unanswered", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 404, description = "Exercise not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "exercises"
)]
async fn exercises_submit_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
    Json(payload): Json<SubmitAnswersRequest>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    authorize(user, Operation::SubmitAnswers)
        .map_err(|_| WebError::resource_forbidden(Exercise::get_resource_type()))?;

    let exercise = Exercise::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Exercise::get_resource_type(), e))?;

    let Some(exercise) = exercise else {
        return Err(WebError::resource_not_found(Exercise::get_resource_type()));
    };

    let questions = Question::find_all_by_exercise(state.pool(), user, exercise.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Question::get_resource_type(), e))?;

    let answers = payload.into_answer_map();
    let graded = grading::grade(exercise.exercise_type(), &questions, &answers).map_err(
        |GradingError::Incomplete { missing }| WebError::submission_incomplete(missing),
    )?;

    // nothing was written until this point; the attempt and its progress
    // row commit together or not at all
    let attempt = ExerciseAttempt::create_completed(
        state.pool(),
        user,
        ExerciseAttemptCreate {
            user_id: user.user_id(),
            exercise_id: exercise.id(),
            score: graded.score,
        },
    )
    .await
    .map_err(|e| WebError::resource_fetch_error(ExerciseAttempt::get_resource_type(), e))?;

    Ok((
        StatusCode::OK,
        Json(SubmissionResponse {
            attempt_id: attempt.id(),
            graded,
        }),
    ))
}
