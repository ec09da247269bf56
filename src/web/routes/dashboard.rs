use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router, middleware, response::IntoResponse};
use chrono::{Months, Utc};

use crate::model::entity::{Exercise, ExerciseAttempt, ExerciseProgress, UserEntity};
use crate::model::{Operation, PaginatableRepository, ResourceType, authorize};
use crate::web::routes::PaginationQuery;
use crate::stats::{
    self, Activity, ActivityKind, MetricDelta, RECENT_ACTIVITIES_LIMIT, TopStudent,
};
use crate::web::dto::stats::DashboardStatsResponse;
use crate::web::error::ErrorResponse;
use crate::web::{AppState, AuthenticatedUser, RequestContext, WebError, WebResult, middlewares};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/dashboard/stats", get(dashboard_stats_handler))
        .route("/students/page", get(students_page_handler))
        .route("/students/top", get(students_top_handler))
        .route("/activities/recent", get(activities_recent_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

fn require_dashboard_access(ctx: &RequestContext) -> WebResult<&AuthenticatedUser> {
    let user = ctx.user()?;
    authorize(user, Operation::ViewDashboard)
        .map_err(|_| WebError::resource_forbidden(ResourceType::User))?;
    Ok(user)
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard/stats",
    description = "Computes the four dashboard metrics with their one-month deltas",
    responses(
        (status = 200, description = "Stats computed", body = DashboardStatsResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Admins only", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "dashboard"
)]
async fn dashboard_stats_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let user = require_dashboard_access(&ctx)?;
    let mm = state.pool();

    // calendar-month windows: [cutoff, now) is the current period,
    // [prior_cutoff, cutoff) the one before it
    let now = Utc::now();
    let cutoff = now - Months::new(1);
    let prior_cutoff = cutoff - Months::new(1);

    let map_err = |e| WebError::resource_fetch_error(ResourceType::User, e);

    let (
        students_now,
        students_prior,
        exercises_now,
        exercises_prior,
        started_now,
        completed_now,
        started_prior,
        completed_prior,
        scores_now,
        scores_prior,
    ) = tokio::try_join!(
        UserEntity::count_students(mm, user),
        UserEntity::count_students_before(mm, user, cutoff),
        Exercise::count_created_before(mm, user, now),
        Exercise::count_created_before(mm, user, cutoff),
        ExerciseProgress::count_started(mm, user, cutoff, None),
        ExerciseProgress::count_completed(mm, user, cutoff, None),
        ExerciseProgress::count_started(mm, user, prior_cutoff, Some(cutoff)),
        ExerciseProgress::count_completed(mm, user, prior_cutoff, Some(cutoff)),
        ExerciseProgress::completed_scores(mm, user, cutoff, None),
        ExerciseProgress::completed_scores(mm, user, prior_cutoff, Some(cutoff)),
    )
    .map_err(map_err)?;

    let response = DashboardStatsResponse {
        active_students: MetricDelta::new(students_now, students_prior),
        total_exercises: MetricDelta::new(exercises_now, exercises_prior),
        completion_rate: MetricDelta::new(
            stats::percentage(completed_now, started_now),
            stats::percentage(completed_prior, started_prior),
        ),
        average_score: MetricDelta::new(
            stats::mean_rounded(&scores_now),
            stats::mean_rounded(&scores_prior),
        ),
    };

    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/v1/students/page",
    description = "Pages through registered accounts",
    params(
        ("limit" = i64, Query, description = "Page size"),
        ("offset" = i64, Query, description = "Rows to skip"),
    ),
    responses(
        (status = 200, description = "Returns requested page", body = crate::model::Page<UserEntity>),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Admins only", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "dashboard"
)]
async fn students_page_handler(
    State(state): State<AppState>,
    Query(page): Query<PaginationQuery>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let user = require_dashboard_access(&ctx)?;

    // Postgres rejects negative LIMIT/OFFSET; answer with a 400 instead
    // of letting the query fail.
    if page.limit < 0 || page.offset < 0 {
        return Err(WebError::resource_bad_request(
            ResourceType::User,
            "limit and offset must be non-negative",
        ));
    }

    let users = UserEntity::page(state.pool(), user, page.limit, page.offset)
        .await
        .map_err(|e| WebError::resource_fetch_error(ResourceType::User, e))?;

    Ok((StatusCode::OK, Json(users)))
}

#[utoipa::path(
    get,
    path = "/api/v1/students/top",
    description = "Ranks students by mean score over their completed attempts",
    responses(
        (status = 200, description = "Ranking computed", body = Vec<TopStudent>),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Admins only", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "dashboard"
)]
async fn students_top_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let user = require_dashboard_access(&ctx)?;

    let rows = ExerciseAttempt::student_scores(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(ResourceType::Attempt, e))?;

    Ok((StatusCode::OK, Json(stats::rank_top_students(rows))))
}

#[utoipa::path(
    get,
    path = "/api/v1/activities/recent",
    description = "Merges the newest completions and signups into one feed",
    responses(
        (status = 200, description = "Feed assembled", body = Vec<Activity>),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Admins only", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "dashboard"
)]
async fn activities_recent_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let user = require_dashboard_access(&ctx)?;
    let mm = state.pool();
    let limit = RECENT_ACTIVITIES_LIMIT as i64;

    let (attempts, students) = tokio::try_join!(
        ExerciseAttempt::recent_completed(mm, user, limit),
        UserEntity::recent_students(mm, user, limit),
    )
    .map_err(|e| WebError::resource_fetch_error(ResourceType::Attempt, e))?;

    let mut activities: Vec<Activity> = attempts
        .into_iter()
        .map(|a| Activity {
            id: a.id,
            kind: ActivityKind::ExerciseCompleted,
            description: format!(
                "{} completed the exercise \"{}\"",
                a.user_name, a.exercise_title
            ),
            timestamp: a.completed_at,
        })
        .collect();

    activities.extend(students.into_iter().map(|s| Activity {
        id: s.id(),
        kind: ActivityKind::StudentJoined,
        description: format!("{} joined the platform", s.name()),
        timestamp: s.created_at(),
    }));

    Ok((
        StatusCode::OK,
        Json(stats::merge_recent_activities(activities)),
    ))
}
