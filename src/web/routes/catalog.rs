use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router, middleware, response::IntoResponse};

use crate::model::entity::{Language, Level};
use crate::model::{Operation, ResourceTyped, authorize};
use crate::web::error::ErrorResponse;
use crate::web::{AppState, RequestContext, WebError, WebResult, middlewares};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/languages/", get(languages_list_handler))
        .route("/levels/", get(levels_list_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/languages/",
    description = "Lists the available course languages",
    responses(
        (status = 200, description = "Languages found", body = Vec<Language>),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "catalog"
)]
async fn languages_list_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    authorize(user, Operation::BrowseCatalog)
        .map_err(|_| WebError::resource_forbidden(Language::get_resource_type()))?;

    let languages = Language::list(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(Language::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(languages)))
}

#[utoipa::path(
    get,
    path = "/api/v1/levels/",
    description = "Lists the available difficulty levels",
    responses(
        (status = 200, description = "Levels found", body = Vec<Level>),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "catalog"
)]
async fn levels_list_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    authorize(user, Operation::BrowseCatalog)
        .map_err(|_| WebError::resource_forbidden(Level::get_resource_type()))?;

    let levels = Level::list(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(Level::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(levels)))
}
