use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Duration;
use serde::Deserialize;
use tower_cookies::{Cookie, Cookies, cookie::SameSite};

use crate::{
    Config,
    auth::{self, SessionClaims, hash_password, verify_password},
    model::{
        CrudRepository, ResourceTyped, post_login_destination,
        entity::{UserEntity, UserEntityCreateUpdate},
    },
    web::{
        AppState, RequestContext, UserRole, WebError, WebResult,
        dto::account::SigninResponse,
        error::ErrorResponse,
        middlewares::{self, AUTH_TOKEN},
    },
};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SignupBody {
    pub email: String,
    pub name: String,
    pub password: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SigninBody {
    pub email: String,
    pub password: String,
}

pub fn routes<S>(state: AppState) -> Router<S> {
    let protected = Router::new()
        .route("/verify", get(account_verify_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ));

    Router::new()
        .route("/signup", post(account_signup_handler))
        .route("/signin", post(account_signin_handler))
        .merge(protected)
        .with_state(state)
}

async fn issue_session_cookie(cookies: &Cookies, user: &UserEntity) -> WebResult<()> {
    let config = Config::get_or_init(false).await;
    let timestamp = (chrono::Utc::now() + Duration::days(config.app().session_days())).timestamp();

    let claims = SessionClaims {
        sub: user.id().to_string(),
        name: user.name().to_string(),
        role: user.role().to_string(),
        exp: timestamp,
    };
    let token = auth::generate_token(claims, config.app().jwt())
        .map_err(|e| WebError::server_crypt_error(e.into()))?;

    let mut cookie = Cookie::new(AUTH_TOKEN, token);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_http_only(true);
    cookie.set_path("/");
    cookies.add(cookie);
    Ok(())
}

#[utoipa::path(
    post,
    path = "/api/v1/account/signup",
    request_body = SignupBody,
    description = "Registers a new student account",
    responses(
        (status = 200, description = "Account created successfully", body = SigninResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "account"
)]
async fn account_signup_handler(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<SignupBody>,
) -> WebResult<impl IntoResponse> {
    let admin = crate::web::AuthenticatedUser::admin();
    let found = UserEntity::find_by_email(state.pool(), &admin, &payload.email)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    if found.is_some() {
        return Err(WebError::registration_conflict());
    }

    let hash = hash_password(&payload.password).map_err(WebError::server_crypt_error)?;
    let payload = UserEntityCreateUpdate {
        email: payload.email,
        name: payload.name,
        password_hash: hash,
        role: UserRole::Student.to_string(),
    };

    let created = UserEntity::create(state.pool(), &admin, payload)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    issue_session_cookie(&cookies, &created).await?;

    let redirect_to = post_login_destination(&created.role());
    Ok((
        StatusCode::OK,
        Json(SigninResponse {
            user: created,
            redirect_to,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/account/signin",
    description = "Verifies credentials and opens a session",
    request_body = SigninBody,
    responses(
        (status = 200, description = "Signed in", body = SigninResponse),
        (status = 401, description = "Credentials invalid", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "account",
)]
async fn account_signin_handler(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<SigninBody>,
) -> WebResult<impl IntoResponse> {
    let admin = crate::web::AuthenticatedUser::admin();
    let found = UserEntity::find_by_email(state.pool(), &admin, &payload.email)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    // a miss and a bad password answer the same, nothing to enumerate
    let Some(found) = found else {
        return Err(WebError::auth_invalid_credentials());
    };

    let is_verified =
        verify_password(found.hash(), &payload.password).map_err(WebError::server_crypt_error)?;

    if !is_verified {
        return Err(WebError::auth_invalid_credentials());
    }

    issue_session_cookie(&cookies, &found).await?;

    let redirect_to = post_login_destination(&found.role());
    Ok((
        StatusCode::OK,
        Json(SigninResponse {
            user: found,
            redirect_to,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/account/verify",
    description = "Probes whether the current session is valid",
    responses(
        (status = 200, description = "Session valid"),
        (status = 401, description = "No valid session"),
    ),
    tag = "account",
    security(
        ("cookie" = [])
    )
)]
async fn account_verify_handler(ctx: RequestContext) -> WebResult<impl IntoResponse> {
    let user = ctx.maybe_user();

    if user.is_none() {
        return Ok(StatusCode::UNAUTHORIZED);
    }

    Ok(StatusCode::OK)
}
