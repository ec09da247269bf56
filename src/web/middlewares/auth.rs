use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tower_cookies::Cookies;

use crate::{
    Config, auth,
    web::{AppState, RequestContext, UserRole, context::AuthenticatedUser, error::WebError},
};

pub static AUTH_TOKEN: &str = "SID";

/// Turns the session cookie into a [`RequestContext`]. The token is the
/// whole session; no lookup happens here, handlers decide whether an
/// identity is required.
pub async fn extract_context_fn(
    State(_state): State<AppState>,
    cookies: Cookies,
    mut req: Request,
    next: Next,
) -> Result<Response, WebError> {
    let token = match cookies.get(AUTH_TOKEN) {
        Some(token) => token,
        None => {
            req.extensions_mut().insert(RequestContext::new(None));
            return Ok(next.run(req).await);
        }
    };

    let data = auth::process_token(token.value(), Config::get_or_init(false).await.app().jwt())
        .map_err(|e| WebError::auth_cookie_invalid(AUTH_TOKEN, e))?;

    let id = data
        .claims
        .sub
        .parse::<uuid::Uuid>()
        .map_err(|_| WebError::auth_required())?;
    let role = UserRole::from(data.claims.role.as_str());

    req.extensions_mut().insert(RequestContext::new(Some(
        AuthenticatedUser::new(id, data.claims.name, role),
    )));

    Ok(next.run(req).await)
}
