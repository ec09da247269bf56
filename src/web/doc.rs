use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

pub struct CookieAuthModifier;

impl Modify for CookieAuthModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(schema) = openapi.components.as_mut() {
            schema.add_security_scheme(
                "cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    "SID",
                    "JWT token for current user",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::routes::account::account_signup_handler,
        crate::web::routes::account::account_signin_handler,
        crate::web::routes::account::account_verify_handler,
        crate::web::routes::exercises::exercises_list_handler,
        crate::web::routes::exercises::exercises_get_handler,
        crate::web::routes::exercises::exercises_create_handler,
        crate::web::routes::exercises::exercises_update_handler,
        crate::web::routes::exercises::exercises_delete_handler,
        crate::web::routes::exercises::exercises_submit_handler,
        crate::web::routes::catalog::languages_list_handler,
        crate::web::routes::catalog::levels_list_handler,
        crate::web::routes::dashboard::dashboard_stats_handler,
        crate::web::routes::dashboard::students_page_handler,
        crate::web::routes::dashboard::students_top_handler,
        crate::web::routes::dashboard::activities_recent_handler,
    ),
    modifiers(&CookieAuthModifier),
)]
pub struct ApiDoc;
