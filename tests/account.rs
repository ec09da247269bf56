mod common;
use aspas::web::middlewares::AUTH_TOKEN;
use axum::http::StatusCode;
use tower_cookies::Cookie;
use tower_cookies::cookie::SameSite;

use crate::common::{
    Action, Flow, seed_admin, setup_server, setup_test_db, signin_action, signin_admin_action,
    signup_action,
};

#[tokio::test]
async fn route_signup_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(
            signup_action("foobar@example.com", "Foo Bar", "foobaz")
                .assert_cookie(AUTH_TOKEN, |cookie| {
                    assert_eq!(cookie.same_site(), Some(SameSite::Lax));
                    assert_eq!(cookie.path(), Some("/"));
                    assert_eq!(cookie.http_only(), Some(true));
                })
                .assert_body(|body| {
                    assert!(body.contains("foobar@example.com"));
                    assert!(body.contains("/student/dashboard"));
                    // the hash must never leave the server
                    assert!(!body.contains("password_hash"));
                })
                .with_expect(StatusCode::OK),
        )
        // try to signup twice
        .step(
            signup_action("foobar@example.com", "Foo Bar", "foobaz")
                .with_expect(StatusCode::CONFLICT),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_signin_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(signup_action("signin@example.com", "Signin Test", "SIGNINTEST").with_save_cookies(false))
        .step(
            signin_action("signin@example.com", "SIGNINTEST")
                .assert_cookie(AUTH_TOKEN, |cookie| {
                    assert_eq!(cookie.same_site(), Some(SameSite::Lax));
                    assert_eq!(cookie.path(), Some("/"));
                    assert_eq!(cookie.http_only(), Some(true));
                })
                .assert_body(|body| {
                    assert!(body.contains("signin@example.com"));
                    assert!(body.contains("/student/dashboard"));
                })
                .with_expect(StatusCode::OK)
                .with_clear_cookies(true),
        )
        // wrong credentials
        .step(
            signin_action("signin@example.com", "WRONGPASSWORD")
                .with_save_cookies(false)
                .with_clear_cookies(true)
                .assert_body(|body| {
                    assert!(body.contains("Authentication error"));
                })
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        // non-existing account answers the same as a wrong password
        .step(
            signin_action("nonexisting@example.com", "nvm")
                .with_expect(StatusCode::UNAUTHORIZED)
                .assert_body(|body| assert!(body.contains("Authentication error"))),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_admin_redirect_test() {
    let pool = setup_test_db().await;
    seed_admin(&pool).await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(
            signin_admin_action()
                .assert_body(|body| assert!(body.contains("/admin/dashboard")))
                .with_expect(StatusCode::OK),
        )
        .run(&mut server, pool)
        .await;
}

/// A tampered or expired session cookie reads as "not signed in", the
/// same 401 an anonymous request gets.
#[tokio::test]
async fn route_stale_session_cookie_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    let config = aspas::Config::get_or_init(true).await;
    let expired = aspas::auth::generate_token(
        aspas::auth::SessionClaims {
            sub: uuid::Uuid::new_v4().to_string(),
            name: "Ghost".into(),
            role: "student".into(),
            exp: (chrono::Utc::now() - chrono::Duration::days(1)).timestamp(),
        },
        config.app().jwt(),
    )
    .unwrap();

    Flow::new()
        .step(
            Action::new("verify_garbage_cookie", "GET", "/api/v1/account/verify")
                .with_cookie(Cookie::new(AUTH_TOKEN, "not-a-token"))
                .with_save_cookies(false)
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        .step(
            Action::new("verify_expired_cookie", "GET", "/api/v1/account/verify")
                .with_cookie(Cookie::new(AUTH_TOKEN, expired))
                .with_save_cookies(false)
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_verify_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        // no cookie yet
        .step(
            Action::new("verify_anon", "GET", "/api/v1/account/verify")
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        .step(signup_action("verify@example.com", "Verify Test", "VERIFYTEST"))
        .step(
            Action::new("verify", "GET", "/api/v1/account/verify").with_expect(StatusCode::OK),
        )
        .run(&mut server, pool)
        .await;
}
