mod common;
use axum::http::StatusCode;
use serde_json::{Value, json};

use crate::common::{
    Action, Flow, create_exercise_action, seed_admin, setup_server, setup_test_db,
    signin_admin_action, signup_action,
};

fn submit_action(name: &'static str, answers: [&'static str; 2]) -> Action {
    Action::new(name, "POST", "dynamic")
        .with_dyn_path(|ctx| {
            let id = ctx.get("exercise")["id"].as_str().expect("exercise id");
            format!("/api/v1/exercises/{id}/submit")
        })
        .with_dyn_body(move |ctx| {
            let questions = ctx.get("exercise")["questions"]
                .as_array()
                .expect("questions")
                .clone();
            json!({
                "answers": [
                    { "question_id": questions[0]["id"], "answer": answers[0] },
                    { "question_id": questions[1]["id"], "answer": answers[1] },
                ]
            })
        })
}

#[tokio::test]
async fn route_dashboard_forbidden_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(signup_action("student@example.com", "Student", "studentpw"))
        .step(
            Action::new("stats", "GET", "/api/v1/dashboard/stats")
                .with_expect(StatusCode::FORBIDDEN),
        )
        .step(
            Action::new("top", "GET", "/api/v1/students/top").with_expect(StatusCode::FORBIDDEN),
        )
        .step(
            Action::new("page", "GET", "/api/v1/students/page")
                .with_param("limit", "5")
                .with_param("offset", "0")
                .with_expect(StatusCode::FORBIDDEN),
        )
        .step(
            Action::new("recent", "GET", "/api/v1/activities/recent")
                .with_expect(StatusCode::FORBIDDEN),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_dashboard_stats_zero_state_test() {
    let pool = setup_test_db().await;
    seed_admin(&pool).await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(signin_admin_action())
        .step(
            Action::new("stats_empty", "GET", "/api/v1/dashboard/stats").assert_body(|body| {
                let v: Value = serde_json::from_str(body).unwrap();
                assert_eq!(v["active_students"]["value"], 0);
                assert_eq!(v["total_exercises"]["value"], 0);
                // no started exercises means a 0 rate, not a division error
                assert_eq!(v["completion_rate"]["value"], 0);
                assert_eq!(v["average_score"]["value"], 0);
            }),
        )
        .step(
            Action::new("top_empty", "GET", "/api/v1/students/top").assert_body(|body| {
                let v: Value = serde_json::from_str(body).unwrap();
                assert_eq!(v.as_array().unwrap().len(), 0);
            }),
        )
        // negative paging is a client error, not a database one
        .step(
            Action::new("page_negative_limit", "GET", "/api/v1/students/page")
                .with_param("limit", "-1")
                .with_param("offset", "0")
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(
            Action::new("page_negative_offset", "GET", "/api/v1/students/page")
                .with_param("limit", "5")
                .with_param("offset", "-3")
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_dashboard_after_activity_test() {
    let pool = setup_test_db().await;
    seed_admin(&pool).await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(signin_admin_action())
        .step(create_exercise_action())
        // Ada completes with a perfect run
        .step(signup_action("ada@example.com", "Ada", "adapw").with_clear_cookies(true))
        .step(submit_action("ada_100", ["Saturday morning", "The market"]))
        // Ben completes twice: 50 then 100, mean 75
        .step(signup_action("ben@example.com", "Ben", "benpw").with_clear_cookies(true))
        .step(submit_action("ben_50", ["Saturday morning", "The library"]))
        .step(submit_action("ben_100", ["Saturday morning", "The market"]))
        // a rejected half-filled submission writes neither an attempt nor
        // a progress row; the aggregates below must not see it
        .step(
            Action::new("ben_incomplete", "POST", "dynamic")
                .with_dyn_path(|ctx| {
                    let id = ctx.get("exercise")["id"].as_str().expect("exercise id");
                    format!("/api/v1/exercises/{id}/submit")
                })
                .with_dyn_body(|ctx| {
                    let questions = ctx.get("exercise")["questions"]
                        .as_array()
                        .expect("questions")
                        .clone();
                    json!({
                        "answers": [
                            { "question_id": questions[0]["id"], "answer": "Saturday morning" },
                        ]
                    })
                })
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(signin_admin_action().with_clear_cookies(true))
        .step(
            Action::new("stats", "GET", "/api/v1/dashboard/stats").assert_body(|body| {
                let v: Value = serde_json::from_str(body).unwrap();
                assert_eq!(v["active_students"]["value"], 2);
                assert_eq!(v["active_students"]["change"], 2);
                assert_eq!(v["total_exercises"]["value"], 1);
                // every persisted progress row is completed; a leaked row
                // from the rejected submission would drag this below 100
                assert_eq!(v["completion_rate"]["value"], 100);
                // mean of 100, 50, 100
                assert_eq!(v["average_score"]["value"], 83);
            }),
        )
        .step(
            Action::new("top", "GET", "/api/v1/students/top").assert_body(|body| {
                let v: Value = serde_json::from_str(body).unwrap();
                let top = v.as_array().unwrap();
                assert_eq!(top.len(), 2);
                assert_eq!(top[0]["name"], "Ada");
                assert_eq!(top[0]["score"], 100);
                assert_eq!(top[0]["completed_exercises"], 1);
                assert_eq!(top[1]["name"], "Ben");
                assert_eq!(top[1]["score"], 75);
                // two scored attempts; the rejected one left no row
                assert_eq!(top[1]["completed_exercises"], 2);
            }),
        )
        .step(
            Action::new("students_page", "GET", "/api/v1/students/page")
                .with_param("limit", "5")
                .with_param("offset", "0")
                .assert_body(|body| {
                    let v: Value = serde_json::from_str(body).unwrap();
                    assert!(v["total"].is_number());
                    // two students plus the admin account
                    assert_eq!(v["items"].as_array().unwrap().len(), 3);
                }),
        )
        .step(
            Action::new("recent", "GET", "/api/v1/activities/recent").assert_body(|body| {
                let v: Value = serde_json::from_str(body).unwrap();
                let feed = v.as_array().unwrap();
                // 3 completions + 2 signups, capped at 5
                assert_eq!(feed.len(), 5);
                assert!(body.contains("completed the exercise"));
                assert!(body.contains("joined the platform"));
            }),
        )
        .run(&mut server, pool)
        .await;
}
