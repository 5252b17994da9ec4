// tests/router_tests.rs
//
// Drives the router in-process, without binding a socket.

use std::sync::Arc;

use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use placement::{
    config::Config, routes, state::AppState, store::MemoryStore, utils::jwt::sign_jwt,
};
use serde_json::Value;
use tower::ServiceExt;

const SECRET: &str = "router_test_secret";

fn app() -> axum::Router {
    let store = MemoryStore::new().with_course(1);
    routes::create_router(AppState::new(Arc::new(store), Config::for_testing(SECRET)))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn errors_are_json() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/api/exams/diagnostic/questions?courseId=1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"], "No diagnostic questions for this course");
}

#[tokio::test]
async fn level_below_one_is_rejected() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/api/exams/diagnostic/questions?courseId=1&level=0")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn expired_token_is_rejected() {
    // Default validation allows 60s of leeway, so go well past it.
    let claims = serde_json::json!({ "sub": "1", "role": "user", "exp": 1_000 });
    let token = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();

    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/diagnostic/submit")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"courseId":1,"maxLevel":1,"answers":{}}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn max_level_out_of_range_is_rejected() {
    let store = MemoryStore::new().with_course(1);
    store.insert_diagnostic_question(placement::models::diagnostic::DiagnosticQuestion {
        id: 1,
        course_id: 1,
        level: 1,
        text: "Pick A".to_string(),
        options: vec!["A".to_string(), "B".to_string()],
        correct_answer: "A".to_string(),
        feedback: None,
        recommended_starting_section: "Basics".to_string(),
    });
    let app = routes::create_router(AppState::new(Arc::new(store), Config::for_testing(SECRET)));
    let token = sign_jwt(1, "user", SECRET, 600).unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/diagnostic/submit")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"courseId":1,"maxLevel":0,"answers":{"1":"A"}}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("maxLevel"));
}

#[tokio::test]
async fn missing_content_type_is_a_bad_request() {
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/exams/evaluate")
                .body(Body::from(r#"{"examId":1,"answers":[]}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
