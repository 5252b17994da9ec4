// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    docs,
    handlers::{admin, diagnostic, exam, health},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

const DEFAULT_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://127.0.0.1:3000"];

fn cors_layer(configured: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = if configured.is_empty() {
        DEFAULT_ORIGINS
            .into_iter()
            .map(HeaderValue::from_static)
            .collect()
    } else {
        configured
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin: {}", o);
                    None
                }
            })
            .collect()
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

/// Assembles the main application router.
///
/// * Exam routes and diagnostic question lookup are public.
/// * Diagnostic submission and placement lookup need a bearer token.
/// * Question creation needs a bearer token with the admin role.
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    // Static `diagnostic` segment takes priority over `{exam_id}`.
    let exam_routes = Router::new()
        .route(
            "/diagnostic/questions",
            get(diagnostic::get_diagnostic_questions),
        )
        .route("/evaluate", post(exam::evaluate_exam))
        .route("/{exam_id}/questions", get(exam::get_exam_questions));

    let diagnostic_routes = Router::new()
        .route("/submit", post(diagnostic::submit_diagnostic))
        .route("/placement/{course_id}", get(diagnostic::get_placement))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let admin_routes = Router::new()
        .route("/questions", post(admin::create_question))
        .route(
            "/diagnostic-questions",
            post(admin::create_diagnostic_question),
        )
        // Auth runs first, then the admin check
        .layer(middleware::from_fn(admin_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/health", get(health::health))
        .merge(docs::swagger_ui())
        .nest("/api/exams", exam_routes)
        .nest("/api/diagnostic", diagnostic_routes)
        .nest("/api/admin", admin_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
