// src/docs.rs

use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    handlers::{admin, diagnostic, exam},
    models::{
        diagnostic::{
            CreateDiagnosticQuestionRequest, DiagnosticFeedback, DiagnosticQuestion,
            DiagnosticSubmission, LevelResult,
        },
        exam::{AnswerFeedback, AnswerSubmission, ExamFeedbackResult, ExamSubmission},
        placement::PlacementRecord,
        question::{CreateQuestionRequest, Question},
    },
};

#[derive(OpenApi)]
#[openapi(
    paths(
        diagnostic::get_diagnostic_questions,
        diagnostic::submit_diagnostic,
        diagnostic::get_placement,
        exam::get_exam_questions,
        exam::evaluate_exam,
        admin::create_question,
        admin::create_diagnostic_question,
    ),
    components(schemas(
        Question,
        DiagnosticQuestion,
        DiagnosticSubmission,
        LevelResult,
        DiagnosticFeedback,
        AnswerSubmission,
        ExamSubmission,
        AnswerFeedback,
        ExamFeedbackResult,
        PlacementRecord,
        CreateQuestionRequest,
        CreateDiagnosticQuestionRequest,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "diagnostic", description = "Placement diagnostics"),
        (name = "exam", description = "Section exams"),
        (name = "admin", description = "Question bank administration")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Swagger UI at `/swagger-ui`, backed by the document at `/api-docs/openapi.json`.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}
