// src/client/api.rs

use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::models::{
    diagnostic::{DiagnosticFeedback, DiagnosticQuestion, DiagnosticSubmission},
    exam::{ExamFeedbackResult, ExamSubmission},
    question::Question,
};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
}

/// Typed client for the grading API.
///
/// Callers build one and pass it where it is needed; the underlying
/// `reqwest::Client` pools connections, so clones are cheap.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Attaches the bearer token issued by the account service.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    pub async fn diagnostic_questions(
        &self,
        course_id: i64,
        level: Option<i32>,
    ) -> Result<Vec<DiagnosticQuestion>, ClientError> {
        let mut query = vec![("courseId", course_id.to_string())];
        if let Some(level) = level {
            query.push(("level", level.to_string()));
        }

        let resp = self
            .http
            .get(self.url("/api/exams/diagnostic/questions"))
            .query(&query)
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn submit_diagnostic(
        &self,
        submission: &DiagnosticSubmission,
    ) -> Result<DiagnosticFeedback, ClientError> {
        let resp = self
            .authorized(self.http.post(self.url("/api/diagnostic/submit")))
            .json(submission)
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn exam_questions(&self, exam_id: i64) -> Result<Vec<Question>, ClientError> {
        let resp = self
            .http
            .get(self.url(&format!("/api/exams/{}/questions", exam_id)))
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn evaluate_exam(
        &self,
        submission: &ExamSubmission,
    ) -> Result<ExamFeedbackResult, ClientError> {
        let resp = self
            .authorized(self.http.post(self.url("/api/exams/evaluate")))
            .json(submission)
            .send()
            .await?;
        decode(resp).await
    }
}

/// Decodes a success body, or turns the server's `{"error": ...}` body into a `ClientError`.
async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp.json::<T>().await?);
    }

    let message = resp
        .json::<serde_json::Value>()
        .await
        .ok()
        .and_then(|body| body["error"].as_str().map(str::to_string))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });

    Err(ClientError::Status {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_dropped() {
        let api = ApiClient::new(reqwest::Client::new(), "http://localhost:3000/");
        assert_eq!(api.url("/health"), "http://localhost:3000/health");
    }
}
