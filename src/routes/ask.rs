use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    routing::post,
    Json, Router,
};
use tracing::{error, info};

use crate::extract::{ContentExtractor, UploadedFile};
use crate::models::{AnswerResponse, AppState};
use crate::types::{AppError, AppResult};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/", post(ask_question))
        .route("/api", post(ask_question))
        .with_state(state)
}

/// Fields of the multipart form
#[derive(Debug)]
struct AskForm {
    question: String,
    file: Option<UploadedFile>,
}

impl AskForm {
    async fn from_multipart(mut multipart: Multipart) -> AppResult<Self> {
        let mut question = None;
        let mut file = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::InvalidRequest(e.body_text()))?
        {
            let name = field.name().map(str::to_owned);
            match name.as_deref() {
                Some("question") => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| AppError::InvalidRequest(e.body_text()))?;
                    question = Some(text);
                }
                Some("file") => {
                    let filename = field.file_name().unwrap_or_default().to_string();
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::InvalidRequest(e.body_text()))?;
                    // Browsers send an empty part when no file was picked
                    if !filename.is_empty() {
                        file = Some(UploadedFile::new(filename, data));
                    }
                }
                _ => {}
            }
        }

        let question =
            question.ok_or_else(|| AppError::InvalidRequest("field 'question' is required".to_string()))?;
        Ok(Self { question, file })
    }
}

pub async fn ask_question(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<AnswerResponse>> {
    let result = answer(&state, multipart).await;
    if let Err(e) = &result {
        error!(error = %e, "Request failed");
    }
    result.map(Json)
}

async fn answer(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<AnswerResponse> {
    let multipart = multipart.map_err(|e| AppError::InvalidRequest(e.body_text()))?;
    let form = AskForm::from_multipart(multipart).await?;

    info!(
        question_len = form.question.len(),
        filename = form.file.as_ref().map(|f| f.filename.as_str()),
        "Question received"
    );

    let file_content = match form.file {
        Some(upload) => extract_upload(state.extractor.clone(), upload).await?,
        None => String::new(),
    };

    let answer = state.answerer.answer(&form.question, &file_content).await?;
    Ok(AnswerResponse { answer })
}

/// Parsing is blocking file work, keep it off the async workers
async fn extract_upload(extractor: ContentExtractor, upload: UploadedFile) -> AppResult<String> {
    let text = tokio::task::spawn_blocking(move || extractor.extract(&upload))
        .await
        .map_err(|e| AppError::Internal(format!("extraction task failed: {}", e)))??;
    Ok(text)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    use crate::agents::answer::testing::FakeAdapter;
    use crate::agents::{AnswerAgent, PromptTemplate};
    use crate::config::{Config, ExtractionConfig, LLMConfig, PromptConfig, ServerConfig};
    use crate::extract::{fixtures, ContentExtractor, FailurePolicy};
    use crate::llm::provider::LLM;
    use crate::models::AppState;
    use crate::routes::create_router;
    use crate::types::ErrorBody;

    const BOUNDARY: &str = "----docqa-test-boundary";

    fn config() -> Config {
        Config {
            server: ServerConfig {
                port: 0,
                host: "127.0.0.1".to_string(),
                cors_allowed_origins: vec!["*".to_string()],
                max_upload_bytes: 10 * 1024 * 1024,
            },
            llm: LLMConfig {
                anthropic_api_key: "test".to_string(),
                anthropic_base_url: "http://127.0.0.1:9".to_string(),
            },
            extraction: ExtractionConfig {
                strict: false,
                scratch_dir: None,
            },
            prompt: PromptConfig { template_path: None },
        }
    }

    fn app(fake: Arc<FakeAdapter>, policy: FailurePolicy) -> axum::Router {
        let answerer = AnswerAgent::new(LLM::from_adapter("fake", fake), PromptTemplate::default());
        create_router(AppState::new(config(), ContentExtractor::new(policy), answerer))
    }

    fn multipart(question: Option<&str>, file: Option<(&str, &[u8])>) -> Request<Body> {
        let mut body: Vec<u8> = Vec::new();
        if let Some(question) = question {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"question\"\r\n\r\n{question}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((filename, data)) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_question_without_file() {
        let fake = FakeAdapter::answering("42");
        let response = app(fake.clone(), FailurePolicy::Isolate)
            .oneshot(multipart(Some("What is 6 x 7?"), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = json_body(response).await;
        assert_eq!(body, serde_json::json!({"answer": "42"}));

        assert_eq!(fake.call_count(), 1);
        let prompt = fake.last_prompt().unwrap();
        assert!(prompt.contains("Question: What is 6 x 7?\n\nFile Content:\n\n\nInstructions:"));
    }

    #[tokio::test]
    async fn test_question_with_text_file() {
        let fake = FakeAdapter::answering("blue");
        let response = app(fake.clone(), FailurePolicy::Isolate)
            .oneshot(multipart(Some("Which colour?"), Some(("notes.txt", b"the sky is blue"))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let prompt = fake.last_prompt().unwrap();
        assert!(prompt.contains("File Content:\nText content:\nthe sky is blue\n"));
    }

    #[tokio::test]
    async fn test_invalid_zip_still_answers() {
        let fake = FakeAdapter::answering("n/a");
        let response = app(fake.clone(), FailurePolicy::Isolate)
            .oneshot(multipart(Some("Q"), Some(("bundle.zip", b"not a zip at all"))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(fake
            .last_prompt()
            .unwrap()
            .contains("File Content:\nInvalid ZIP file format\n"));
    }

    #[tokio::test]
    async fn test_archive_with_corrupt_member_succeeds() {
        let data = fixtures::zip_bytes(&[
            ("notes.txt", b"keep me"),
            ("broken.pdf", b"garbage"),
        ]);
        let fake = FakeAdapter::answering("ok");
        let response = app(fake.clone(), FailurePolicy::Isolate)
            .oneshot(multipart(Some("Q"), Some(("bundle.zip", data.as_slice()))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let prompt = fake.last_prompt().unwrap();
        assert!(prompt.contains("Text content of notes.txt:\nkeep me"));
        assert!(prompt.contains("Error reading PDF broken.pdf: "));
    }

    #[tokio::test]
    async fn test_upstream_failure_is_server_error() {
        let fake = FakeAdapter::failing("upstream timed out");
        let response = app(fake.clone(), FailurePolicy::Isolate)
            .oneshot(multipart(Some("Q"), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: ErrorBody = json_body(response).await;
        assert_eq!(body.detail, "An error occurred: LLM API error: upstream timed out");
        assert_eq!(fake.call_count(), 1);
    }

    #[tokio::test]
    async fn test_strict_policy_fails_request_on_bad_pdf() {
        let fake = FakeAdapter::answering("unused");
        let response = app(fake.clone(), FailurePolicy::Propagate)
            .oneshot(multipart(Some("Q"), Some(("paper.pdf", b"nope"))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: ErrorBody = json_body(response).await;
        assert!(body.detail.starts_with("An error occurred: "));
        assert_eq!(fake.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_question_is_rejected() {
        let fake = FakeAdapter::answering("unused");
        let response = app(fake.clone(), FailurePolicy::Isolate)
            .oneshot(multipart(None, Some(("notes.txt", b"x"))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: ErrorBody = json_body(response).await;
        assert!(body.detail.contains("question"));
        assert_eq!(fake.call_count(), 0);
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(FakeAdapter::answering(""), FailurePolicy::Isolate)
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["message"], "API is running");
    }
}
