//! API Routes
//!
//! This module organizes all HTTP endpoints for the application:
//! - `/api/documents` - Document upload and ingestion
//! - `/api/chat` - Question answering over the session's documents
//! - `/api/audio` - Spoken rendition of the last answer
//! - `/api/health` - Health checks

pub mod audio;
pub mod chat;
pub mod documents;
pub mod health;

use axum::http::HeaderMap;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use crate::models::AppState;

/// Header carrying the caller's session identity. Upload responds with the
/// id to use when the header is absent or unknown.
pub const SESSION_HEADER: &str = "x-session-id";

pub(crate) fn session_id_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    headers.get(SESSION_HEADER)?.to_str().ok()?.parse().ok()
}

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    Router::new()
        .merge(documents::router(state.clone()))
        .merge(chat::router(state.clone()))
        .merge(audio::router(state))
        .merge(health::router())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::json;
    use tower::ServiceExt;

    use crate::config::{CompletionConfig, Config, ServerConfig, TtsConfig};
    use crate::llm::CompletionClient;
    use crate::session::SessionRegistry;
    use crate::tts::SpeechSynthesizer;
    use crate::types::{CompletionError, SynthesisError};

    struct FixedCompletion(&'static str);

    #[async_trait]
    impl CompletionClient for FixedCompletion {
        async fn complete(&self, _prompt: &str) -> Result<String, CompletionError> {
            Ok(self.0.to_string())
        }
    }

    struct FailingCompletion;

    #[async_trait]
    impl CompletionClient for FailingCompletion {
        async fn complete(&self, _prompt: &str) -> Result<String, CompletionError> {
            Err(CompletionError::Api {
                status: 500,
                body: "upstream down".to_string(),
            })
        }
    }

    struct CountingSynthesizer {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SpeechSynthesizer for CountingSynthesizer {
        async fn synthesize(&self, _text: &str) -> Result<Vec<u8>, SynthesisError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![1, 2, 3])
        }
    }

    fn test_config() -> Config {
        Config {
            server: ServerConfig {
                port: 0,
                host: "127.0.0.1".to_string(),
                cors_allowed_origins: vec![],
            },
            completion: CompletionConfig {
                perplexity_api_key: "test-key".to_string(),
                model: "sonar-pro".to_string(),
                max_tokens: 1000,
                temperature: 0.1,
                timeout_secs: 5,
                max_document_chars: 100_000,
            },
            tts: TtsConfig {
                language: "en".to_string(),
                timeout_secs: 5,
            },
        }
    }

    fn test_state(
        completion: Arc<dyn CompletionClient>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
    ) -> AppState {
        AppState {
            config: test_config(),
            sessions: SessionRegistry::new(),
            completion,
            synthesizer,
        }
    }

    const BOUNDARY: &str = "route-test-boundary";

    fn multipart_body(parts: &[(&str, &str, &str)]) -> Vec<u8> {
        let mut body = String::new();
        for (filename, content_type, content) in parts {
            body.push_str(&format!(
                "--{BOUNDARY}\r\n\
                 Content-Disposition: form-data; name=\"files\"; filename=\"{filename}\"\r\n\
                 Content-Type: {content_type}\r\n\r\n\
                 {content}\r\n"
            ));
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));
        body.into_bytes()
    }

    fn upload_request(session_id: Option<&str>, parts: &[(&str, &str, &str)]) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/documents")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            );
        if let Some(id) = session_id {
            builder = builder.header(SESSION_HEADER, id);
        }
        builder.body(Body::from(multipart_body(parts))).unwrap()
    }

    fn chat_request(session_id: Option<&str>, question: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(id) = session_id {
            builder = builder.header(SESSION_HEADER, id);
        }
        builder
            .body(Body::from(json!({ "question": question }).to_string()))
            .unwrap()
    }

    fn audio_request(session_id: &str) -> Request<Body> {
        Request::builder()
            .method("GET")
            .uri("/api/audio")
            .header(SESSION_HEADER, session_id)
            .body(Body::empty())
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let state = test_state(
            Arc::new(FixedCompletion("answer")),
            Arc::new(CountingSynthesizer {
                calls: AtomicUsize::new(0),
            }),
        );
        let response = create_router(state)
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_question_without_documents_is_rejected() {
        let state = test_state(
            Arc::new(FixedCompletion("answer")),
            Arc::new(CountingSynthesizer {
                calls: AtomicUsize::new(0),
            }),
        );
        let response = create_router(state)
            .oneshot(chat_request(None, "When is rent due?"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = json_body(response).await;
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("upload a document"));
    }

    #[tokio::test]
    async fn test_upload_then_ask_round_trip() {
        let state = test_state(
            Arc::new(FixedCompletion("Rent is due on the first of the month.")),
            Arc::new(CountingSynthesizer {
                calls: AtomicUsize::new(0),
            }),
        );
        let router = create_router(state);

        let response = router
            .clone()
            .oneshot(upload_request(
                None,
                &[("lease.txt", "text/plain", "Rent: due on the 1st.")],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let upload = json_body(response).await;
        assert_eq!(upload["ready"], json!(true));
        assert_eq!(upload["files"][0]["status"], json!("ingested"));
        let session_id = upload["session_id"].as_str().unwrap().to_string();

        let response = router
            .oneshot(chat_request(Some(&session_id), "When is rent due?"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let chat = json_body(response).await;
        assert_eq!(
            chat["answer"],
            json!("Rent is due on the first of the month.")
        );
        assert_eq!(chat["session_id"].as_str().unwrap(), session_id);
    }

    #[tokio::test]
    async fn test_unsupported_file_does_not_abort_batch() {
        let state = test_state(
            Arc::new(FixedCompletion("answer")),
            Arc::new(CountingSynthesizer {
                calls: AtomicUsize::new(0),
            }),
        );
        let response = create_router(state)
            .oneshot(upload_request(
                None,
                &[
                    ("scan.png", "image/png", "binaryish"),
                    ("notes.txt", "text/plain", "Clause 3: deposit is refundable."),
                ],
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let upload = json_body(response).await;
        assert_eq!(upload["files"][0]["status"], json!("rejected"));
        assert_eq!(upload["files"][1]["status"], json!("ingested"));
        assert_eq!(upload["ready"], json!(true));
    }

    #[tokio::test]
    async fn test_reupload_of_same_batch_is_idempotent() {
        let state = test_state(
            Arc::new(FixedCompletion("answer")),
            Arc::new(CountingSynthesizer {
                calls: AtomicUsize::new(0),
            }),
        );
        let router = create_router(state);
        let parts = [("lease.txt", "text/plain", "Rent: due on the 1st.")];

        let first = json_body(
            router
                .clone()
                .oneshot(upload_request(None, &parts))
                .await
                .unwrap(),
        )
        .await;
        let session_id = first["session_id"].as_str().unwrap().to_string();

        let second = json_body(
            router
                .oneshot(upload_request(Some(&session_id), &parts))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(second["files"][0]["status"], json!("duplicate"));
        assert_eq!(second["ready"], json!(true));
    }

    #[tokio::test]
    async fn test_changed_batch_resets_session_documents() {
        let state = test_state(
            Arc::new(FixedCompletion("answer")),
            Arc::new(CountingSynthesizer {
                calls: AtomicUsize::new(0),
            }),
        );
        let router = create_router(state);

        let first = json_body(
            router
                .clone()
                .oneshot(upload_request(
                    None,
                    &[
                        ("a.txt", "text/plain", "alpha"),
                        ("b.txt", "text/plain", "beta"),
                    ],
                ))
                .await
                .unwrap(),
        )
        .await;
        let session_id = first["session_id"].as_str().unwrap().to_string();

        // Dropping b.txt changes the set: a.txt must be re-ingested fresh,
        // not reported as a duplicate.
        let second = json_body(
            router
                .oneshot(upload_request(
                    Some(&session_id),
                    &[("a.txt", "text/plain", "alpha")],
                ))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(second["files"][0]["status"], json!("ingested"));
    }

    #[tokio::test]
    async fn test_audio_is_synthesized_once_per_answer() {
        let synthesizer = Arc::new(CountingSynthesizer {
            calls: AtomicUsize::new(0),
        });
        let state = test_state(Arc::new(FixedCompletion("answer text")), synthesizer.clone());
        let router = create_router(state);

        let upload = json_body(
            router
                .clone()
                .oneshot(upload_request(
                    None,
                    &[("lease.txt", "text/plain", "content")],
                ))
                .await
                .unwrap(),
        )
        .await;
        let session_id = upload["session_id"].as_str().unwrap().to_string();

        router
            .clone()
            .oneshot(chat_request(Some(&session_id), "question"))
            .await
            .unwrap();

        let first = router
            .clone()
            .oneshot(audio_request(&session_id))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(
            first.headers().get(header::CONTENT_TYPE).unwrap(),
            "audio/mpeg"
        );
        assert!(first
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap()
            .contains("dharma_decode_answer.mp3"));

        let second = router.oneshot(audio_request(&session_id)).await.unwrap();
        assert_eq!(second.status(), StatusCode::OK);

        let first_bytes = axum::body::to_bytes(first.into_body(), usize::MAX)
            .await
            .unwrap();
        let second_bytes = axum::body::to_bytes(second.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(first_bytes, second_bytes);
        assert_eq!(synthesizer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_audio_before_any_answer_is_not_found() {
        let state = test_state(
            Arc::new(FixedCompletion("answer")),
            Arc::new(CountingSynthesizer {
                calls: AtomicUsize::new(0),
            }),
        );
        let router = create_router(state);

        let upload = json_body(
            router
                .clone()
                .oneshot(upload_request(
                    None,
                    &[("lease.txt", "text/plain", "content")],
                ))
                .await
                .unwrap(),
        )
        .await;
        let session_id = upload["session_id"].as_str().unwrap().to_string();

        let response = router.oneshot(audio_request(&session_id)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_completion_failure_leaves_session_intact() {
        let state = test_state(
            Arc::new(FailingCompletion),
            Arc::new(CountingSynthesizer {
                calls: AtomicUsize::new(0),
            }),
        );
        let router = create_router(state);
        let parts = [("lease.txt", "text/plain", "Rent: due on the 1st.")];

        let upload = json_body(
            router
                .clone()
                .oneshot(upload_request(None, &parts))
                .await
                .unwrap(),
        )
        .await;
        let session_id = upload["session_id"].as_str().unwrap().to_string();

        let response = router
            .clone()
            .oneshot(chat_request(Some(&session_id), "question"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = json_body(response).await;
        assert_eq!(body["error"]["type"], json!("completion_error"));

        // The ingested document survives the failed completion: the same
        // batch re-uploads as duplicates, not as a fresh ingest.
        let reupload = json_body(
            router
                .oneshot(upload_request(Some(&session_id), &parts))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(reupload["files"][0]["status"], json!("duplicate"));
    }

    #[tokio::test]
    async fn test_empty_upload_is_invalid() {
        let state = test_state(
            Arc::new(FixedCompletion("answer")),
            Arc::new(CountingSynthesizer {
                calls: AtomicUsize::new(0),
            }),
        );
        let response = create_router(state)
            .oneshot(upload_request(None, &[]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
