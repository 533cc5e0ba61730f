use std::sync::Arc;

use bytes::Bytes;

use crate::config::Config;
use crate::llm::CompletionClient;
use crate::session::SessionRegistry;
use crate::tts::SpeechSynthesizer;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub sessions: SessionRegistry,
    pub completion: Arc<dyn CompletionClient>,
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
}

/// One file as it arrives from the upload surface. Consumed by extraction;
/// the raw bytes are not retained afterwards.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub content_type: String,
    pub data: Bytes,
}

// API Request/Response types

#[derive(Debug, serde::Deserialize)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Debug, serde::Serialize)]
pub struct AskResponse {
    pub answer: String,
    pub session_id: uuid::Uuid,
}

#[derive(Debug, serde::Serialize)]
pub struct UploadResponse {
    pub session_id: uuid::Uuid,
    /// Whether the session now holds usable document text.
    pub ready: bool,
    pub files: Vec<FileStatus>,
}

#[derive(Debug, serde::Serialize)]
pub struct FileStatus {
    pub filename: String,
    pub status: FileStatusKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatusKind {
    Ingested,
    Duplicate,
    Empty,
    Rejected,
}

#[derive(Debug, serde::Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}
