use std::collections::BTreeSet;

use axum::extract::{Multipart, State};
use axum::http::HeaderMap;
use axum::{routing::post, Json, Router};
use tracing::{info, warn};

use crate::extract::{self, DocumentKind};
use crate::models::{AppState, FileStatus, FileStatusKind, UploadResponse, UploadedFile};
use crate::routes::session_id_from_headers;
use crate::session::{IngestOutcome, Session};
use crate::types::{AppError, AppResult, ExtractError};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/documents", post(upload_documents))
        .with_state(state)
}

#[tracing::instrument(skip(state, headers, multipart))]
async fn upload_documents(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    // The reset rule compares the whole batch's filename set, so the batch
    // is collected before any ingestion happens.
    let mut batch: Vec<UploadedFile> = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidRequest(format!("malformed multipart body: {}", e)))?
    {
        let Some(name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field.content_type().map(str::to_string).unwrap_or_default();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidRequest(format!("failed to read upload: {}", e)))?;
        batch.push(UploadedFile {
            name,
            content_type,
            data,
        });
    }

    if batch.is_empty() {
        return Err(AppError::InvalidRequest(
            "no files present in upload".to_string(),
        ));
    }

    let (session_id, handle) = state
        .sessions
        .get_or_create(session_id_from_headers(&headers))
        .await;
    let mut session = handle.lock().await;

    let batch_names: BTreeSet<String> = batch.iter().map(|f| f.name.clone()).collect();
    if session.reset_if_batch_changed(&batch_names) {
        info!(%session_id, "Upload batch changed, session document state reset");
    }

    // Sequential, in upload order. A file that fails only fails itself.
    let files: Vec<FileStatus> = batch.iter().map(|f| ingest_file(&mut session, f)).collect();

    let ready = session.is_ready();
    info!(%session_id, file_count = files.len(), ready, "Upload batch processed");

    Ok(Json(UploadResponse {
        session_id,
        ready,
        files,
    }))
}

fn extract_file(file: &UploadedFile) -> Result<String, ExtractError> {
    let kind = DocumentKind::resolve(&file.content_type, &file.name)
        .ok_or_else(|| ExtractError::UnsupportedType(file.content_type.clone()))?;
    extract::extract_text(&file.data, kind)
}

fn ingest_file(session: &mut Session, file: &UploadedFile) -> FileStatus {
    match extract_file(file) {
        Ok(text) => match session.ingest_extracted(&file.name, &text) {
            IngestOutcome::Ingested => FileStatus {
                filename: file.name.clone(),
                status: FileStatusKind::Ingested,
                detail: None,
            },
            IngestOutcome::Duplicate => FileStatus {
                filename: file.name.clone(),
                status: FileStatusKind::Duplicate,
                detail: Some("already ingested in this session".to_string()),
            },
            IngestOutcome::Empty => FileStatus {
                filename: file.name.clone(),
                status: FileStatusKind::Empty,
                detail: Some("file contained no extractable text".to_string()),
            },
        },
        Err(e) => {
            warn!(filename = %file.name, error = %e, "File extraction failed");
            FileStatus {
                filename: file.name.clone(),
                status: FileStatusKind::Rejected,
                detail: Some(e.to_string()),
            }
        }
    }
}
