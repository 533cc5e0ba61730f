use axum::extract::State;
use axum::http::HeaderMap;
use axum::{routing::post, Json, Router};
use tracing::info;

use crate::models::{AppState, AskRequest, AskResponse};
use crate::prompt;
use crate::routes::session_id_from_headers;
use crate::types::{AppError, AppResult};

const UPLOAD_FIRST: &str = "Please upload a document to get started.";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(ask_question))
        .with_state(state)
}

#[tracing::instrument(skip(state, headers, request))]
async fn ask_question(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<AskRequest>,
) -> AppResult<Json<AskResponse>> {
    let question = request.question.trim();
    if question.is_empty() {
        return Err(AppError::InvalidRequest(
            "question must not be empty".to_string(),
        ));
    }

    let Some(session_id) = session_id_from_headers(&headers) else {
        return Err(AppError::NoDocuments(UPLOAD_FIRST.to_string()));
    };
    let Some(handle) = state.sessions.get(session_id).await else {
        return Err(AppError::NoDocuments(UPLOAD_FIRST.to_string()));
    };

    // The session lock is held across the completion call: one action at a
    // time per session, matching the serialized interaction model.
    let mut session = handle.lock().await;
    if !session.is_ready() {
        return Err(AppError::NoDocuments(UPLOAD_FIRST.to_string()));
    }

    let composed = prompt::compose(
        session.document_text(),
        question,
        state.config.completion.max_document_chars,
    );

    let answer = state.completion.complete(&composed).await?;
    session.record_answer(answer.clone());

    info!(%session_id, answer_len = answer.len(), "Question answered");

    Ok(Json(AskResponse { answer, session_id }))
}
