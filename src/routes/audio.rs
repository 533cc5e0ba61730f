use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::IntoResponse;
use axum::{routing::get, Router};
use tracing::{debug, info};

use crate::models::AppState;
use crate::routes::session_id_from_headers;
use crate::tts::audio_hash;
use crate::types::{AppError, AppResult};

const AUDIO_CONTENT_TYPE: &str = "audio/mpeg";
const AUDIO_DISPOSITION: &str = "attachment; filename=\"dharma_decode_answer.mp3\"";
const NO_ANSWER: &str = "no answer available to read aloud yet";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/audio", get(answer_audio))
        .with_state(state)
}

#[tracing::instrument(skip(state, headers))]
async fn answer_audio(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let Some(session_id) = session_id_from_headers(&headers) else {
        return Err(AppError::NotFound(NO_ANSWER.to_string()));
    };
    let Some(handle) = state.sessions.get(session_id).await else {
        return Err(AppError::NotFound(NO_ANSWER.to_string()));
    };

    let mut session = handle.lock().await;
    let Some(answer) = session.last_answer().map(str::to_string) else {
        return Err(AppError::NotFound(NO_ANSWER.to_string()));
    };

    let hash = audio_hash(&answer);
    let bytes = match session.cached_audio(&hash) {
        Some(bytes) => {
            debug!(%session_id, "Serving cached answer audio");
            bytes
        }
        None => {
            let bytes = state.synthesizer.synthesize(&answer).await?;
            session.store_audio(hash, bytes.clone());
            info!(%session_id, byte_count = bytes.len(), "Answer audio synthesized");
            bytes
        }
    };

    Ok((
        [
            (header::CONTENT_TYPE, AUDIO_CONTENT_TYPE),
            (header::CONTENT_DISPOSITION, AUDIO_DISPOSITION),
        ],
        bytes,
    ))
}
