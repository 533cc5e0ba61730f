// Google Translate TTS adapter
//
// The endpoint accepts short text fragments only, so answer text is split
// into whitespace-bounded chunks and the returned MP3 payloads are
// concatenated into one buffer.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::config::TtsConfig;
use crate::tts::SpeechSynthesizer;
use crate::types::SynthesisError;

const GOOGLE_TTS_BASE: &str = "https://translate.google.com";
const MAX_CHUNK_CHARS: usize = 200;

pub struct GoogleTranslateTts {
    client: Client,
    base_url: String,
    language: String,
    timeout: Duration,
}

impl GoogleTranslateTts {
    pub fn new(config: &TtsConfig) -> Self {
        Self::with_base_url(config, GOOGLE_TTS_BASE)
    }

    /// Point the adapter at a different endpoint. Used by tests against a
    /// local mock server.
    pub fn with_base_url(config: &TtsConfig, base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            language: config.language.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    async fn fetch_chunk(&self, chunk: &str) -> Result<Vec<u8>, SynthesisError> {
        let url = format!("{}/translate_tts", self.base_url);

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .query(&[
                ("ie", "UTF-8"),
                ("q", chunk),
                ("tl", self.language.as_str()),
                ("client", "tw-ob"),
            ])
            .send()
            .await
            .map_err(|e| SynthesisError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SynthesisError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SynthesisError::Network(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleTranslateTts {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SynthesisError> {
        let chunks = chunk_text(text, MAX_CHUNK_CHARS);
        debug!(chunk_count = chunks.len(), "Synthesizing answer audio");

        let mut audio = Vec::new();
        for chunk in &chunks {
            audio.extend(self.fetch_chunk(chunk).await?);
        }
        Ok(audio)
    }
}

/// Split text into chunks of at most `max_chars` characters, breaking on
/// whitespace. A single word longer than the limit is hard-split at a
/// character boundary.
fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > max_chars {
            chunks.push(std::mem::take(&mut current));
        }

        if word.chars().count() > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            let mut piece = String::new();
            for c in word.chars() {
                piece.push(c);
                if piece.chars().count() == max_chars {
                    chunks.push(std::mem::take(&mut piece));
                }
            }
            current = piece;
            continue;
        }

        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
