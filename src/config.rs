use anyhow::Result;
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub completion: CompletionConfig,
    pub tts: TtsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionConfig {
    pub perplexity_api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
    /// Upper bound on document text embedded into a prompt. Anything past
    /// it is cut and marked, rather than silently rejected by the API.
    pub max_document_chars: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TtsConfig {
    pub language: String,
    pub timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()?,
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                cors_allowed_origins: env::var("ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .collect(),
            },
            completion: CompletionConfig {
                perplexity_api_key: env::var("PERPLEXITY_API_KEY")
                    .expect("PERPLEXITY_API_KEY must be set"),
                model: env::var("COMPLETION_MODEL").unwrap_or_else(|_| "sonar-pro".to_string()),
                max_tokens: env::var("COMPLETION_MAX_TOKENS")
                    .unwrap_or_else(|_| "1000".to_string())
                    .parse()?,
                temperature: env::var("COMPLETION_TEMPERATURE")
                    .unwrap_or_else(|_| "0.1".to_string())
                    .parse()?,
                timeout_secs: env::var("COMPLETION_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()?,
                max_document_chars: env::var("MAX_DOCUMENT_CHARS")
                    .unwrap_or_else(|_| "120000".to_string())
                    .parse()?,
            },
            tts: TtsConfig {
                language: env::var("TTS_LANGUAGE").unwrap_or_else(|_| "en".to_string()),
                timeout_secs: env::var("TTS_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()?,
            },
        })
    }
}
