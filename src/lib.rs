// Dharma Decode - AI assistant for questions about uploaded legal documents

pub mod config;
pub mod extract;
pub mod llm;
pub mod models;
pub mod prompt;
pub mod routes;
pub mod session;
pub mod tts;
pub mod types;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
