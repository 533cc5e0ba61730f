use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dharma_decode::llm::perplexity::PerplexityClient;
use dharma_decode::llm::CompletionClient;
use dharma_decode::session::SessionRegistry;
use dharma_decode::tts::google::GoogleTranslateTts;
use dharma_decode::tts::SpeechSynthesizer;
use dharma_decode::{config::Config, routes::create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dharma_decode=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration; a missing API key halts startup here.
    let config = Config::from_env()?;
    info!("Configuration loaded: {:?}", config.server);

    let completion: Arc<dyn CompletionClient> =
        Arc::new(PerplexityClient::new(&config.completion));
    let synthesizer: Arc<dyn SpeechSynthesizer> = Arc::new(GoogleTranslateTts::new(&config.tts));

    let state = AppState {
        config: config.clone(),
        sessions: SessionRegistry::new(),
        completion,
        synthesizer,
    };

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Server listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
