pub mod api;
pub mod config;
pub mod knowledge;
pub mod llm;
pub mod pipeline;

use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use config::{Config, ConfigError, KnowledgeSource, LlmProvider};
use knowledge::{HttpKnowledgeEngine, KnowledgeEngine, KnowledgeError, StaticKnowledgeEngine};
use llm::{BoundModel, GeminiClient, LlmError, LlmGenerate, OllamaClient};
use pipeline::{ConversationOrchestrator, EntityExtractor, ExtractorKind, KeywordExtractor, LlmEntityExtractor};

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Knowledge engine setup failed: {0}")]
    Knowledge(#[from] KnowledgeError),

    #[error("LLM client setup failed: {0}")]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Server(#[from] api::ServerError),

    #[error("Runtime error: {0}")]
    Runtime(#[from] std::io::Error),
}

/// Process entry: tracing, configuration, pipeline, then serve until Ctrl-C.
pub fn run() -> Result<(), StartupError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = Config::from_env()?;
    tracing::info!(?config, "Configuration loaded");

    // Blocking HTTP clients are built (and later dropped) outside the runtime.
    let orchestrator = Arc::new(build_orchestrator(&config)?);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let ctx = api::ApiContext::new(orchestrator.clone());
    runtime.block_on(serve(ctx, &config))?;
    drop(runtime);

    tracing::info!("{} stopped", config::APP_NAME);
    Ok(())
}

/// Wire the knowledge engine, language model and extractor named in `config`.
pub fn build_orchestrator(config: &Config) -> Result<ConversationOrchestrator, StartupError> {
    let engine: Arc<dyn KnowledgeEngine> = match &config.knowledge {
        KnowledgeSource::Remote(url) => {
            tracing::info!(url = %url, "Using remote knowledge engine");
            Arc::new(HttpKnowledgeEngine::new(url, config.http_timeout_secs)?)
        }
        KnowledgeSource::Fixture(path) => {
            tracing::info!(path = %path.display(), "Using static knowledge fact table");
            Arc::new(StaticKnowledgeEngine::from_file(path)?)
        }
    };

    let llm: Arc<dyn LlmGenerate> = match config.provider {
        LlmProvider::Gemini => {
            if config.api_key.is_empty() {
                tracing::warn!("GOOGLE_API_KEY is not set; Gemini calls will be rejected");
            }
            let client = GeminiClient::new(&config.api_key, config.http_timeout_secs)?;
            Arc::new(BoundModel::new(client, config.model.clone()))
        }
        LlmProvider::Ollama => {
            let client = OllamaClient::new(&config.ollama_url, config.http_timeout_secs)?;
            Arc::new(BoundModel::new(client, config.model.clone()))
        }
    };

    let extractor: Arc<dyn EntityExtractor> = match config.extractor {
        ExtractorKind::Keyword => Arc::new(KeywordExtractor::new(config.match_policy)),
        ExtractorKind::Llm => Arc::new(LlmEntityExtractor::new(llm.clone())),
    };

    tracing::info!(
        provider = %config.provider,
        model = %config.model,
        extractor = extractor.name(),
        match_policy = %config.match_policy,
        "Pipeline ready"
    );

    Ok(ConversationOrchestrator::new(extractor, engine, llm))
}

async fn serve(ctx: api::ApiContext, config: &Config) -> Result<(), StartupError> {
    let mut server = api::start_server_on(ctx, config.bind_addr).await?;
    tracing::info!(addr = %server.info.server_addr, "Listening");

    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Ctrl-C received"),
        Err(e) => tracing::error!(error = %e, "Cannot listen for Ctrl-C, shutting down"),
    }

    server.shutdown();
    server.stopped().await;
    Ok(())
}
