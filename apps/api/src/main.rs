mod allocation;
mod batches;
mod config;
mod db;
mod errors;
mod ingest;
mod llm_client;
mod models;
mod notify;
mod provisioning;
mod routes;
mod state;
mod store;
mod trainees;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::batches::materialize::AccountMaterializer;
use crate::config::{Config, NotifierKind, ProfileGeneratorKind};
use crate::db::create_pool;
use crate::ingest::text::DocumentTextExtractor;
use crate::llm_client::LlmClient;
use crate::notify::{HttpEmailNotifier, LogNotifier, Notifier};
use crate::provisioning::{
    CredentialProvisioner, HeuristicProfileGenerator, LlmProfileGenerator, ProfileGenerator,
};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{InMemoryStore, OnboardingStore, PgStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed or missing env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting onboarding API v{}", env!("CARGO_PKG_VERSION"));

    let store: Arc<dyn OnboardingStore> = match &config.database_url {
        Some(url) => Arc::new(PgStore::new(create_pool(url).await?)),
        None => {
            warn!("DATABASE_URL not set; using in-memory store (data is lost on restart)");
            Arc::new(InMemoryStore::new())
        }
    };

    let generator: Arc<dyn ProfileGenerator> = match config.profile_generator {
        ProfileGeneratorKind::Heuristic => Arc::new(HeuristicProfileGenerator),
        ProfileGeneratorKind::Llm => {
            let api_key = config
                .anthropic_api_key
                .clone()
                .context("ANTHROPIC_API_KEY is required for the LLM profile generator")?;
            let llm = LlmClient::new(api_key)?;
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Arc::new(LlmProfileGenerator::new(llm))
        }
    };
    info!("Profile generator: {}", generator.backend());

    let notifier: Arc<dyn Notifier> = match (&config.notifier, &config.mail_api) {
        (NotifierKind::Http, Some(api)) => Arc::new(HttpEmailNotifier::new(
            api.clone(),
            config.sender_email.clone(),
            config.sender_name.clone(),
        )?),
        (NotifierKind::Http, None) => anyhow::bail!("NOTIFIER=http requires MAIL_API_* settings"),
        (NotifierKind::Log, _) => {
            info!("Notifier: log (welcome messages are not emailed)");
            Arc::new(LogNotifier)
        }
    };

    let provisioner = Arc::new(CredentialProvisioner::new(
        generator,
        store.clone(),
        config.employee_id_prefix.clone(),
    ));
    info!(
        "Employee IDs: {}-NNNN; skills: {:?}; batch size {}",
        provisioner.employee_id_prefix(),
        config.skill_priority,
        config.batch_size
    );

    let materializer = Arc::new(AccountMaterializer::new(
        store.clone(),
        provisioner,
        notifier,
        config.company_name.clone(),
    ));

    // Build app state
    let state = AppState {
        store,
        extractor: Arc::new(DocumentTextExtractor::default()),
        materializer,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
