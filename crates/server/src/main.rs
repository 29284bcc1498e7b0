use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use casegen_core::{
    load_config, validate_config, CaseWorkflow, CrmConnector, LlmContentGenerator, OpenAiClient,
    SalesforceConnector, SanitizedConfig,
};
use casegen_server::{api::create_router, state::AppState};

/// Config file picked up from the working directory when `CASEGEN_CONFIG` is unset
const DEFAULT_CONFIG_FILE: &str = "casegen.toml";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // .env is optional; real environment variables win
    let dotenv = dotenvy::dotenv();

    init_tracing();

    if let Ok(path) = &dotenv {
        info!("Loaded environment from {:?}", path);
    }

    let config_path = config_path();
    match &config_path {
        Some(path) => info!("Loading configuration from {:?}", path),
        None => info!("No config file, using environment variables only"),
    }
    let config = load_config(config_path.as_deref())
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!(
        "Effective configuration: {}",
        serde_json::to_string(&SanitizedConfig::from(&config)).unwrap_or_default()
    );

    let connector: Arc<dyn CrmConnector> = Arc::new(
        SalesforceConnector::new(config.crm.clone())
            .context("Failed to create Salesforce connector")?,
    );
    info!(
        "Using CRM connector: {} (login domain: {})",
        connector.name(),
        config.crm.login_domain()
    );

    let llm = OpenAiClient::from_config(&config.generator)
        .context("Failed to create text generation client")?;
    info!("Using text generation model: {}", config.generator.model);
    let generator =
        Arc::new(LlmContentGenerator::new(llm).with_temperature(config.generator.temperature));

    let workflow = CaseWorkflow::new(
        Arc::clone(&connector),
        generator,
        config.workflow.clone(),
    );
    info!("Generation mode: {:?}", config.workflow.mode);

    let addr = SocketAddr::new(config.server.host, config.server.port);
    let state = Arc::new(AppState::new(config, connector, workflow));
    let app = create_router(state);

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

/// Initialize logging. `CASEGEN_LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());

    let json = std::env::var("CASEGEN_LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// `CASEGEN_CONFIG` if set (must exist), else `casegen.toml` if present.
fn config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("CASEGEN_CONFIG") {
        return Some(PathBuf::from(path));
    }
    let default = Path::new(DEFAULT_CONFIG_FILE);
    default.exists().then(|| default.to_path_buf())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
