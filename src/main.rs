use anyhow::{Context, Result};
use slimsite::api::{create_router, ApiState};
use slimsite::auth::Authenticator;
use slimsite::config::AppConfig;
use slimsite::credentials::{CredentialVerifier, XorCipher};
use slimsite::directory::InMemoryDirectory;
use slimsite::token::TokenAuthority;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "slimsite=info".into()),
        )
        .init();

    info!("Slimsite starting...");

    let config = AppConfig::from_env().context("Invalid configuration")?;

    info!(
        db_host = %config.database.host,
        db_name = %config.database.name,
        db_port = config.database.port,
        token_ttl_minutes = config.token.ttl_minutes,
        port = config.server.port,
        "Configuration loaded"
    );
    for name in config.insecure_defaults() {
        warn!(variable = name, "Using insecure built-in default; set it before production use");
    }

    let directory = match &config.server.organizations_file {
        Some(path) => InMemoryDirectory::load_seed_file(path)?,
        None => {
            warn!("SLIMSITE_ORGANIZATIONS_FILE not set; no organization can log in");
            InMemoryDirectory::new()
        }
    };

    let authenticator = Authenticator::new(
        Arc::new(directory),
        CredentialVerifier::new(XorCipher::new(&config.credentials.cipher_key)),
        TokenAuthority::new(&config.token.secret, config.token.ttl()),
        config.credentials.expected_salt.clone(),
    );
    let router = create_router(ApiState {
        authenticator: Arc::new(authenticator),
    });

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.server.port))
        .await
        .context("Failed to bind API port")?;
    info!(port = config.server.port, "API listening");

    axum::serve(listener, router)
        .await
        .context("API server error")?;

    Ok(())
}
