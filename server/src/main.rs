// Forbid unwrap() in production code to prevent panics from bad configuration.
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
use std::process::ExitCode;
use std::sync::Arc;

use server::auth::{AccessTokenRepository, InMemoryAccessTokenRepository, ResourceServerFactory};
use server::config::ServerConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "server=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment variables
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        "Loaded configuration: config_file={}, revoked_tokens={}",
        config.config_file.display(),
        config.revoked_tokens.len()
    );

    let repository: Arc<dyn AccessTokenRepository> = Arc::new(
        InMemoryAccessTokenRepository::with_revoked(config.revoked_tokens),
    );

    let resource_server =
        match ResourceServerFactory::from_file(&config.config_file, Some(repository)) {
            Ok(resource_server) => resource_server,
            Err(e) => {
                tracing::error!("Failed to build resource server: {e}");
                return ExitCode::FAILURE;
            }
        };

    // Without a token argument the run only checks that the configuration is usable.
    let Some(token) = std::env::args().nth(1) else {
        tracing::info!("Resource server configuration is valid");
        return ExitCode::SUCCESS;
    };

    match resource_server.validate_bearer_token(&token) {
        Ok(authenticated) => {
            println!("access_token_id: {}", authenticated.access_token_id);
            println!(
                "client_id: {}",
                authenticated.client_id.as_deref().unwrap_or("-")
            );
            println!("user_id: {}", authenticated.user_id.as_deref().unwrap_or("-"));
            println!("scopes: {}", authenticated.scopes.join(" "));
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Access token rejected: {e}");
            ExitCode::FAILURE
        }
    }
}
