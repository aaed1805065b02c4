//! Ucenter API server binary.
//!
//! Reads configuration from flags or environment, connects the Redis session
//! registry and serves the user-center API.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};
use ucenter_api::config::ApiConfig;
use ucenter_core::auth::registry::{DEFAULT_NAMESPACE, RedisSessionRegistry};
use ucenter_core::users::MemoryUserDirectory;

/// CLI arguments for the API server.
#[derive(Parser, Debug)]
#[command(name = "ucenter_server", about = "Ucenter API server")]
struct Args {
    /// Address to bind the HTTP listener.
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:8080")]
    bind_addr: String,

    /// Redis URL for the session revocation registry.
    #[arg(long, env = "REDIS_URL", default_value = "redis://127.0.0.1:6379")]
    redis_url: String,

    /// HS256 secret for access tokens.
    #[arg(long, env = "ACCESS_TOKEN_SECRET", hide_env_values = true)]
    access_token_secret: String,

    /// HS256 secret for refresh tokens. Must differ from the access secret.
    #[arg(long, env = "REFRESH_TOKEN_SECRET", hide_env_values = true)]
    refresh_token_secret: String,

    /// Access token lifetime in seconds.
    #[arg(long, env = "ACCESS_TOKEN_TTL_SECS", default_value_t = 30 * 60)]
    access_token_ttl_secs: u64,

    /// Refresh token lifetime in seconds; also how long a logout is remembered.
    #[arg(long, env = "REFRESH_TOKEN_TTL_SECS", default_value_t = 7 * 24 * 60 * 60)]
    refresh_token_ttl_secs: u64,

    /// Key prefix for revocation entries.
    #[arg(long, env = "REGISTRY_NAMESPACE", default_value = DEFAULT_NAMESPACE)]
    registry_namespace: String,

    /// Deadline for a single registry round-trip, in milliseconds.
    #[arg(long, env = "REGISTRY_TIMEOUT_MS", default_value_t = 500)]
    registry_timeout_ms: u64,
}

impl Args {
    fn into_config(self) -> ApiConfig {
        let mut config = ApiConfig::new(self.access_token_secret, self.refresh_token_secret);
        config.bind_addr = self.bind_addr;
        config.redis_url = self.redis_url;
        config.access_ttl = Duration::from_secs(self.access_token_ttl_secs);
        config.refresh_ttl = Duration::from_secs(self.refresh_token_ttl_secs);
        config.registry_namespace = self.registry_namespace;
        config.registry_timeout = Duration::from_millis(self.registry_timeout_ms);
        config
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,ucenter_api=debug,ucenter_core=debug".into()),
        )
        .init();

    let config = Args::parse().into_config();
    config.validate()?;

    info!(
        bind_addr = %config.bind_addr,
        access_ttl_secs = config.access_ttl.as_secs(),
        refresh_ttl_secs = config.refresh_ttl.as_secs(),
        "starting ucenter_server"
    );

    let registry =
        RedisSessionRegistry::connect(&config.redis_url, config.registry_namespace.clone())
            .await?;

    let users = Arc::new(MemoryUserDirectory::new());
    warn!("user directory is in-memory; accounts are lost on restart");

    let bind_addr = config.bind_addr.clone();
    let state = ucenter_api::AppState::new(config, Arc::new(registry), users);
    let app = ucenter_api::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %listener.local_addr()?, "REST API listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        let _ = tokio::signal::ctrl_c().await;
        info!("shutdown signal received");
    })
    .await?;

    Ok(())
}
