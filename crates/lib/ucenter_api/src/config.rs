//! API server configuration.

use std::collections::HashSet;
use std::time::Duration;

use thiserror::Error;
use ucenter_core::auth::jwt::{DEFAULT_ACCESS_TOKEN_TTL, DEFAULT_REFRESH_TOKEN_TTL};
use ucenter_core::auth::registry::DEFAULT_NAMESPACE;

/// Paths reachable without a bearer token.
pub const PUBLIC_PATHS: [&str; 2] = ["/api/user/login", "/api/user/register"];

/// Default upper bound on a single registry round-trip.
pub const DEFAULT_REGISTRY_TIMEOUT: Duration = Duration::from_millis(500);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must not be empty")]
    EmptySecret(&'static str),

    #[error("access and refresh token secrets must differ")]
    SharedSecret,

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
}

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:8080").
    pub bind_addr: String,
    /// Redis connection URL for the session registry.
    pub redis_url: String,
    /// HS256 secret for access tokens.
    pub access_secret: String,
    /// HS256 secret for refresh tokens. Must differ from `access_secret`.
    pub refresh_secret: String,
    pub access_ttl: Duration,
    /// Refresh token lifetime; also the TTL of revocation entries.
    pub refresh_ttl: Duration,
    /// Key prefix for revocation entries.
    pub registry_namespace: String,
    /// Deadline applied to every registry and directory call on the request path.
    pub registry_timeout: Duration,
    /// Exact-match paths that bypass authentication.
    pub public_paths: HashSet<String>,
}

impl ApiConfig {
    /// Configuration with the given secrets and defaults for everything else.
    ///
    /// | Field                | Default                    |
    /// |----------------------|----------------------------|
    /// | `bind_addr`          | `127.0.0.1:8080`           |
    /// | `redis_url`          | `redis://127.0.0.1:6379`   |
    /// | `access_ttl`         | 30 minutes                 |
    /// | `refresh_ttl`        | 7 days                     |
    /// | `registry_namespace` | `ucenter:users`            |
    /// | `registry_timeout`   | 500 ms                     |
    /// | `public_paths`       | login, register            |
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".into(),
            redis_url: "redis://127.0.0.1:6379".into(),
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            access_ttl: DEFAULT_ACCESS_TOKEN_TTL,
            refresh_ttl: DEFAULT_REFRESH_TOKEN_TTL,
            registry_namespace: DEFAULT_NAMESPACE.into(),
            registry_timeout: DEFAULT_REGISTRY_TIMEOUT,
            public_paths: PUBLIC_PATHS.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Refuse configurations that would weaken token separation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.access_secret.is_empty() {
            return Err(ConfigError::EmptySecret("access token secret"));
        }
        if self.refresh_secret.is_empty() {
            return Err(ConfigError::EmptySecret("refresh token secret"));
        }
        if self.access_secret == self.refresh_secret {
            return Err(ConfigError::SharedSecret);
        }
        if self.access_ttl.is_zero() {
            return Err(ConfigError::ZeroDuration("access token ttl"));
        }
        if self.refresh_ttl.is_zero() {
            return Err(ConfigError::ZeroDuration("refresh token ttl"));
        }
        if self.registry_timeout.is_zero() {
            return Err(ConfigError::ZeroDuration("registry timeout"));
        }
        Ok(())
    }

    pub fn is_public(&self, path: &str) -> bool {
        self.public_paths.contains(path)
    }
}
