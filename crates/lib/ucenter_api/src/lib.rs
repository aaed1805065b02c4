//! # ucenter_api
//!
//! HTTP API library for Ucenter.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderName;
use axum::routing::{delete, get, post};
use tower_http::cors::{Any, CorsLayer};
use ucenter_core::auth::jwt::TokenIssuer;
use ucenter_core::auth::registry::SessionRegistry;
use ucenter_core::models::auth::Role;
use ucenter_core::users::UserDirectory;

use crate::config::ApiConfig;
use crate::handlers::user;
use crate::services::headers::{ACCESS_TOKEN_HEADER, REFRESH_TOKEN_HEADER};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// API configuration.
    pub config: Arc<ApiConfig>,
    /// Signs and verifies access/refresh tokens.
    pub issuer: Arc<TokenIssuer>,
    /// Revoked-session store consulted on every authenticated request.
    pub registry: Arc<dyn SessionRegistry>,
    /// Account store.
    pub users: Arc<dyn UserDirectory>,
}

impl AppState {
    /// Build state, deriving the token issuer from the configured secrets and lifetimes.
    pub fn new(
        config: ApiConfig,
        registry: Arc<dyn SessionRegistry>,
        users: Arc<dyn UserDirectory>,
    ) -> Self {
        let issuer = TokenIssuer::new(
            config.access_secret.as_bytes(),
            config.refresh_secret.as_bytes(),
        )
        .with_ttls(config.access_ttl, config.refresh_ttl);
        Self {
            config: Arc::new(config),
            issuer: Arc::new(issuer),
            registry,
            users,
        }
    }
}

/// Builds the Axum router with all routes and shared state.
///
/// Every route sits behind the authentication gate, which lets the configured
/// public paths through untouched. Admin routes additionally require
/// [`Role::ADMIN`].
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([
            HeaderName::from_static(ACCESS_TOKEN_HEADER),
            HeaderName::from_static(REFRESH_TOKEN_HEADER),
        ]);

    let users = Router::new()
        .route(routes::POST_USER_REGISTER, post(user::register_handler))
        .route(routes::POST_USER_LOGIN, post(user::login_handler))
        .route(routes::GET_USER_CURRENT, get(user::current_user_handler))
        .route(routes::POST_USER_LOGOUT, post(user::logout_handler));

    let admin = Router::new()
        .route(routes::GET_USER_SEARCH, get(user::search_handler))
        .route(routes::DELETE_USER_ID, delete(user::delete_user_handler))
        .route_layer(axum::middleware::from_fn_with_state(
            Role::ADMIN,
            middleware::role::require_role,
        ));

    Router::new()
        .merge(users)
        .merge(admin)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ))
        .layer(axum::middleware::from_fn(middleware::access_log::access_log))
        .layer(cors)
        .with_state(state)
}
