//! Authentication and authorization logic.
//!
//! Provides token issuance and verification, the session revocation registry,
//! and password hashing, shared by the HTTP layer and the server binary.

pub mod jwt;
pub mod password;
pub mod registry;

use thiserror::Error;

/// Authentication errors raised while issuing credentials.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Token error: {0}")]
    TokenError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Why a request was refused by the authentication or authorization gates.
///
/// Every variant is resolved at the middleware boundary; handlers only ever
/// observe an authenticated request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthRejection {
    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    ExpiredToken,

    #[error("Session has been logged out")]
    RevokedSession,

    #[error("Insufficient permissions")]
    Forbidden,

    #[error("Session store unavailable")]
    StoreUnavailable,
}

impl AuthRejection {
    /// Stable snake_case category used in response bodies and logs.
    pub fn category(&self) -> &'static str {
        match self {
            Self::MissingToken => "missing_token",
            Self::InvalidToken => "invalid_token",
            Self::ExpiredToken => "expired_token",
            Self::RevokedSession => "revoked_session",
            Self::Forbidden => "forbidden",
            Self::StoreUnavailable => "store_unavailable",
        }
    }
}
