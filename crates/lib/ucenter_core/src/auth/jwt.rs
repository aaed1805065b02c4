//! JWT token issuance and verification.
//!
//! Access and refresh tokens are HS256-signed with two distinct secrets, so a
//! token minted under one key never verifies under the other. Both tokens of
//! a login share one session ID, which is the unit of revocation.

use std::time::Duration;

use chrono::Utc;
use http::HeaderMap;
use http::header::AUTHORIZATION;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::{AuthError, AuthRejection};
use crate::models::auth::{AccessClaims, RefreshClaims};

/// Access token lifetime: 30 minutes.
pub const DEFAULT_ACCESS_TOKEN_TTL: Duration = Duration::from_secs(30 * 60);

/// Refresh token lifetime: 7 days. Also the TTL of a revocation entry.
pub const DEFAULT_REFRESH_TOKEN_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

#[derive(Clone)]
struct SigningKey {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKey {
    fn from_secret(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

/// The token pair handed out by a successful login.
#[derive(Debug, Clone)]
pub struct LoginTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub session_id: String,
}

/// Creates and verifies signed access and refresh tokens.
///
/// Keys are read-only after construction; share one instance behind an `Arc`.
#[derive(Clone)]
pub struct TokenIssuer {
    access: SigningKey,
    refresh: SigningKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    /// Build an issuer with the default lifetimes (30 min access, 7 days refresh).
    pub fn new(access_secret: &[u8], refresh_secret: &[u8]) -> Self {
        Self {
            access: SigningKey::from_secret(access_secret),
            refresh: SigningKey::from_secret(refresh_secret),
            access_ttl: DEFAULT_ACCESS_TOKEN_TTL,
            refresh_ttl: DEFAULT_REFRESH_TOKEN_TTL,
        }
    }

    /// Override the token lifetimes.
    pub fn with_ttls(mut self, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        self.access_ttl = access_ttl;
        self.refresh_ttl = refresh_ttl;
        self
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    /// Sign an access token for `user_id` expiring `access_ttl` from now.
    pub fn issue_access_token(
        &self,
        user_id: i64,
        user_agent: &str,
        session_id: &str,
    ) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = AccessClaims {
            uid: user_id,
            ua: user_agent.to_string(),
            ssid: session_id.to_string(),
            exp: now + ttl_secs(self.access_ttl),
            iat: now,
        };
        self.sign_access_claims(&claims)
    }

    /// Sign a refresh token for `user_id` expiring `refresh_ttl` from now.
    pub fn issue_refresh_token(&self, user_id: i64, session_id: &str) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = RefreshClaims {
            uid: user_id,
            ssid: session_id.to_string(),
            exp: now + ttl_secs(self.refresh_ttl),
            iat: now,
        };
        self.sign_refresh_claims(&claims)
    }

    /// Open a new session: fresh session ID plus an access/refresh pair bound to it.
    pub fn issue_login_tokens(
        &self,
        user_id: i64,
        user_agent: &str,
    ) -> Result<LoginTokens, AuthError> {
        let session_id = new_session_id();
        let access_token = self.issue_access_token(user_id, user_agent, &session_id)?;
        let refresh_token = self.issue_refresh_token(user_id, &session_id)?;
        Ok(LoginTokens {
            access_token,
            refresh_token,
            session_id,
        })
    }

    /// Sign caller-supplied access claims as-is.
    pub fn sign_access_claims(&self, claims: &AccessClaims) -> Result<String, AuthError> {
        sign(claims, &self.access.encoding)
    }

    /// Sign caller-supplied refresh claims as-is.
    pub fn sign_refresh_claims(&self, claims: &RefreshClaims) -> Result<String, AuthError> {
        sign(claims, &self.refresh.encoding)
    }

    /// Verify an access token's signature, then its expiry.
    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaims, AuthRejection> {
        let claims: AccessClaims = verify_signature(token, &self.access.decoding)?;
        check_expiry(claims.exp)?;
        Ok(claims)
    }

    /// Verify a refresh token's signature, then its expiry.
    pub fn verify_refresh_token(&self, token: &str) -> Result<RefreshClaims, AuthRejection> {
        let claims: RefreshClaims = verify_signature(token, &self.refresh.decoding)?;
        check_expiry(claims.exp)?;
        Ok(claims)
    }
}

/// Generate an unguessable session ID (UUID v4, 122 random bits).
pub fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}

/// Read the token out of `Authorization: Bearer <token>`.
///
/// Returns `None` when the header is absent, not valid ASCII, not of the
/// two-part `scheme value` shape, or uses a scheme other than `Bearer`.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("Bearer") || token.is_empty() {
        return None;
    }
    Some(token)
}

fn ttl_secs(ttl: Duration) -> i64 {
    i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX)
}

fn sign<C: Serialize>(claims: &C, key: &EncodingKey) -> Result<String, AuthError> {
    encode(&Header::new(Algorithm::HS256), claims, key)
        .map_err(|e| AuthError::TokenError(format!("jwt encode: {e}")))
}

// Expiry is checked separately so an expired-but-authentic token is reported
// as `ExpiredToken` rather than folded into `InvalidToken`.
fn verify_signature<C: DeserializeOwned>(
    token: &str,
    key: &DecodingKey,
) -> Result<C, AuthRejection> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    decode::<C>(token, key, &validation)
        .map(|data| data.claims)
        .map_err(|_| AuthRejection::InvalidToken)
}

fn check_expiry(exp: i64) -> Result<(), AuthRejection> {
    if exp <= Utc::now().timestamp() {
        return Err(AuthRejection::ExpiredToken);
    }
    Ok(())
}
