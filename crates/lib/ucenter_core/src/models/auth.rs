//! Authentication domain models.
//!
//! Token claim layouts and the request-scoped `Identity` resolved from them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user's role. Not carried in tokens; resolved from the user directory.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(pub i16);

impl Role {
    /// Regular account.
    pub const USER: Role = Role(0);
    /// Administrator; may search and delete users.
    pub const ADMIN: Role = Role(1);

    pub fn is_admin(self) -> bool {
        self == Self::ADMIN
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// JWT claims embedded in access tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// User ID.
    pub uid: i64,
    /// `User-Agent` of the client that logged in.
    pub ua: String,
    /// Session ID shared with the paired refresh token.
    pub ssid: String,
    /// Expiry (unix timestamp).
    pub exp: i64,
    /// Issued at (unix timestamp).
    pub iat: i64,
}

/// JWT claims embedded in refresh tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub uid: i64,
    pub ssid: String,
    pub exp: i64,
    pub iat: i64,
}

/// A resolved, trusted caller for the lifetime of one request.
///
/// Built by the authentication middleware after every check has passed and
/// placed in the request extensions. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
    pub session_id: String,
    pub user_agent: String,
    pub role: Role,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Identity {
    /// Combine verified access claims with the role looked up for `claims.uid`.
    pub fn from_claims(claims: AccessClaims, role: Role) -> Self {
        Self {
            user_id: claims.uid,
            session_id: claims.ssid,
            user_agent: claims.ua,
            role,
            issued_at: DateTime::from_timestamp(claims.iat, 0).unwrap_or_default(),
            expires_at: DateTime::from_timestamp(claims.exp, 0).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_carries_claim_fields() {
        let claims = AccessClaims {
            uid: 42,
            ua: "curl/8.0".into(),
            ssid: "abc123".into(),
            exp: 1_700_001_800,
            iat: 1_700_000_000,
        };
        let id = Identity::from_claims(claims, Role::ADMIN);
        assert_eq!(id.user_id, 42);
        assert_eq!(id.session_id, "abc123");
        assert_eq!(id.user_agent, "curl/8.0");
        assert!(id.role.is_admin());
        assert_eq!(id.issued_at.timestamp(), 1_700_000_000);
        assert_eq!(id.expires_at.timestamp(), 1_700_001_800);
    }

    #[test]
    fn role_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&Role::ADMIN).unwrap(), "1");
        let r: Role = serde_json::from_str("0").unwrap();
        assert_eq!(r, Role::USER);
    }
}
