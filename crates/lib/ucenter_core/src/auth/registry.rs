//! Session revocation registry.
//!
//! A shared, TTL-capable store recording logged-out session IDs. Only the
//! existence of an entry is consulted: present means revoked. Entries expire
//! once the paired refresh token could no longer be valid anyway.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use thiserror::Error;
use tracing::{debug, info};

/// Key prefix used when none is configured.
pub const DEFAULT_NAMESPACE: &str = "ucenter:users";

/// Registry I/O errors. Callers on the request path must fail closed.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Registry backend error: {0}")]
    Backend(String),

    #[error("Registry call exceeded deadline of {0:?}")]
    Timeout(Duration),
}

impl From<redis::RedisError> for RegistryError {
    fn from(e: redis::RedisError) -> Self {
        RegistryError::Backend(e.to_string())
    }
}

/// Revocation store consulted on every authenticated request.
#[async_trait]
pub trait SessionRegistry: Send + Sync {
    /// Whether `session_id` has been logged out.
    async fn is_revoked(&self, session_id: &str) -> Result<bool, RegistryError>;

    /// Record `session_id` as logged out for `ttl`. Overwrites any prior entry;
    /// revoking an unknown or already-revoked session is not an error.
    async fn revoke(&self, session_id: &str, ttl: Duration) -> Result<(), RegistryError>;
}

/// Build the registry key for a session: `<namespace>:ssid:<session_id>`.
pub fn session_key(namespace: &str, session_id: &str) -> String {
    format!("{namespace}:ssid:{session_id}")
}

/// `EX` seconds for a revocation entry. Redis rejects `EX 0`, and sub-second
/// TTLs would otherwise truncate to it.
pub fn ex_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

/// Run a registry call under a deadline so a slow store cannot hang the request.
pub async fn within<T, F>(deadline: Duration, call: F) -> Result<T, RegistryError>
where
    F: Future<Output = Result<T, RegistryError>>,
{
    tokio::time::timeout(deadline, call)
        .await
        .map_err(|_| RegistryError::Timeout(deadline))?
}

// =============================================================================
// Redis
// =============================================================================

/// Redis-backed registry. `EXISTS` for lookups, `SET .. EX` for revocation.
#[derive(Clone)]
pub struct RedisSessionRegistry {
    conn: ConnectionManager,
    namespace: String,
}

impl RedisSessionRegistry {
    /// Wrap an existing connection manager.
    pub fn new(conn: ConnectionManager, namespace: impl Into<String>) -> Self {
        Self {
            conn,
            namespace: namespace.into(),
        }
    }

    /// Open a managed (auto-reconnecting) connection to `url`.
    pub async fn connect(url: &str, namespace: impl Into<String>) -> Result<Self, RegistryError> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        let namespace = namespace.into();
        info!(namespace = %namespace, "connected session registry to redis");
        Ok(Self::new(conn, namespace))
    }
}

#[async_trait]
impl SessionRegistry for RedisSessionRegistry {
    async fn is_revoked(&self, session_id: &str) -> Result<bool, RegistryError> {
        let mut conn = self.conn.clone();
        let exists: bool = conn.exists(session_key(&self.namespace, session_id)).await?;
        Ok(exists)
    }

    async fn revoke(&self, session_id: &str, ttl: Duration) -> Result<(), RegistryError> {
        let mut conn = self.conn.clone();
        let secs = ex_secs(ttl);
        let _: () = conn
            .set_ex(session_key(&self.namespace, session_id), "", secs)
            .await?;
        debug!(session_id, ttl_secs = secs, "session revoked");
        Ok(())
    }
}

// =============================================================================
// In-memory
// =============================================================================

/// In-process registry with per-entry expiry, for tests and single-node use.
#[derive(Debug)]
pub struct MemorySessionRegistry {
    entries: DashMap<String, Instant>,
    namespace: String,
}

impl MemorySessionRegistry {
    pub fn new() -> Self {
        Self::with_namespace(DEFAULT_NAMESPACE)
    }

    pub fn with_namespace(namespace: impl Into<String>) -> Self {
        Self {
            entries: DashMap::new(),
            namespace: namespace.into(),
        }
    }

    /// Number of entries held, expired or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the raw key exists and is unexpired.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries
            .get(key)
            .is_some_and(|expires_at| Instant::now() < *expires_at)
    }

    /// Evict expired entries.
    pub fn cleanup(&self) {
        let now = Instant::now();
        self.entries.retain(|_, expires_at| now < *expires_at);
    }

    /// Spawn a periodic cleanup task.
    pub fn spawn_cleanup_task(self: &Arc<Self>, every: Duration) -> tokio::task::JoinHandle<()> {
        let registry = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                registry.cleanup();
            }
        })
    }
}

impl Default for MemorySessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionRegistry for MemorySessionRegistry {
    async fn is_revoked(&self, session_id: &str) -> Result<bool, RegistryError> {
        let key = session_key(&self.namespace, session_id);
        if self.contains_key(&key) {
            return Ok(true);
        }
        let now = Instant::now();
        self.entries.remove_if(&key, |_, expires_at| now >= *expires_at);
        Ok(false)
    }

    async fn revoke(&self, session_id: &str, ttl: Duration) -> Result<(), RegistryError> {
        let now = Instant::now();
        let expires_at = now
            .checked_add(ttl)
            .ok_or_else(|| RegistryError::Backend(format!("ttl out of range: {ttl:?}")))?;
        self.entries
            .insert(session_key(&self.namespace, session_id), expires_at);
        debug!(session_id, ttl_secs = ttl.as_secs(), "session revoked");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WEEK: Duration = Duration::from_secs(7 * 24 * 60 * 60);

    /// Registry that never answers within any reasonable deadline.
    struct StalledRegistry;

    #[async_trait]
    impl SessionRegistry for StalledRegistry {
        async fn is_revoked(&self, _session_id: &str) -> Result<bool, RegistryError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(false)
        }

        async fn revoke(&self, _session_id: &str, _ttl: Duration) -> Result<(), RegistryError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        }
    }

    #[test]
    fn key_is_namespaced_per_session() {
        assert_eq!(
            session_key("ucenter:users", "abc123"),
            "ucenter:users:ssid:abc123"
        );
    }

    #[test]
    fn ex_secs_never_drops_below_one() {
        assert_eq!(ex_secs(Duration::ZERO), 1);
        assert_eq!(ex_secs(Duration::from_millis(999)), 1);
        assert_eq!(ex_secs(Duration::from_millis(1500)), 1);
        assert_eq!(ex_secs(WEEK), 604_800);
    }

    #[tokio::test]
    async fn unknown_session_is_not_revoked() {
        let registry = MemorySessionRegistry::new();
        assert!(!registry.is_revoked("never-issued").await.unwrap());
    }

    #[tokio::test]
    async fn revoke_is_visible_to_later_lookups() {
        let registry = MemorySessionRegistry::new();
        registry.revoke("abc123", WEEK).await.unwrap();
        assert!(registry.is_revoked("abc123").await.unwrap());
        assert!(registry.contains_key("ucenter:users:ssid:abc123"));
    }

    #[tokio::test]
    async fn revoke_is_idempotent() {
        let registry = MemorySessionRegistry::new();
        registry.revoke("abc123", WEEK).await.unwrap();
        registry.revoke("abc123", WEEK).await.unwrap();
        assert!(registry.is_revoked("abc123").await.unwrap());
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn revocation_is_scoped_to_one_session() {
        let registry = MemorySessionRegistry::new();
        registry.revoke("phone-session", WEEK).await.unwrap();
        assert!(registry.is_revoked("phone-session").await.unwrap());
        assert!(!registry.is_revoked("laptop-session").await.unwrap());
    }

    #[tokio::test]
    async fn entries_expire_after_ttl() {
        let registry = MemorySessionRegistry::new();
        registry
            .revoke("short", Duration::from_millis(20))
            .await
            .unwrap();
        assert!(registry.is_revoked("short").await.unwrap());
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(!registry.is_revoked("short").await.unwrap());
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn cleanup_evicts_only_expired_entries() {
        let registry = MemorySessionRegistry::new();
        registry.revoke("short", Duration::from_millis(10)).await.unwrap();
        registry.revoke("long", WEEK).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        registry.cleanup();
        assert_eq!(registry.len(), 1);
        assert!(registry.is_revoked("long").await.unwrap());
    }

    #[tokio::test]
    async fn cleanup_task_evicts_expired_entries() {
        let registry = Arc::new(MemorySessionRegistry::new());
        registry.revoke("short", Duration::from_millis(10)).await.unwrap();
        registry.revoke("long", WEEK).await.unwrap();

        let task = registry.spawn_cleanup_task(Duration::from_millis(15));
        tokio::time::sleep(Duration::from_millis(60)).await;
        task.abort();

        assert_eq!(registry.len(), 1);
        assert!(!registry.contains_key("ucenter:users:ssid:short"));
        assert!(registry.contains_key("ucenter:users:ssid:long"));
    }

    #[tokio::test]
    async fn deadline_turns_stall_into_timeout() {
        let registry = StalledRegistry;
        let deadline = Duration::from_millis(20);
        let lookup = within(deadline, registry.is_revoked("abc")).await;
        assert!(matches!(lookup, Err(RegistryError::Timeout(d)) if d == deadline));
        let write = within(deadline, registry.revoke("abc", WEEK)).await;
        assert!(matches!(write, Err(RegistryError::Timeout(_))));
    }

    #[tokio::test]
    async fn deadline_passes_through_fast_results() {
        let registry = MemorySessionRegistry::new();
        registry.revoke("abc", WEEK).await.unwrap();
        let revoked = within(Duration::from_secs(1), registry.is_revoked("abc"))
            .await
            .unwrap();
        assert!(revoked);
    }
}
