//! User directory: the account store consulted at login and for role lookups.
//!
//! Persistence is pluggable through [`UserDirectory`]; [`MemoryUserDirectory`]
//! keeps accounts in process.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

use crate::models::auth::Role;
use crate::models::user::{NewUser, User, UserWithPassword};

/// User directory errors.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("Account already exists")]
    DuplicateAccount,

    #[error("Planet code already exists")]
    DuplicatePlanetCode,

    #[error("Directory unavailable: {0}")]
    Unavailable(String),
}

/// A page of search results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPage {
    pub records: Vec<User>,
    pub total: u64,
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Create a user and return its ID. The first user ever created is an admin.
    async fn create(&self, new_user: NewUser) -> Result<i64, UserError>;

    async fn find_by_account(&self, account: &str) -> Result<Option<UserWithPassword>, UserError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, UserError>;

    /// Users whose username contains `username`, ordered by ID.
    /// `page` is 1-based.
    async fn search(&self, username: &str, page: u32, size: u32) -> Result<UserPage, UserError>;

    /// Delete a user. Returns `false` if no such user existed.
    async fn delete(&self, id: i64) -> Result<bool, UserError>;
}

#[derive(Debug, Default)]
struct Accounts {
    next_id: i64,
    by_id: BTreeMap<i64, UserWithPassword>,
}

/// In-memory user directory.
#[derive(Debug, Default)]
pub struct MemoryUserDirectory {
    inner: RwLock<Accounts>,
}

impl MemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a user's role or status directly, bypassing registration.
    ///
    /// Administrative seeding hook for this in-process store (promoting an
    /// operator, freezing an account). Returns `false` when no such user exists.
    pub async fn update(&self, id: i64, role: Role, status: i16) -> bool {
        let mut accounts = self.inner.write().await;
        match accounts.by_id.get_mut(&id) {
            Some(entry) => {
                entry.user.role = role;
                entry.user.status = status;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn create(&self, new_user: NewUser) -> Result<i64, UserError> {
        let mut accounts = self.inner.write().await;
        for existing in accounts.by_id.values() {
            if existing.user.account == new_user.account {
                return Err(UserError::DuplicateAccount);
            }
            if existing.user.planet_code == new_user.planet_code {
                return Err(UserError::DuplicatePlanetCode);
            }
        }

        let role = if accounts.by_id.is_empty() {
            info!(account = %new_user.account, "first user granted admin role");
            Role::ADMIN
        } else {
            Role::USER
        };

        accounts.next_id += 1;
        let id = accounts.next_id;
        let user = User {
            id,
            username: new_user.username,
            account: new_user.account,
            avatar_url: new_user.avatar_url,
            gender: 0,
            phone: String::new(),
            email: String::new(),
            status: 0,
            role,
            planet_code: new_user.planet_code,
            created_at: Utc::now(),
        };
        accounts.by_id.insert(
            id,
            UserWithPassword {
                user,
                password_hash: new_user.password_hash,
            },
        );
        Ok(id)
    }

    async fn find_by_account(&self, account: &str) -> Result<Option<UserWithPassword>, UserError> {
        let accounts = self.inner.read().await;
        Ok(accounts
            .by_id
            .values()
            .find(|u| u.user.account == account)
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, UserError> {
        let accounts = self.inner.read().await;
        Ok(accounts.by_id.get(&id).map(|u| u.user.clone()))
    }

    async fn search(&self, username: &str, page: u32, size: u32) -> Result<UserPage, UserError> {
        let accounts = self.inner.read().await;
        let matching: Vec<&User> = accounts
            .by_id
            .values()
            .map(|u| &u.user)
            .filter(|u| u.username.contains(username))
            .collect();
        let offset = page.saturating_sub(1) as usize * size as usize;
        let records = matching
            .iter()
            .skip(offset)
            .take(size as usize)
            .map(|u| (*u).clone())
            .collect();
        Ok(UserPage {
            records,
            total: matching.len() as u64,
        })
    }

    async fn delete(&self, id: i64) -> Result<bool, UserError> {
        let mut accounts = self.inner.write().await;
        Ok(accounts.by_id.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(account: &str, planet: &str) -> NewUser {
        NewUser {
            username: account.to_uppercase(),
            account: account.to_string(),
            password_hash: "hash".to_string(),
            planet_code: planet.to_string(),
            avatar_url: String::new(),
        }
    }

    #[tokio::test]
    async fn first_user_is_admin_rest_are_users() {
        let dir = MemoryUserDirectory::new();
        let first = dir.create(new_user("alice", "1")).await.unwrap();
        let second = dir.create(new_user("bobby", "2")).await.unwrap();
        assert_eq!(dir.find_by_id(first).await.unwrap().unwrap().role, Role::ADMIN);
        assert_eq!(dir.find_by_id(second).await.unwrap().unwrap().role, Role::USER);
    }

    #[tokio::test]
    async fn duplicates_are_rejected() {
        let dir = MemoryUserDirectory::new();
        dir.create(new_user("alice", "1")).await.unwrap();
        assert!(matches!(
            dir.create(new_user("alice", "2")).await,
            Err(UserError::DuplicateAccount)
        ));
        assert!(matches!(
            dir.create(new_user("carol", "1")).await,
            Err(UserError::DuplicatePlanetCode)
        ));
    }

    #[tokio::test]
    async fn find_by_account_returns_hash() {
        let dir = MemoryUserDirectory::new();
        let id = dir.create(new_user("alice", "1")).await.unwrap();
        let found = dir.find_by_account("alice").await.unwrap().unwrap();
        assert_eq!(found.user.id, id);
        assert_eq!(found.password_hash, "hash");
        assert!(dir.find_by_account("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn search_filters_and_pages() {
        let dir = MemoryUserDirectory::new();
        for (i, name) in ["anna", "annie", "bob", "hannah"].iter().enumerate() {
            dir.create(new_user(name, &i.to_string())).await.unwrap();
        }
        let page = dir.search("ANN", 1, 2).await.unwrap();
        assert_eq!(page.total, 3);
        let names: Vec<_> = page.records.iter().map(|u| u.account.as_str()).collect();
        assert_eq!(names, ["anna", "annie"]);

        let page2 = dir.search("ANN", 2, 2).await.unwrap();
        assert_eq!(page2.records.len(), 1);
        assert_eq!(page2.records[0].account, "hannah");

        assert_eq!(dir.search("", 1, 10).await.unwrap().total, 4);
    }

    #[tokio::test]
    async fn delete_reports_presence() {
        let dir = MemoryUserDirectory::new();
        let id = dir.create(new_user("alice", "1")).await.unwrap();
        assert!(dir.delete(id).await.unwrap());
        assert!(!dir.delete(id).await.unwrap());
        assert!(dir.find_by_id(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_changes_role_and_status() {
        let dir = MemoryUserDirectory::new();
        let id = dir.create(new_user("alice", "1")).await.unwrap();
        assert!(dir.update(id, Role::USER, 1).await);
        let user = dir.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(user.role, Role::USER);
        assert!(user.is_frozen());
        assert!(!dir.update(99, Role::USER, 0).await);
    }
}
