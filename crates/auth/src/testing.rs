//! Mocks shared by the tests of this crate.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use forum_core::cache::{Cache, CacheError};
use forum_core::forum::{NewUser, User, UserId};
use forum_core::storage::{Result, UserDirectory};

use crate::config::AuthConfig;
use crate::service::AuthService;
use crate::token::TokenIssuer;

pub const TEST_SECRET: &str = "an-unguessable-test-secret-of-32-bytes";

#[derive(Default)]
pub struct MockUsers {
    users: RwLock<Vec<User>>,
    pub lookups: AtomicUsize,
}

impl MockUsers {
    pub fn by_username(&self, username: &str) -> Option<User> {
        self.users
            .read()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned()
    }

    pub fn remove(&self, username: &str) {
        self.users.write().unwrap().retain(|u| u.username != username);
    }
}

#[async_trait]
impl UserDirectory for MockUsers {
    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.users.read().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.by_username(username))
    }

    async fn username_exists(&self, username: &str) -> Result<bool> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.by_username(username).is_some())
    }

    async fn email_exists(&self, email: &str) -> Result<bool> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.users.read().unwrap().iter().any(|u| u.email == email))
    }

    async fn create_user(&self, user: &NewUser) -> Result<User> {
        let mut users = self.users.write().unwrap();
        let user = user.clone().into_user(users.len() as UserId + 1);
        users.push(user.clone());
        Ok(user)
    }

    async fn record_login(&self, id: UserId, at: DateTime<Utc>) -> Result<()> {
        if let Some(user) = self.users.write().unwrap().iter_mut().find(|u| u.id == id) {
            user.last_login_at = Some(at);
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MockCache {
    store: RwLock<HashMap<String, Vec<u8>>>,
    unavailable: bool,
    pub get_count: AtomicUsize,
    pub set_count: AtomicUsize,
}

impl MockCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache whose every operation fails as if Redis were down.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.store.read().unwrap().contains_key(key)
    }

    pub fn insert(&self, key: &str, value: &[u8]) {
        self.store
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_vec());
    }

    fn check(&self) -> std::result::Result<(), CacheError> {
        if self.unavailable {
            return Err(CacheError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Cache for MockCache {
    async fn get(&self, key: &str) -> forum_core::cache::Result<Option<Vec<u8>>> {
        self.get_count.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.store.read().unwrap().get(key).cloned())
    }

    async fn set(
        &self,
        key: &str,
        value: &[u8],
        _ttl: Option<Duration>,
    ) -> forum_core::cache::Result<()> {
        self.set_count.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.insert(key, value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> forum_core::cache::Result<()> {
        self.check()?;
        self.store.write().unwrap().remove(key);
        Ok(())
    }

    async fn delete_pattern(&self, pattern: &str) -> forum_core::cache::Result<()> {
        self.check()?;
        self.store
            .write()
            .unwrap()
            .retain(|key, _| !forum_core::cache::pattern_matches(pattern, key));
        Ok(())
    }
}

pub fn test_issuer() -> TokenIssuer {
    TokenIssuer::new(&AuthConfig::new(TEST_SECRET, Duration::from_secs(3600)).unwrap())
}

pub fn service_with(cache: MockCache) -> (AuthService, Arc<MockUsers>, Arc<MockCache>) {
    let users = Arc::new(MockUsers::default());
    let cache = Arc::new(cache);
    let service = AuthService::new(
        users.clone(),
        cache.clone(),
        test_issuer(),
        Duration::from_secs(86400),
    );
    (service, users, cache)
}
