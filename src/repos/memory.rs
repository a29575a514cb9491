//! In-memory client and user stores.
//!
//! Used for local development (seeded from `CORS_ALLOWED_ORIGINS`) and in
//! tests. Nothing here is durable. Reads take a `tokio::sync::RwLock` read
//! guard and never hold it across an await on anything else.
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::repos::client_store::ClientStore;
use crate::repos::error::StoreResult;
use crate::repos::user_repo::UserStore;
use crate::services::claims::UserRecord;
use crate::services::cors::origin::{ClientOrigin, Origin, OriginError};

#[derive(Debug, Default)]
pub struct InMemoryClientStore {
    origins: RwLock<Vec<ClientOrigin>>,
}

impl InMemoryClientStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store with one client owning all of `origins`.
    pub fn with_client<S: AsRef<str>>(client_id: &str, origins: &[S]) -> Result<Self, OriginError> {
        let parsed = parse_all(client_id, origins)?;
        Ok(Self {
            origins: RwLock::new(parsed),
        })
    }

    /// Add a client's origins. Validation happens before anything is stored.
    /// Returns how many new origins were recorded.
    pub async fn register_client<S: AsRef<str>>(
        &self,
        client_id: &str,
        origins: &[S],
    ) -> Result<usize, OriginError> {
        let parsed = parse_all(client_id, origins)?;

        let mut guard = self.origins.write().await;
        let before = guard.len();
        for origin in parsed {
            if !guard.contains(&origin) {
                guard.push(origin);
            }
        }
        Ok(guard.len() - before)
    }

    /// Drop every origin owned by `client_id`. Returns how many were removed.
    pub async fn remove_client(&self, client_id: &str) -> usize {
        let mut guard = self.origins.write().await;
        let before = guard.len();
        guard.retain(|o| o.client_id != client_id);
        before - guard.len()
    }
}

fn parse_all<S: AsRef<str>>(
    client_id: &str,
    origins: &[S],
) -> Result<Vec<ClientOrigin>, OriginError> {
    origins
        .iter()
        .map(|raw| ClientOrigin::new(client_id, raw.as_ref()))
        .collect()
}

#[async_trait]
impl ClientStore for InMemoryClientStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn find_origins_by_client_id(&self, client_id: &str) -> StoreResult<Vec<ClientOrigin>> {
        let guard = self.origins.read().await;
        Ok(guard
            .iter()
            .filter(|o| o.client_id == client_id)
            .cloned()
            .collect())
    }

    async fn origin_exists(&self, origin: &Origin) -> StoreResult<bool> {
        let guard = self.origins.read().await;
        Ok(guard.iter().any(|o| &o.origin == origin))
    }
}

#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, user: UserRecord) {
        self.users.write().await.insert(user.id.clone(), user);
    }

    pub async fn remove(&self, user_id: &str) -> Option<UserRecord> {
        self.users.write().await.remove(user_id)
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn find_by_id(&self, user_id: &str) -> StoreResult<Option<UserRecord>> {
        Ok(self.users.read().await.get(user_id).cloned())
    }
}
