use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::repos::client_store::{ClientStore, stored_origin_matches};
use crate::repos::error::StoreResult;
use crate::services::cache::{CacheClient, ValkeyClient};
use crate::services::cors::origin::{ClientOrigin, Origin};

/// Valkey-backed client store.
///
/// Layout (`prefix` defaults to `cors`):
/// - `{prefix}:origins`: set of every registered origin
/// - `{prefix}:client:{client_id}`: set of the origins owned by one client
#[derive(Clone)]
pub struct ValkeyClientStore<C: CacheClient> {
    cache: Arc<C>,
    prefix: String,
}

impl ValkeyClientStore<ValkeyClient> {
    pub async fn new(redis_url: &str) -> StoreResult<Self> {
        Self::new_with_prefix(redis_url, "cors").await
    }

    pub async fn new_with_prefix(redis_url: &str, prefix: impl Into<String>) -> StoreResult<Self> {
        let client = ValkeyClient::new(redis_url).await?;

        Ok(Self {
            cache: Arc::new(client),
            prefix: prefix.into(),
        })
    }
}

impl<C: CacheClient> ValkeyClientStore<C> {
    pub fn new_with_cache(cache: Arc<C>, prefix: impl Into<String>) -> Self {
        Self {
            cache,
            prefix: prefix.into(),
        }
    }

    pub fn origins_key(&self) -> String {
        format!("{}:origins", self.prefix)
    }

    pub fn client_key(&self, client_id: &str) -> String {
        format!("{}:client:{}", self.prefix, client_id)
    }
}

#[async_trait]
impl<C: CacheClient> ClientStore for ValkeyClientStore<C> {
    fn backend_name(&self) -> &'static str {
        self.cache.backend_name()
    }

    async fn find_origins_by_client_id(&self, client_id: &str) -> StoreResult<Vec<ClientOrigin>> {
        let mut members = self.cache.members(&self.client_key(client_id)).await?;
        // SMEMBERS has no order.
        members.sort();

        let origins = members
            .iter()
            .filter_map(|raw| match ClientOrigin::new(client_id, raw) {
                Ok(origin) => Some(origin),
                Err(err) => {
                    warn!(client_id, origin = %raw, error = %err, "skipping malformed stored origin");
                    None
                }
            })
            .collect();

        Ok(origins)
    }

    async fn origin_exists(&self, origin: &Origin) -> StoreResult<bool> {
        let key = self.origins_key();
        if self.cache.is_member(&key, origin.as_str()).await? {
            return Ok(true);
        }

        // Writers may have stored a non-canonical spelling (`https://App.example:443`).
        let members = self.cache.members(&key).await?;
        Ok(members
            .iter()
            .any(|raw| stored_origin_matches(raw, origin)))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeSet, HashMap};
    use std::sync::Mutex;

    use super::*;
    use crate::services::cache::client::{CacheError, CacheResult};

    #[derive(Clone, Default)]
    struct FakeCache {
        sets: Arc<Mutex<HashMap<String, BTreeSet<String>>>>,
        down: bool,
    }

    impl FakeCache {
        fn seed(&self, key: &str, members: &[&str]) {
            let mut sets = self.sets.lock().unwrap();
            let set = sets.entry(key.to_string()).or_default();
            set.extend(members.iter().map(|m| m.to_string()));
        }
    }

    #[async_trait]
    impl CacheClient for FakeCache {
        fn backend_name(&self) -> &'static str {
            "fake"
        }

        async fn is_member(&self, key: &str, member: &str) -> CacheResult<bool> {
            if self.down {
                return Err(CacheError::BackendConnection("refused".into()));
            }
            let sets = self.sets.lock().unwrap();
            Ok(sets.get(key).is_some_and(|s| s.contains(member)))
        }

        async fn members(&self, key: &str) -> CacheResult<Vec<String>> {
            if self.down {
                return Err(CacheError::BackendConnection("refused".into()));
            }
            let sets = self.sets.lock().unwrap();
            Ok(sets
                .get(key)
                .map(|s| s.iter().cloned().collect())
                .unwrap_or_default())
        }
    }

    #[tokio::test]
    async fn answers_membership_from_the_origin_set() {
        let cache = FakeCache::default();
        cache.seed("cors:origins", &["https://spa.example"]);
        let store = ValkeyClientStore::new_with_cache(Arc::new(cache), "cors");

        let yes = Origin::parse("https://SPA.example").unwrap();
        let no = Origin::parse("https://other.example").unwrap();
        assert!(store.origin_exists(&yes).await.unwrap());
        assert!(!store.origin_exists(&no).await.unwrap());
    }

    #[tokio::test]
    async fn membership_agrees_with_listing_for_non_canonical_values() {
        let cache = FakeCache::default();
        cache.seed("cors:client:spa", &["https://SPA.example:443"]);
        cache.seed("cors:origins", &["https://SPA.example:443"]);
        let store = ValkeyClientStore::new_with_cache(Arc::new(cache), "cors");

        let listed = store.find_origins_by_client_id("spa").await.unwrap();
        assert_eq!(listed[0].origin.as_str(), "https://spa.example");
        assert!(store.origin_exists(&listed[0].origin).await.unwrap());

        let other_port = Origin::parse("https://spa.example:8443").unwrap();
        assert!(!store.origin_exists(&other_port).await.unwrap());
    }

    #[tokio::test]
    async fn lists_client_origins_sorted_and_skips_garbage() {
        let cache = FakeCache::default();
        cache.seed(
            "cors:client:spa",
            &["https://b.example", "not-an-origin", "https://a.example"],
        );
        let store = ValkeyClientStore::new_with_cache(Arc::new(cache), "cors");

        let origins = store.find_origins_by_client_id("spa").await.unwrap();
        let values: Vec<_> = origins.iter().map(|o| o.origin.as_str()).collect();
        assert_eq!(values, ["https://a.example", "https://b.example"]);
        assert!(origins.iter().all(|o| o.client_id == "spa"));
    }

    #[tokio::test]
    async fn surfaces_backend_errors() {
        let cache = FakeCache {
            down: true,
            ..FakeCache::default()
        };
        let store = ValkeyClientStore::new_with_cache(Arc::new(cache), "cors");

        let origin = Origin::parse("https://spa.example").unwrap();
        assert!(store.origin_exists(&origin).await.is_err());
    }
}
