use std::sync::Arc;

use tracing::debug;

use crate::repos::{StoreResult, UserStore};
use crate::services::claims::mapper::{ClaimSet, ClaimsMapper};

/// Claims and activity of one subject, read in a single store lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub claims: ClaimSet,
    pub active: bool,
}

/// Resolves profile claims and activity for a subject.
///
/// - Users come from the identity store; nothing is written back.
/// - The subject claim is always returned, even when not requested, so the
///   caller can correlate the result.
#[derive(Clone)]
pub struct ProfileService {
    users: Arc<dyn UserStore>,
    mapper: ClaimsMapper,
}

impl std::fmt::Debug for ProfileService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileService")
            .field("backend", &self.users.backend_name())
            .field("mapper", &self.mapper)
            .finish()
    }
}

impl ProfileService {
    pub fn new(users: Arc<dyn UserStore>, mapper: ClaimsMapper) -> Self {
        Self { users, mapper }
    }

    /// `Ok(None)` when the subject is unknown.
    pub async fn profile(
        &self,
        subject_id: &str,
        requested_types: Option<&[String]>,
    ) -> StoreResult<Option<Profile>> {
        let Some(user) = self.users.find_by_id(subject_id).await? else {
            debug!(subject_id, "profile requested for unknown subject");
            return Ok(None);
        };

        let mut claims = self.mapper.map(&user);
        if let Some(requested) = requested_types {
            let subject = self.mapper.claim_types().subject.as_str();
            claims.retain_types(|t| t == subject || requested.iter().any(|r| r == t));
        }

        Ok(Some(Profile {
            claims,
            active: user.is_active,
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::repos::InMemoryUserStore;
    use crate::services::claims::mapper::{ClaimTypeMap, UserRecord};

    struct CountingStore {
        inner: InMemoryUserStore,
        lookups: AtomicUsize,
    }

    #[async_trait]
    impl UserStore for CountingStore {
        fn backend_name(&self) -> &'static str {
            "counting"
        }

        async fn find_by_id(&self, user_id: &str) -> StoreResult<Option<UserRecord>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.inner.find_by_id(user_id).await
        }
    }

    async fn service() -> ProfileService {
        let users = InMemoryUserStore::new();
        users
            .insert(UserRecord {
                id: "u1".into(),
                user_name: "alice".into(),
                roles: vec!["admin".into(), "editor".into()],
                is_active: true,
            })
            .await;
        users
            .insert(UserRecord {
                id: "u2".into(),
                user_name: "bob".into(),
                roles: vec![],
                is_active: false,
            })
            .await;

        ProfileService::new(Arc::new(users), ClaimsMapper::new(ClaimTypeMap::default()))
    }

    #[tokio::test]
    async fn returns_all_claims_when_nothing_is_requested() {
        let profile = service().await.profile("u1", None).await.unwrap().unwrap();
        assert_eq!(profile.claims.len(), 4);
        assert!(profile.active);
    }

    #[tokio::test]
    async fn filters_to_requested_types_but_keeps_subject() {
        let requested = vec!["role".to_string()];
        let profile = service()
            .await
            .profile("u1", Some(&requested))
            .await
            .unwrap()
            .unwrap();

        let types: Vec<_> = profile.claims.iter().map(|c| c.claim_type.as_str()).collect();
        assert_eq!(types, ["sub", "role", "role"]);
    }

    #[tokio::test]
    async fn unknown_subject_has_no_profile() {
        assert!(service().await.profile("nope", None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn profile_reads_claims_and_activity_in_one_lookup() {
        let inner = InMemoryUserStore::new();
        inner
            .insert(UserRecord {
                id: "u2".into(),
                user_name: "bob".into(),
                roles: vec!["viewer".into()],
                is_active: false,
            })
            .await;
        let store = Arc::new(CountingStore {
            inner,
            lookups: AtomicUsize::new(0),
        });
        let service = ProfileService::new(store.clone(), ClaimsMapper::default());

        let profile = service.profile("u2", None).await.unwrap().unwrap();
        assert!(!profile.active);
        assert_eq!(profile.claims.values_of("role").collect::<Vec<_>>(), ["viewer"]);
        assert_eq!(store.lookups.load(Ordering::SeqCst), 1);
    }
}
