use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::repos::ClientStore;
use crate::services::cors::origin::Origin;

pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_millis(300);

/// Live view of the origins owned by registered clients.
///
/// Every call goes to the client store, so a registration (or removal) is
/// visible on the next request without a restart. Any failure on the way
/// (malformed header, backend error, timeout) answers `false`: an unknown
/// origin is never allowed.
#[derive(Clone)]
pub struct OriginRegistry {
    store: Arc<dyn ClientStore>,
    timeout: Duration,
}

impl std::fmt::Debug for OriginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OriginRegistry")
            .field("backend", &self.store.backend_name())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OriginRegistry {
    pub fn new(store: Arc<dyn ClientStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    pub async fn is_registered(&self, origin: &str) -> bool {
        match Origin::parse(origin) {
            Ok(origin) => self.contains(&origin).await,
            Err(err) => {
                debug!(origin, error = %err, "malformed origin header");
                false
            }
        }
    }

    pub async fn contains(&self, origin: &Origin) -> bool {
        let backend = self.store.backend_name();

        match tokio::time::timeout(self.timeout, self.store.origin_exists(origin)).await {
            Ok(Ok(found)) => found,
            Ok(Err(err)) => {
                warn!(%origin, backend, error = %err, "origin lookup failed; denying");
                false
            }
            Err(_) => {
                warn!(
                    %origin,
                    backend,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "origin lookup timed out; denying"
                );
                false
            }
        }
    }
}
