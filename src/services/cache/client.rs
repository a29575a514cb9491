//! Cache client interface used by cache-backed stores (client origins).
use async_trait::async_trait;
use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache-layer errors (transport/command).
///
/// Kept independent from `AppError` so callers pick the failure policy
/// (the origin registry turns any of these into a deny).
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache connection error: {0}")]
    BackendConnection(String),
    #[error("cache command error: {0}")]
    BackendCommand(String),
}

/// A minimal set-oriented cache interface.
///
/// Client origins are kept as plain string sets, so membership and listing
/// are all a reader needs. Writes belong to whatever persists client
/// registrations.
///
/// Implementations must be cheap to clone (typically `Arc<...>` inside).
#[async_trait]
pub trait CacheClient: Clone + Send + Sync + 'static {
    // Returns the cache backend name (for logging).
    fn backend_name(&self) -> &'static str;

    // `SISMEMBER key member`
    async fn is_member(&self, key: &str, member: &str) -> CacheResult<bool>;

    // `SMEMBERS key`. A missing key is an empty set.
    async fn members(&self, key: &str) -> CacheResult<Vec<String>>;
}
