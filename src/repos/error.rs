/**
 * Responsibility
 * - What a store backend reports upward.
 * - Callers decide the policy: the origin registry denies, the profile API answers 500.
 */
use thiserror::Error;

use crate::services::cache::CacheError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("db error")]
    Db(#[from] sqlx::Error),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error("invalid stored value: {0}")]
    InvalidValue(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
