/*
 * Responsibility
 * - Read-only view over the identity store (users + roles).
 * - SQLx implementation over `users` / `user_roles`.
 * - Role order is the store's `position` order and is passed through untouched.
 */
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use crate::repos::error::StoreResult;
use crate::services::claims::UserRecord;

#[async_trait]
pub trait UserStore: Send + Sync {
    fn backend_name(&self) -> &'static str;

    async fn find_by_id(&self, user_id: &str) -> StoreResult<Option<UserRecord>>;
}

// `(user_id, position)` is unique in the schema; `role` breaks ties for
// stores created without that constraint.
const ROLES_BY_USER_SQL: &str = r#"
    SELECT role
    FROM user_roles
    WHERE user_id = $1
    ORDER BY position, role
"#;

#[derive(Debug, FromRow)]
struct UserRow {
    id: String,
    user_name: String,
    is_active: bool,
}

#[derive(Clone, Debug)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn find_by_id(&self, user_id: &str) -> StoreResult<Option<UserRecord>> {
        let Some(row) = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, user_name, is_active
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let roles = sqlx::query_scalar::<_, String>(ROLES_BY_USER_SQL)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(UserRecord {
            id: row.id,
            user_name: row.user_name,
            roles,
            is_active: row.is_active,
        }))
    }
}
