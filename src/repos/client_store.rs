/*
 * Responsibility
 * - The client-store capability the origin registry reads from.
 * - SQLx implementation over `client_cors_origins`.
 * - Registrations are written elsewhere; this side only reads.
 */
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tracing::warn;

use crate::repos::error::StoreResult;
use crate::services::cors::origin::{ClientOrigin, Origin};

#[async_trait]
pub trait ClientStore: Send + Sync {
    // Backend name, for logging.
    fn backend_name(&self) -> &'static str;

    async fn find_origins_by_client_id(&self, client_id: &str) -> StoreResult<Vec<ClientOrigin>>;

    // Whether any registered client owns `origin`. Stored values are compared
    // in canonical form, the same form `find_origins_by_client_id` returns.
    async fn origin_exists(&self, origin: &Origin) -> StoreResult<bool>;
}

/// Whether a raw stored value names `origin` once canonicalized.
/// Malformed values never match.
pub(crate) fn stored_origin_matches(raw: &str, origin: &Origin) -> bool {
    Origin::parse(raw).is_ok_and(|stored| &stored == origin)
}

// LIKE pattern for stored spellings carrying an explicit port, e.g.
// `https://app.example:443` for `https://app.example`.
fn explicit_port_pattern(origin: &Origin) -> String {
    let mut pattern = String::with_capacity(origin.as_str().len() + 2);
    for ch in origin.as_str().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push_str(":%");
    pattern
}

#[derive(Debug, FromRow)]
struct ClientOriginRow {
    client_id: String,
    origin: String,
}

#[derive(Clone, Debug)]
pub struct PgClientStore {
    pool: PgPool,
}

impl PgClientStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClientStore for PgClientStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn find_origins_by_client_id(&self, client_id: &str) -> StoreResult<Vec<ClientOrigin>> {
        let rows = sqlx::query_as::<_, ClientOriginRow>(
            r#"
            SELECT client_id, origin
            FROM client_cors_origins
            WHERE client_id = $1
            ORDER BY origin
            "#,
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;

        // A malformed stored origin can never match a request; skip it.
        let origins = rows
            .into_iter()
            .filter_map(|row| match ClientOrigin::new(row.client_id, &row.origin) {
                Ok(origin) => Some(origin),
                Err(err) => {
                    warn!(client_id, origin = %row.origin, error = %err, "skipping malformed stored origin");
                    None
                }
            })
            .collect();

        Ok(origins)
    }

    async fn origin_exists(&self, origin: &Origin) -> StoreResult<bool> {
        // Narrow to candidate spellings in SQL, then canonicalize in Rust so
        // case, whitespace and default ports all compare equal.
        let candidates = sqlx::query_scalar::<_, String>(
            r#"
            SELECT origin
            FROM client_cors_origins
            WHERE lower(btrim(origin)) = $1
               OR lower(btrim(origin)) LIKE $2 ESCAPE '\'
            "#,
        )
        .bind(origin.as_str())
        .bind(explicit_port_pattern(origin))
        .fetch_all(&self.pool)
        .await?;

        Ok(candidates
            .iter()
            .any(|raw| stored_origin_matches(raw, origin)))
    }
}
