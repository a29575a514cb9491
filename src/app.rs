/*
 * Responsibility
 * - Config → stores → identity binding → Router
 * - CORS decisions and transport layers wrapped around every route
 * - axum::serve()
 */
use std::{panic, process, sync::Arc};

use anyhow::Context;
use axum::{Router, routing::get};
use sqlx::postgres::PgPoolOptions;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::{ClientStoreKind, Config, ConfigError, HttpLimits};
use crate::middleware;
use crate::repos::{
    ClientStore, InMemoryClientStore, InMemoryUserStore, PgClientStore, PgUserStore, UserStore,
    ValkeyClientStore,
};
use crate::services::claims::AssertionSigner;
use crate::services::identity::{IdentityBindingConfigurator, IdentityOptions};
use crate::state::AppState;

/// Client id owning the origins listed in `CORS_ALLOWED_ORIGINS`.
pub const STATIC_CLIENT_ID: &str = "static";

const DB_MAX_CONNECTIONS: u32 = 5;

fn init_tracing() {
    // RUST_LOG wins when set, e.g.
    // RUST_LOG=info,identity_binding=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // Development: crash so it gets noticed. Production: keep serving.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> anyhow::Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting identity binding in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let stores = build_stores(&config).await?;
    let state = build_state(&config, stores)?;
    let app = build_router(state, &config.http);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("bind {}", config.addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

pub struct Stores {
    pub clients: Arc<dyn ClientStore>,
    pub users: Arc<dyn UserStore>,
}

pub async fn build_stores(config: &Config) -> anyhow::Result<Stores> {
    let pool = match &config.database_url {
        Some(url) => Some(
            PgPoolOptions::new()
                .max_connections(DB_MAX_CONNECTIONS)
                .connect(url)
                .await
                .context("connect DATABASE_URL")?,
        ),
        None => None,
    };

    let clients: Arc<dyn ClientStore> = match &config.client_store {
        ClientStoreKind::Memory => Arc::new(InMemoryClientStore::with_client(
            STATIC_CLIENT_ID,
            config.cors_allowed_origins.as_slice(),
        )?),
        ClientStoreKind::Postgres => {
            let pool = pool.clone().ok_or(ConfigError::Missing("DATABASE_URL"))?;
            Arc::new(PgClientStore::new(pool))
        }
        ClientStoreKind::Valkey { redis_url } => Arc::new(
            ValkeyClientStore::new(redis_url)
                .await
                .context("connect REDIS_URL")?,
        ),
    };

    let users: Arc<dyn UserStore> = match pool {
        Some(pool) => Arc::new(PgUserStore::new(pool)),
        None => {
            warn!("DATABASE_URL not set; serving users from an empty in-memory store");
            Arc::new(InMemoryUserStore::new())
        }
    };

    Ok(Stores { clients, users })
}

/// Configurator preloaded with the CORS-open paths of the mounted API.
pub fn configurator(options: IdentityOptions) -> IdentityBindingConfigurator {
    let mut configurator = IdentityBindingConfigurator::new(options);
    for path in api::v1::PUBLIC_CORS_PATHS {
        configurator.register_path(path);
    }
    configurator
}

pub fn build_state(config: &Config, stores: Stores) -> anyhow::Result<AppState> {
    let identity = configurator(config.identity.clone()).build(stores.clients, stores.users)?;

    let assertions = match &config.assertion {
        Some(a) => Some(AssertionSigner::new(
            &a.private_key_pem,
            a.issuer.clone(),
            a.audience.clone(),
            a.ttl_seconds,
        )?),
        None => None,
    };

    Ok(AppState::new(identity, assertions))
}

pub fn build_router(state: AppState, limits: &HttpLimits) -> Router {
    async fn health() -> &'static str {
        "ok"
    }

    let decider = state.identity.cors.clone();
    let router = Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api::v1::routes(&state))
        .with_state(state);

    let router = middleware::cors::apply(router, decider);
    middleware::http::apply(router, limits)
}
