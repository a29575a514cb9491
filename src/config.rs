/*
 * Responsibility
 * - Load environment variables / .env (ports, stores, identity options, signing key).
 * - Validate values up front: a bad value refuses startup instead of running
 *   with undefined claim types or cookie paths.
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::services::claims::ClaimTypeMap;
use crate::services::claims::assertion::MAX_TTL_SECONDS;
use crate::services::cors::{Origin, OriginError, PathPatternError};
use crate::services::identity::IdentityOptions;
use crate::services::identity::configurator::{
    DEFAULT_AUTHENTICATION_SCHEME, DEFAULT_LOGIN_PATH, DEFAULT_LOGOUT_PATH, default_cors_paths,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<String>) -> Self {
        match raw
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
    PathPattern(PathPatternError),
    Origin(OriginError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
            ConfigError::PathPattern(e) => write!(f, "invalid cors path: {}", e),
            ConfigError::Origin(e) => write!(f, "invalid cors origin: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::PathPattern(e) => Some(e),
            ConfigError::Origin(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PathPatternError> for ConfigError {
    fn from(e: PathPatternError) -> Self {
        ConfigError::PathPattern(e)
    }
}

impl From<OriginError> for ConfigError {
    fn from(e: OriginError) -> Self {
        ConfigError::Origin(e)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientStoreKind {
    Memory,
    // Shares the `DATABASE_URL` pool with the user store.
    Postgres,
    Valkey { redis_url: String },
}

#[derive(Clone)]
pub struct AssertionConfig {
    pub issuer: String,
    pub audience: String,
    pub private_key_pem: String,
    pub ttl_seconds: u64,
}

impl fmt::Debug for AssertionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("AssertionConfig")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpLimits {
    pub body_limit_bytes: usize,
    pub timeout: Duration,
}

impl Default for HttpLimits {
    fn default() -> Self {
        Self {
            body_limit_bytes: 1024 * 1024,
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub client_store: ClientStoreKind,
    // Identity store; without it users come from the in-memory store.
    pub database_url: Option<String>,
    // Seeds the in-memory client store.
    pub cors_allowed_origins: Vec<String>,

    pub identity: IdentityOptions,
    pub assertion: Option<AssertionConfig>,
    pub http: HttpLimits,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port: u16 = parse_or(var("PORT"), "PORT", 3000)?;
        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(var("APP_ENV"));

        let database_url = var("DATABASE_URL");
        let client_store = match var("CLIENT_STORE")
            .unwrap_or_else(|| "memory".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "memory" => ClientStoreKind::Memory,
            "postgres" | "postgresql" => {
                if database_url.is_none() {
                    return Err(ConfigError::Missing("DATABASE_URL"));
                }
                ClientStoreKind::Postgres
            }
            "valkey" | "redis" => ClientStoreKind::Valkey {
                redis_url: var("REDIS_URL").ok_or(ConfigError::Missing("REDIS_URL"))?,
            },
            _ => return Err(ConfigError::Invalid("CLIENT_STORE")),
        };

        let cors_allowed_origins = split_list(var("CORS_ALLOWED_ORIGINS"));
        for origin in &cors_allowed_origins {
            Origin::parse(origin)?;
        }

        let origin_lookup_timeout = Duration::from_millis(parse_or(
            var("ORIGIN_LOOKUP_TIMEOUT_MS"),
            "ORIGIN_LOOKUP_TIMEOUT_MS",
            300,
        )?);

        let static_allow_listed_paths = match var("CORS_ALLOWED_PATHS") {
            Some(raw) => split_list(Some(raw)),
            None => default_cors_paths(),
        };

        let identity = IdentityOptions {
            authentication_scheme: var("AUTHENTICATION_SCHEME")
                .unwrap_or_else(|| DEFAULT_AUTHENTICATION_SCHEME.to_string()),
            login_path: var("LOGIN_PATH").unwrap_or_else(|| DEFAULT_LOGIN_PATH.to_string()),
            logout_path: var("LOGOUT_PATH").unwrap_or_else(|| DEFAULT_LOGOUT_PATH.to_string()),
            claim_types: ClaimTypeMap {
                subject: var("SUBJECT_CLAIM_TYPE").unwrap_or_else(|| "sub".to_string()),
                name: var("NAME_CLAIM_TYPE").unwrap_or_else(|| "name".to_string()),
                role: var("ROLE_CLAIM_TYPE").unwrap_or_else(|| "role".to_string()),
            },
            static_allow_listed_paths,
            origin_lookup_timeout,
        };

        let assertion = match var("ASSERTION_PRIVATE_KEY_PEM") {
            Some(pem) => Some(AssertionConfig {
                issuer: var("ASSERTION_ISSUER").ok_or(ConfigError::Missing("ASSERTION_ISSUER"))?,
                audience: var("ASSERTION_AUDIENCE")
                    .ok_or(ConfigError::Missing("ASSERTION_AUDIENCE"))?,
                private_key_pem: pem.replace("\\n", "\n"),
                ttl_seconds: parse_or(var("ASSERTION_TTL_SECONDS"), "ASSERTION_TTL_SECONDS", 300)
                    .and_then(|ttl: u64| {
                        if (1..=MAX_TTL_SECONDS).contains(&ttl) {
                            Ok(ttl)
                        } else {
                            Err(ConfigError::Invalid("ASSERTION_TTL_SECONDS"))
                        }
                    })?,
            }),
            None => None,
        };

        let defaults = HttpLimits::default();
        let http = HttpLimits {
            body_limit_bytes: parse_or(
                var("REQUEST_BODY_LIMIT_BYTES"),
                "REQUEST_BODY_LIMIT_BYTES",
                defaults.body_limit_bytes,
            )?,
            timeout: Duration::from_secs(parse_or(
                var("REQUEST_TIMEOUT_SECONDS"),
                "REQUEST_TIMEOUT_SECONDS",
                defaults.timeout.as_secs(),
            )?),
        };
        if http.timeout.is_zero() {
            return Err(ConfigError::Invalid("REQUEST_TIMEOUT_SECONDS"));
        }

        Ok(Self {
            addr,
            app_env,
            client_store,
            database_url,
            cors_allowed_origins,
            identity,
            assertion,
            http,
        })
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError> {
    match raw {
        Some(v) => v.parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

fn split_list(raw: Option<String>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
