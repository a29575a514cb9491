/*
 * Responsibility
 * - One-time startup composition of the identity binding.
 * - Validates options (fatal on failure), builds the path allow-list,
 *   wires the CORS decider to a live origin registry and the claims mapper
 *   to the profile service.
 * - Route-owning modules add their CORS-open paths via `register_path`.
 */
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::config::ConfigError;
use crate::repos::{ClientStore, UserStore};
use crate::services::claims::{ClaimTypeMap, ClaimsMapper, ProfileService};
use crate::services::cors::{
    CorsPolicyDecider, OriginRegistry, PathAllowList, origin_registry::DEFAULT_LOOKUP_TIMEOUT,
};
use crate::services::identity::cookie::ApplicationCookie;

pub const DEFAULT_AUTHENTICATION_SCHEME: &str = "idsrv";
pub const DEFAULT_LOGIN_PATH: &str = "/account/login";
pub const DEFAULT_LOGOUT_PATH: &str = "/account/logout";

/// Public endpoints of the protocol engine.
pub const PROTOCOL_CORS_PATHS: [&str; 5] = [
    "/.well-known/openid-configuration",
    "/.well-known/openid-configuration/jwks",
    "/connect/token",
    "/connect/userinfo",
    "/connect/revocation",
];

/// Account API used by first-party browser clients (registration, login, password flows).
pub const ACCOUNT_API_CORS_PATHS: [&str; 7] = [
    "/api/oauth/register",
    "/api/oauth/sendcode",
    "/api/oauth/login",
    "/api/oauth/verifycode",
    "/api/oauth/changepassword",
    "/api/oauth/resetpassword",
    "/api/oauth/update",
];

pub fn default_cors_paths() -> Vec<String> {
    PROTOCOL_CORS_PATHS
        .iter()
        .chain(ACCOUNT_API_CORS_PATHS.iter())
        .map(|p| p.to_string())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityOptions {
    pub authentication_scheme: String,
    pub login_path: String,
    pub logout_path: String,
    pub claim_types: ClaimTypeMap,
    pub static_allow_listed_paths: Vec<String>,
    pub origin_lookup_timeout: Duration,
}

impl Default for IdentityOptions {
    fn default() -> Self {
        Self {
            authentication_scheme: DEFAULT_AUTHENTICATION_SCHEME.to_string(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            logout_path: DEFAULT_LOGOUT_PATH.to_string(),
            claim_types: ClaimTypeMap::default(),
            static_allow_listed_paths: default_cors_paths(),
            origin_lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }
}

/// Everything request handling needs, built once. Handlers get shared references.
#[derive(Debug, Clone)]
pub struct IdentityBinding {
    pub cookie: ApplicationCookie,
    pub claim_types: ClaimTypeMap,
    pub cors: Arc<CorsPolicyDecider>,
    pub profile: Arc<ProfileService>,
}

#[derive(Debug, Clone)]
pub struct IdentityBindingConfigurator {
    options: IdentityOptions,
    registered_paths: Vec<String>,
}

impl IdentityBindingConfigurator {
    pub fn new(options: IdentityOptions) -> Self {
        Self {
            options,
            registered_paths: Vec::new(),
        }
    }

    /// Open CORS for `pattern` in addition to the static list. Validated in `build`.
    pub fn register_path(&mut self, pattern: impl Into<String>) -> &mut Self {
        self.registered_paths.push(pattern.into());
        self
    }

    /// Validate and compose. Each call returns an independent binding.
    pub fn build(
        &self,
        clients: Arc<dyn ClientStore>,
        users: Arc<dyn UserStore>,
    ) -> Result<IdentityBinding, ConfigError> {
        let options = &self.options;

        let cookie = ApplicationCookie::new(
            &options.authentication_scheme,
            &options.login_path,
            &options.logout_path,
        )?;
        validate_claim_types(&options.claim_types)?;
        if options.origin_lookup_timeout.is_zero() {
            return Err(ConfigError::Invalid("ORIGIN_LOOKUP_TIMEOUT_MS"));
        }

        let mut allow_list = PathAllowList::with_static(&options.static_allow_listed_paths)?;
        for pattern in &self.registered_paths {
            allow_list.register(pattern)?;
        }

        let registry = OriginRegistry::new(clients, options.origin_lookup_timeout);
        info!(
            scheme = %cookie.scheme,
            allow_listed_paths = allow_list.len(),
            client_store = registry.backend_name(),
            user_store = users.backend_name(),
            "identity binding configured"
        );

        let cors = CorsPolicyDecider::new(Arc::new(allow_list), registry);
        let profile = ProfileService::new(users, ClaimsMapper::new(options.claim_types.clone()));

        Ok(IdentityBinding {
            cookie,
            claim_types: options.claim_types.clone(),
            cors: Arc::new(cors),
            profile: Arc::new(profile),
        })
    }
}

fn validate_claim_types(types: &ClaimTypeMap) -> Result<(), ConfigError> {
    let named = [
        ("SUBJECT_CLAIM_TYPE", types.subject.as_str()),
        ("NAME_CLAIM_TYPE", types.name.as_str()),
        ("ROLE_CLAIM_TYPE", types.role.as_str()),
    ];

    for (i, &(key, value)) in named.iter().enumerate() {
        if value.trim().is_empty() || value.chars().any(char::is_whitespace) {
            return Err(ConfigError::Invalid(key));
        }
        // Colliding types would make subject/name/role indistinguishable downstream.
        if named[..i].iter().any(|&(_, earlier)| earlier == value) {
            return Err(ConfigError::Invalid(key));
        }
    }
    Ok(())
}
