//! Per-request CORS decision.
//!
//! Order of evaluation:
//! 1. no `Origin` header: not a cross-origin request, nothing to allow
//! 2. allow-listed path: open policy for any origin
//! 3. otherwise: allowed only if a registered client owns the origin
//!
//! The allow-list is consulted first so public endpoints (discovery, token,
//! self-registration) stay reachable from origins no client has registered yet.
use std::sync::Arc;

use tracing::debug;

use crate::services::cors::origin_registry::OriginRegistry;
use crate::services::cors::path_allow_list::PathAllowList;

pub const ANY_HEADER: &str = "*";
pub const OPEN_POLICY_METHODS: [&str; 3] = ["GET", "POST", "OPTIONS"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorsDecision {
    pub allowed: bool,
    /// Only ever the request's own origin, and only when allowed.
    pub allowed_origin: Option<String>,
    pub allowed_headers: Vec<String>,
    pub allowed_methods: Vec<String>,
}

impl CorsDecision {
    pub fn deny() -> Self {
        Self::default()
    }

    fn open(origin: &str) -> Self {
        Self {
            allowed: true,
            allowed_origin: Some(origin.to_string()),
            allowed_headers: vec![ANY_HEADER.to_string()],
            allowed_methods: OPEN_POLICY_METHODS.iter().map(|m| m.to_string()).collect(),
        }
    }
}

/// Methods and headers granted to origins that a registered client owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredOriginPolicy {
    pub methods: Vec<String>,
    pub headers: Vec<String>,
}

impl Default for RegisteredOriginPolicy {
    fn default() -> Self {
        Self {
            methods: ["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"]
                .iter()
                .map(|m| m.to_string())
                .collect(),
            headers: ["authorization", "content-type", "accept", "x-request-id"]
                .iter()
                .map(|h| h.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CorsPolicyDecider {
    allow_list: Arc<PathAllowList>,
    registry: OriginRegistry,
    registered_policy: RegisteredOriginPolicy,
}

impl CorsPolicyDecider {
    pub fn new(allow_list: Arc<PathAllowList>, registry: OriginRegistry) -> Self {
        Self {
            allow_list,
            registry,
            registered_policy: RegisteredOriginPolicy::default(),
        }
    }

    pub fn allow_list(&self) -> &PathAllowList {
        &self.allow_list
    }

    pub fn registry(&self) -> &OriginRegistry {
        &self.registry
    }

    /// Decide for one request. Reads only; calling twice with the same input
    /// and the same registry contents gives the same answer.
    ///
    /// A blank `Origin` header counts as absent.
    pub async fn decide(&self, request_path: &str, origin_header: Option<&str>) -> CorsDecision {
        let Some(origin) = origin_header.map(str::trim).filter(|o| !o.is_empty()) else {
            return CorsDecision::deny();
        };

        if self.allow_list.is_allow_listed(request_path) {
            debug!(path = request_path, origin, "allow-listed path; open cors policy");
            return CorsDecision::open(origin);
        }

        if self.registry.is_registered(origin).await {
            return CorsDecision {
                allowed: true,
                allowed_origin: Some(origin.to_string()),
                allowed_headers: self.registered_policy.headers.clone(),
                allowed_methods: self.registered_policy.methods.clone(),
            };
        }

        debug!(path = request_path, origin, "cross-origin request denied");
        CorsDecision::deny()
    }
}
