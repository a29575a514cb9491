use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

use crate::services::claims::mapper::ClaimSet;

// Set by the signer; identity claims with these types are dropped.
const REGISTERED_CLAIMS: [&str; 6] = ["iss", "aud", "iat", "nbf", "exp", "jti"];

/// Longest lifetime an assertion may be issued with (one day).
pub const MAX_TTL_SECONDS: u64 = 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum AssertionError {
    #[error("invalid assertion signing key: {0}")]
    InvalidKey(String),
    #[error("assertion ttl must be between 1 and {MAX_TTL_SECONDS} seconds, got {0}")]
    InvalidTtl(u64),
    #[error("failed to sign assertion: {0}")]
    Signing(String),
}

#[derive(Debug, Clone)]
pub struct SignedAssertion {
    pub token: String,
    pub expires_in: u64,
}

/// Signs claim sets as EdDSA JWTs for the token pipeline.
///
/// A claim type that occurs once becomes a string member; repeated types
/// (roles, typically) become an array in claim-set order.
#[derive(Clone)]
pub struct AssertionSigner {
    issuer: String,
    audience: String,
    ttl_seconds: u64,
    encoding_key: EncodingKey,
}

impl std::fmt::Debug for AssertionSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("AssertionSigner")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

impl AssertionSigner {
    /// `private_key_pem` must be an Ed25519 private key in PKCS#8 PEM format.
    /// `ttl_seconds` must be in `1..=MAX_TTL_SECONDS`.
    pub fn new(
        private_key_pem: &str,
        issuer: impl Into<String>,
        audience: impl Into<String>,
        ttl_seconds: u64,
    ) -> Result<Self, AssertionError> {
        if !(1..=MAX_TTL_SECONDS).contains(&ttl_seconds) {
            return Err(AssertionError::InvalidTtl(ttl_seconds));
        }
        let encoding_key = EncodingKey::from_ed_pem(private_key_pem.as_bytes()).map_err(|e| {
            warn!(error = %e, "failed to parse assertion private key PEM (expected Ed25519 PKCS#8 PEM)");
            AssertionError::InvalidKey(e.to_string())
        })?;

        Ok(Self {
            issuer: issuer.into(),
            audience: audience.into(),
            ttl_seconds,
            encoding_key,
        })
    }

    pub fn sign(&self, claims: &ClaimSet) -> Result<SignedAssertion, AssertionError> {
        let now = chrono::Utc::now().timestamp();
        let exp = i64::try_from(self.ttl_seconds)
            .ok()
            .and_then(|ttl| now.checked_add(ttl))
            .ok_or(AssertionError::InvalidTtl(self.ttl_seconds))?;

        let mut payload = Map::new();
        payload.insert("iss".into(), Value::from(self.issuer.as_str()));
        payload.insert("aud".into(), Value::from(self.audience.as_str()));
        payload.insert("iat".into(), Value::from(now));
        payload.insert("exp".into(), Value::from(exp));
        payload.insert("jti".into(), Value::from(Uuid::new_v4().to_string()));

        for claim in claims {
            let key = claim.claim_type.as_str();
            if REGISTERED_CLAIMS.contains(&key) {
                warn!(claim_type = key, "identity claim collides with a registered claim; dropped");
                continue;
            }
            let value = Value::from(claim.value.as_str());
            match payload.get_mut(key) {
                None => {
                    payload.insert(key.to_string(), value);
                }
                Some(Value::Array(values)) => values.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
            }
        }

        let mut header = Header::new(Algorithm::EdDSA);
        header.typ = Some("JWT".to_string());
        let token = jsonwebtoken::encode(&header, &payload, &self.encoding_key).map_err(|e| {
            error!(error = %e, "failed to sign claims assertion");
            AssertionError::Signing(e.to_string())
        })?;

        Ok(SignedAssertion {
            token,
            expires_in: self.ttl_seconds,
        })
    }
}
