/*
 * Responsibility
 * - request/response DTOs for /profile
 * - the `claims` query is a comma-separated list of claim types
 */
use serde::{Deserialize, Serialize};

use crate::services::claims::ClaimSet;

#[derive(Debug, Default, Deserialize)]
pub struct ProfileQuery {
    pub claims: Option<String>,
}

impl ProfileQuery {
    /// `Ok(None)` means every claim.
    pub fn requested_types(&self) -> Result<Option<Vec<String>>, &'static str> {
        let Some(raw) = &self.claims else {
            return Ok(None);
        };

        let types: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        if types.is_empty() {
            return Err("claims must name at least one claim type");
        }

        Ok(Some(types))
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub subject: String,
    pub active: bool,
    pub claims: ClaimSet,
}

#[derive(Debug, Serialize)]
pub struct AssertionResponse {
    pub assertion: String,
    pub token_type: &'static str,
    pub expires_in: u64,
}
