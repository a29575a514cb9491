use serde::Serialize;

use crate::services::claims::ClaimTypeMap;
use crate::services::identity::ApplicationCookie;

#[derive(Debug, Serialize)]
pub struct BindingResponse {
    pub cookie: ApplicationCookie,
    pub claim_types: ClaimTypeMap,
    pub cors_paths: Vec<CorsPathResponse>,
}

#[derive(Debug, Serialize)]
pub struct CorsPathResponse {
    pub pattern: String,
    // "static" | "registered"
    pub source: &'static str,
}
