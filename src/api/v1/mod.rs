/*
 * Responsibility
 * - v1 public surface (routes(), the CORS-open path list)
 */
pub mod dto;
pub mod handlers;
mod routes;

pub use routes::{PUBLIC_CORS_PATHS, routes};
