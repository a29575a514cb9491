/*
 * Responsibility
 * - Router-level middleware: CORS decisions and transport concerns
 */
pub mod cors;
pub mod http;
