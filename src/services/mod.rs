pub mod cache;
pub mod claims;
pub mod cors;
pub mod identity;
