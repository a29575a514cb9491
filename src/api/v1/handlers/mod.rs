pub mod binding;
pub mod health;
pub mod profile;
