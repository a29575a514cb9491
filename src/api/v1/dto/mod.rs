pub mod binding;
pub mod profile;
