pub mod configurator;
pub mod cookie;

pub use configurator::{IdentityBinding, IdentityBindingConfigurator, IdentityOptions};
pub use cookie::ApplicationCookie;
