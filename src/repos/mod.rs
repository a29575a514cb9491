pub mod client_store;
pub mod error;
pub mod memory;
pub mod user_repo;
pub mod valkey_client_store;

pub use client_store::{ClientStore, PgClientStore};
pub use error::{StoreError, StoreResult};
pub use memory::{InMemoryClientStore, InMemoryUserStore};
pub use user_repo::{PgUserStore, UserStore};
pub use valkey_client_store::ValkeyClientStore;
