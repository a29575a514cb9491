/*
 * Responsibility
 * - Shared context attached to the Router (AppState)
 * - Cheap to clone (Arc inside); built once at startup and read-only afterwards
 */
use std::sync::Arc;

use crate::services::claims::AssertionSigner;
use crate::services::identity::IdentityBinding;

#[derive(Clone, Debug)]
pub struct AppState {
    pub identity: Arc<IdentityBinding>,
    pub assertions: Option<Arc<AssertionSigner>>,
}

impl AppState {
    pub fn new(identity: IdentityBinding, assertions: Option<AssertionSigner>) -> Self {
        Self {
            identity: Arc::new(identity),
            assertions: assertions.map(Arc::new),
        }
    }
}
