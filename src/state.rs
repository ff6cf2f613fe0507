/*
 * Responsibility
 * - Shared context attached to the Router (AppState)
 *   - registry: finalized chains, read-only after startup
 *   - identity: request-time authentication / privilege checks
 *   - directory: the identity store the IDM API reads from
 * - Clone is cheap (everything behind Arc)
 */
use std::sync::Arc;

use crate::services::identity::{IdentityService, IdentityStore};
use crate::services::security::ChainRegistry;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ChainRegistry>,
    pub identity: Arc<dyn IdentityService>,
    pub directory: Arc<dyn IdentityStore>,
}

impl AppState {
    pub fn new(
        registry: Arc<ChainRegistry>,
        identity: Arc<dyn IdentityService>,
        directory: Arc<dyn IdentityStore>,
    ) -> Self {
        Self {
            registry,
            identity,
            directory,
        }
    }
}
