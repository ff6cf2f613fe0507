/*
 * Responsibility
 * - The authenticated context handlers see
 * - Filled in by the access middleware into request extensions;
 *   handlers only ever receive this type
 */
use crate::services::identity::Principal;
use crate::services::security::Privilege;

/// Context attached to a request that passed an `Authenticated` requirement.
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub user_id: String,
    pub privileges: Vec<Privilege>,
}

impl From<Principal> for AuthCtx {
    fn from(principal: Principal) -> Self {
        Self {
            user_id: principal.id,
            privileges: principal.privileges.into_iter().collect(),
        }
    }
}
