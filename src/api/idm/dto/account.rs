use serde::Serialize;

use crate::api::idm::extractors::AuthCtx;
use crate::services::security::Privilege;

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: String,
    pub privileges: Vec<Privilege>,
}

impl From<AuthCtx> for AccountResponse {
    fn from(ctx: AuthCtx) -> Self {
        Self {
            id: ctx.user_id,
            privileges: ctx.privileges,
        }
    }
}
