use serde::Serialize;

use crate::services::identity::UserRecord;
use crate::services::security::Privilege;

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub privileges: Vec<Privilege>,
}

impl From<UserRecord> for UserResponse {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            privileges: user.privileges.into_iter().collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PrivilegeResponse {
    pub id: &'static str,
}
