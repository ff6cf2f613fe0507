use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::services::security::Privilege;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity backend unavailable: {0}")]
    Backend(String),
}

/// Credentials as presented on one request. Stateless: nothing is kept after
/// the request ends.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user_id: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user_id", &self.user_id)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A stored user as the identity store knows it.
#[derive(Clone, Serialize)]
pub struct UserRecord {
    pub id: String,
    #[serde(skip)]
    pub password: String,
    pub privileges: BTreeSet<Privilege>,
}

impl UserRecord {
    pub fn new(
        id: impl Into<String>,
        password: impl Into<String>,
        privileges: impl IntoIterator<Item = Privilege>,
    ) -> Self {
        Self {
            id: id.into(),
            password: password.into(),
            privileges: privileges.into_iter().collect(),
        }
    }
}

impl fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRecord")
            .field("id", &self.id)
            .field("privileges", &self.privileges)
            .finish_non_exhaustive()
    }
}

/// An authenticated caller together with the privileges loaded for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: String,
    pub privileges: BTreeSet<Privilege>,
}
