//! Identity store: who exists and which privileges they hold.
//!
//! Queried by the gate at request time, never mutated by it.
use std::collections::BTreeMap;

use async_trait::async_trait;

use super::types::{IdentityError, UserRecord};

#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_user(&self, user_id: &str) -> Result<Option<UserRecord>, IdentityError>;

    async fn list_users(&self) -> Result<Vec<UserRecord>, IdentityError>;
}

/// Store seeded once from configuration (`IDM_USERS`).
#[derive(Debug, Clone, Default)]
pub struct InMemoryIdentityStore {
    users: BTreeMap<String, UserRecord>,
}

impl InMemoryIdentityStore {
    pub fn new(users: impl IntoIterator<Item = UserRecord>) -> Self {
        Self {
            users: users.into_iter().map(|u| (u.id.clone(), u)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn find_user(&self, user_id: &str) -> Result<Option<UserRecord>, IdentityError> {
        Ok(self.users.get(user_id).cloned())
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>, IdentityError> {
        Ok(self.users.values().cloned().collect())
    }
}
