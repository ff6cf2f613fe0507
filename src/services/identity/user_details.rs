//! Request-time identity checks backed by an [`IdentityStore`].
//!
//! Loaded users are cached for the configured user validity period so that
//! privilege changes in the store become visible after at most that long.
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use subtle::ConstantTimeEq;
use tokio::sync::RwLock;

use super::store::IdentityStore;
use super::types::{Credentials, IdentityError, Principal, UserRecord};
use crate::services::security::Privilege;

/// The questions the access middleware asks once a chain says what is required.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// `Ok(None)` when the credentials do not identify a user.
    async fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> Result<Option<Principal>, IdentityError>;

    async fn has_privilege(
        &self,
        principal: &Principal,
        privilege: &Privilege,
    ) -> Result<bool, IdentityError> {
        Ok(principal.privileges.contains(privilege))
    }
}

struct CachedUser {
    user: UserRecord,
    loaded_at: DateTime<Utc>,
}

pub struct UserDetailsService {
    store: Arc<dyn IdentityStore>,
    validity: TimeDelta,
    cache: RwLock<HashMap<String, CachedUser>>,
}

impl UserDetailsService {
    pub fn new(store: Arc<dyn IdentityStore>, user_validity_period: std::time::Duration) -> Self {
        let validity = TimeDelta::from_std(user_validity_period).unwrap_or(TimeDelta::MAX);
        Self {
            store,
            validity,
            cache: RwLock::new(HashMap::new()),
        }
    }

    async fn load_user(&self, user_id: &str) -> Result<Option<UserRecord>, IdentityError> {
        let now = Utc::now();
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.get(user_id)
                && cached
                    .loaded_at
                    .checked_add_signed(self.validity)
                    .is_none_or(|expires_at| expires_at > now)
            {
                return Ok(Some(cached.user.clone()));
            }
        }

        let Some(user) = self.store.find_user(user_id).await? else {
            self.cache.write().await.remove(user_id);
            return Ok(None);
        };

        tracing::debug!(user_id = %user.id, "user details loaded");
        self.cache.write().await.insert(
            user_id.to_string(),
            CachedUser {
                user: user.clone(),
                loaded_at: now,
            },
        );
        Ok(Some(user))
    }
}

#[async_trait]
impl IdentityService for UserDetailsService {
    async fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> Result<Option<Principal>, IdentityError> {
        let Some(user) = self.load_user(&credentials.user_id).await? else {
            return Ok(None);
        };

        let password_matches: bool = user
            .password
            .as_bytes()
            .ct_eq(credentials.password.as_bytes())
            .into();
        if !password_matches {
            return Ok(None);
        }

        Ok(Some(Principal {
            id: user.id,
            privileges: user.privileges,
        }))
    }
}
