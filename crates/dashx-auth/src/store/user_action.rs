//! Short-lived records binding a one-off flow to a user.

use std::fmt;
use std::time::Duration;

use uuid::Uuid;

use dashx_cache::{CacheManager, keys};
use dashx_core::error::AppError;
use dashx_core::result::AppResult;
use dashx_core::traits::CacheProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    ResetPassword,
}

impl fmt::Display for UserAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResetPassword => f.write_str("reset-password"),
        }
    }
}

/// `{action}:{key id}` → user id.
#[derive(Debug, Clone)]
pub struct UserActionStore {
    cache: CacheManager,
}

impl UserActionStore {
    pub fn new(cache: CacheManager) -> Self {
        Self { cache }
    }

    pub async fn put(
        &self,
        action: UserAction,
        key_id: Uuid,
        user_id: Uuid,
        ttl: Duration,
    ) -> AppResult<()> {
        let key = keys::user_action(&action.to_string(), key_id);
        self.cache.set(&key, &user_id.to_string(), ttl).await
    }

    pub async fn get(&self, action: UserAction, key_id: Uuid) -> AppResult<Option<Uuid>> {
        let key = keys::user_action(&action.to_string(), key_id);
        match self.cache.get(&key).await? {
            Some(raw) => Uuid::parse_str(&raw)
                .map(Some)
                .map_err(|e| AppError::cache(format!("Corrupt user action {key}: {e}"))),
            None => Ok(None),
        }
    }

    pub async fn delete(&self, action: UserAction, key_id: Uuid) -> AppResult<()> {
        self.cache
            .delete(&keys::user_action(&action.to_string(), key_id))
            .await
    }
}
