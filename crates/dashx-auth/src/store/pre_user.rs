//! Pending registrations awaiting email confirmation.

use std::time::Duration;

use uuid::Uuid;

use dashx_cache::{CacheManager, keys};
use dashx_core::error::AppError;
use dashx_core::result::AppResult;
use dashx_core::traits::CacheProvider;
use dashx_entity::user::PreUser;

/// Pre-users indexed by id and by email, both expiring together.
#[derive(Debug, Clone)]
pub struct PreUserStore {
    cache: CacheManager,
}

impl PreUserStore {
    pub fn new(cache: CacheManager) -> Self {
        Self { cache }
    }

    pub async fn put(&self, pre_user: &PreUser, ttl: Duration) -> AppResult<()> {
        self.cache
            .set_json(&keys::pre_user_id(pre_user.id), pre_user, ttl)
            .await?;
        self.cache
            .set(&keys::pre_user_email(&pre_user.email), &pre_user.id.to_string(), ttl)
            .await
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Option<PreUser>> {
        self.cache.get_json(&keys::pre_user_id(id)).await
    }

    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<PreUser>> {
        let Some(id) = self.cache.get(&keys::pre_user_email(email)).await? else {
            return Ok(None);
        };
        let id = Uuid::parse_str(&id)
            .map_err(|e| AppError::cache(format!("Corrupt pre-user index for {email}: {e}")))?;
        self.get(id).await
    }

    pub async fn exists_by_email(&self, email: &str) -> AppResult<bool> {
        Ok(self.get_by_email(email).await?.is_some())
    }

    pub async fn delete(&self, pre_user: &PreUser) -> AppResult<()> {
        self.cache.delete(&keys::pre_user_id(pre_user.id)).await?;
        self.cache.delete(&keys::pre_user_email(&pre_user.email)).await
    }
}
