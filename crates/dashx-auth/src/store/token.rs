//! Server-side records of refresh and reset tokens.

use std::time::Duration;

use tracing::debug;
use uuid::Uuid;

use dashx_cache::{CacheManager, keys};
use dashx_core::result::AppResult;
use dashx_core::traits::CacheProvider;

use crate::jwt::TokenKind;

/// Stored tokens keyed by `(kind, token id, subject)`.
#[derive(Debug, Clone)]
pub struct TokenStore {
    cache: CacheManager,
}

impl TokenStore {
    pub fn new(cache: CacheManager) -> Self {
        Self { cache }
    }

    pub async fn put(
        &self,
        kind: TokenKind,
        id: Uuid,
        subject: Uuid,
        value: &str,
        ttl: Duration,
    ) -> AppResult<()> {
        self.cache.set(&keys::token(kind, id, subject), value, ttl).await
    }

    /// Read a stored token without consuming it.
    pub async fn get(&self, kind: TokenKind, id: Uuid, subject: Uuid) -> AppResult<Option<String>> {
        self.cache.get(&keys::token(kind, id, subject)).await
    }

    pub async fn delete(&self, kind: TokenKind, id: Uuid, subject: Uuid) -> AppResult<()> {
        self.cache.delete(&keys::token(kind, id, subject)).await
    }

    /// Remove a stored token and return it. Only one caller can ever
    /// receive a given record.
    pub async fn take(&self, kind: TokenKind, id: Uuid, subject: Uuid) -> AppResult<Option<String>> {
        self.cache.take(&keys::token(kind, id, subject)).await
    }

    /// Remove every token of `kind` issued to `subject`.
    pub async fn delete_all(&self, kind: TokenKind, subject: Uuid) -> AppResult<u64> {
        let removed = self.cache.delete_pattern(&keys::token_sweep(kind, subject)).await?;
        debug!(%subject, %kind, removed, "Swept stored tokens");
        Ok(removed)
    }
}
