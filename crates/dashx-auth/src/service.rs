//! Token lifecycle: issuance, single-use consumption and revocation.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use dashx_cache::CacheManager;
use dashx_core::config::AuthConfig;
use dashx_core::error::AppError;
use dashx_core::result::AppResult;
use dashx_entity::user::User;

use crate::jwt::{Claims, JwtCodec, TokenKind};
use crate::password::PasswordHasher;
use crate::store::TokenStore;

/// Access and refresh token issued together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Issues and verifies all token kinds.
///
/// Access and confirm tokens are stateless. Refresh and reset tokens are
/// recorded on issue and deleted on first successful verification.
#[derive(Debug, Clone)]
pub struct AuthService {
    codec: JwtCodec,
    tokens: TokenStore,
    hasher: PasswordHasher,
}

impl AuthService {
    pub fn new(config: &AuthConfig, cache: CacheManager, hasher: PasswordHasher) -> Self {
        Self {
            codec: JwtCodec::new(config),
            tokens: TokenStore::new(cache),
            hasher,
        }
    }

    pub fn lifespan(&self, kind: TokenKind) -> AppResult<std::time::Duration> {
        self.codec.lifespan(kind)
    }

    /// Sign a token and, for stored kinds, record it with TTL = lifespan.
    async fn issue(&self, kind: TokenKind, subject: Uuid, is_admin: bool) -> AppResult<String> {
        let (token, claims) = self.codec.sign(kind, subject, is_admin)?;
        if kind.is_stored() {
            let ttl = self.codec.lifespan(kind)?;
            self.tokens
                .put(kind, claims.jti, claims.sub, &token, ttl)
                .await?;
        }
        Ok(token)
    }

    pub async fn generate_tokens(&self, user: &User) -> AppResult<TokenPair> {
        let access_token = self.issue(TokenKind::Access, user.id, user.is_admin).await?;
        let refresh_token = self.issue(TokenKind::Refresh, user.id, user.is_admin).await?;
        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Verify a token of the given kind.
    ///
    /// Stored kinds are looked up and consumed: a missing record yields
    /// [`AppError::token_not_found`], a different value
    /// [`AppError::invalid_refresh_token`].
    pub async fn verify_token(&self, token: &str, kind: TokenKind) -> AppResult<Claims> {
        let claims = self.codec.verify(kind, token)?;
        if kind.is_stored() {
            self.consume(kind, &claims, token).await?;
        }
        Ok(claims)
    }

    /// Take the stored record in one step so concurrent presentations of the
    /// same token cannot both pass. A mismatching record is consumed as well.
    async fn consume(&self, kind: TokenKind, claims: &Claims, token: &str) -> AppResult<()> {
        let Some(stored) = self.tokens.take(kind, claims.jti, claims.sub).await? else {
            debug!(subject = %claims.sub, %kind, "Token is not in the store");
            return Err(AppError::token_not_found());
        };

        if stored.as_bytes() != token.as_bytes() {
            debug!(subject = %claims.sub, %kind, "Stored token does not match");
            return Err(AppError::invalid_refresh_token());
        }
        Ok(())
    }

    pub async fn generate_confirm_token(&self, pre_user_id: Uuid) -> AppResult<String> {
        self.issue(TokenKind::Confirm, pre_user_id, false).await
    }

    pub async fn verify_confirm_token(&self, token: &str) -> AppResult<Claims> {
        self.verify_token(token, TokenKind::Confirm).await
    }

    /// Issue a reset token whose subject is the random reset subject.
    pub async fn generate_reset_token(&self, subject: Uuid) -> AppResult<String> {
        self.issue(TokenKind::Reset, subject, false).await
    }

    pub async fn verify_reset_token(&self, token: &str) -> AppResult<Claims> {
        self.verify_token(token, TokenKind::Reset).await
    }

    /// Hash a reset subject into the cookie-safe value handed to the client.
    pub fn hash_reset_subject(&self, subject: Uuid) -> AppResult<String> {
        let phc = self.hasher.hash_password(&subject.to_string())?;
        Ok(URL_SAFE_NO_PAD.encode(phc))
    }

    /// Check that `cookie_hash` was produced from `subject`.
    pub fn verify_reset_subject(&self, subject: Uuid, cookie_hash: &str) -> AppResult<()> {
        let phc = URL_SAFE_NO_PAD
            .decode(cookie_hash)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .ok_or_else(|| AppError::authentication("Reset subject hash is malformed"))?;

        match self.hasher.verify_password(&subject.to_string(), &phc) {
            Ok(true) => Ok(()),
            Ok(false) => Err(AppError::authentication("Reset subject does not match")),
            Err(e) => Err(AppError::authentication(format!(
                "Reset subject hash is invalid: {}",
                e.message
            ))),
        }
    }

    /// Revoke every refresh token of `user_id`. Idempotent.
    pub async fn revoke_refresh_tokens(&self, user_id: Uuid) -> AppResult<()> {
        self.tokens.delete_all(TokenKind::Refresh, user_id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::test_support::config;
    use dashx_core::error::messages;
    use dashx_core::traits::CacheProvider;

    fn service() -> AuthService {
        let cfg = config();
        let hasher = PasswordHasher::new(&cfg.password).unwrap();
        AuthService::new(&cfg, CacheManager::in_memory(), hasher)
    }

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "alice".into(),
            email: "alice@example.com".into(),
            password: String::new(),
            is_admin: false,
            language: "en".into(),
            theme: "light".into(),
        }
    }

    #[tokio::test]
    async fn test_refresh_token_is_single_use() {
        let auth = service();
        let user = user();
        let pair = auth.generate_tokens(&user).await.unwrap();

        let claims = auth
            .verify_token(&pair.refresh_token, TokenKind::Refresh)
            .await
            .unwrap();
        assert_eq!(claims.sub, user.id);

        let err = auth
            .verify_token(&pair.refresh_token, TokenKind::Refresh)
            .await
            .unwrap_err();
        assert!(err.is(messages::TOKEN_NOT_FOUND) || err.is(messages::INVALID_REFRESH_TOKEN));
    }

    /// Store with a network-like delay on every call.
    #[derive(Debug)]
    struct SlowCache(CacheManager);

    #[async_trait::async_trait]
    impl CacheProvider for SlowCache {
        async fn get(&self, key: &str) -> AppResult<Option<String>> {
            tokio::time::sleep(Duration::from_millis(2)).await;
            self.0.get(key).await
        }

        async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
            self.0.set(key, value, ttl).await
        }

        async fn delete(&self, key: &str) -> AppResult<()> {
            tokio::time::sleep(Duration::from_millis(2)).await;
            self.0.delete(key).await
        }

        async fn take(&self, key: &str) -> AppResult<Option<String>> {
            tokio::time::sleep(Duration::from_millis(2)).await;
            self.0.take(key).await
        }

        async fn exists(&self, key: &str) -> AppResult<bool> {
            self.0.exists(key).await
        }

        async fn delete_pattern(&self, pattern: &str) -> AppResult<u64> {
            self.0.delete_pattern(pattern).await
        }

        async fn health_check(&self) -> AppResult<bool> {
            Ok(true)
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_refresh_token_concurrent_replay_accepted_once() {
        let cfg = config();
        let hasher = PasswordHasher::new(&cfg.password).unwrap();
        let cache = CacheManager::from_provider(Arc::new(SlowCache(CacheManager::in_memory())));
        let auth = AuthService::new(&cfg, cache, hasher);
        let user = user();

        for _ in 0..20 {
            let pair = auth.generate_tokens(&user).await.unwrap();
            let barrier = Arc::new(tokio::sync::Barrier::new(2));

            let attempts: Vec<_> = (0..2)
                .map(|_| {
                    let auth = auth.clone();
                    let token = pair.refresh_token.clone();
                    let barrier = barrier.clone();
                    tokio::spawn(async move {
                        barrier.wait().await;
                        auth.verify_token(&token, TokenKind::Refresh).await
                    })
                })
                .collect();

            let mut accepted = 0;
            for attempt in attempts {
                match attempt.await.unwrap() {
                    Ok(_) => accepted += 1,
                    Err(err) => assert!(err.is(messages::TOKEN_NOT_FOUND)),
                }
            }
            assert_eq!(accepted, 1);
        }
    }

    #[tokio::test]
    async fn test_access_token_is_stateless_and_reusable() {
        let auth = service();
        let pair = auth.generate_tokens(&user()).await.unwrap();
        for _ in 0..2 {
            auth.verify_token(&pair.access_token, TokenKind::Access)
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_confirm_and_access_are_not_interchangeable() {
        let auth = service();
        let confirm = auth.generate_confirm_token(Uuid::new_v4()).await.unwrap();
        let pair = auth.generate_tokens(&user()).await.unwrap();

        assert!(auth.verify_token(&confirm, TokenKind::Access).await.is_err());
        assert!(auth.verify_confirm_token(&pair.access_token).await.is_err());
        assert!(auth.verify_confirm_token(&confirm).await.is_ok());
    }

    #[tokio::test]
    async fn test_revoked_refresh_token_is_not_found() {
        let auth = service();
        let user = user();
        let pair = auth.generate_tokens(&user).await.unwrap();

        auth.revoke_refresh_tokens(user.id).await.unwrap();
        // Second call has nothing to remove and still succeeds.
        auth.revoke_refresh_tokens(user.id).await.unwrap();

        let err = auth
            .verify_token(&pair.refresh_token, TokenKind::Refresh)
            .await
            .unwrap_err();
        assert!(err.is(messages::TOKEN_NOT_FOUND));
    }

    #[tokio::test]
    async fn test_reset_token_is_single_use() {
        let auth = service();
        let subject = Uuid::new_v4();
        let token = auth.generate_reset_token(subject).await.unwrap();

        assert_eq!(auth.verify_reset_token(&token).await.unwrap().sub, subject);
        assert!(auth.verify_reset_token(&token).await.is_err());
    }

    #[tokio::test]
    async fn test_reset_subject_requires_matching_hash() {
        let auth = service();
        let subject = Uuid::new_v4();
        let token = auth.generate_reset_token(subject).await.unwrap();
        let claims = auth.verify_reset_token(&token).await.unwrap();

        let good = auth.hash_reset_subject(subject).unwrap();
        let wrong = auth.hash_reset_subject(Uuid::new_v4()).unwrap();

        assert!(auth.verify_reset_subject(claims.sub, &good).is_ok());
        assert!(auth.verify_reset_subject(claims.sub, &wrong).is_err());
        assert!(auth.verify_reset_subject(claims.sub, "garbage").is_err());
    }
}
