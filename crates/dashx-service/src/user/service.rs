//! Account operations on top of the user repository and the token service.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use dashx_auth::store::{PreUserStore, UserAction, UserActionStore};
use dashx_auth::{AuthService, PasswordHasher, TokenKind, TokenPair};
use dashx_cache::CacheManager;
use dashx_core::error::{AppError, messages};
use dashx_core::result::AppResult;
use dashx_database::repositories::UserRepository;
use dashx_entity::event::EventAction;
use dashx_entity::user::{CreateUser, PreUser, UpdateUser, User};
use dashx_realtime::EventRegistry;

use crate::mail::MailService;

/// Registration input.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Handles account operations for confirmed and pending users.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    auth: Arc<AuthService>,
    hasher: PasswordHasher,
    pre_users: PreUserStore,
    actions: UserActionStore,
    mail: MailService,
    events: EventRegistry,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        auth: Arc<AuthService>,
        hasher: PasswordHasher,
        cache: CacheManager,
        mail: MailService,
        events: EventRegistry,
    ) -> Self {
        Self {
            users,
            auth,
            hasher,
            pre_users: PreUserStore::new(cache.clone()),
            actions: UserActionStore::new(cache),
            mail,
            events,
        }
    }

    /// Look up a confirmed user by email, treating a miss as `None`.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        match self.users.get_by_email(email).await {
            Ok(user) => Ok(Some(user)),
            Err(e) if e.is(messages::USER_NOT_FOUND) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Store a pending registration and mail its confirm token.
    pub async fn pre_create(&self, new_user: NewUser) -> AppResult<()> {
        if self.find_by_email(&new_user.email).await?.is_some()
            || self.pre_users.exists_by_email(&new_user.email).await?
        {
            return Err(AppError::email_exists());
        }

        let pre_user = PreUser {
            id: Uuid::new_v4(),
            name: new_user.name,
            email: new_user.email,
            password: self.hasher.hash_password(&new_user.password)?,
            is_admin: false,
        };

        let ttl = self.auth.lifespan(TokenKind::Confirm)?;
        self.pre_users.put(&pre_user, ttl).await?;

        let token = self.auth.generate_confirm_token(pre_user.id).await?;
        self.mail.send_confirm_account(&pre_user.email, &token);

        info!(pre_user_id = %pre_user.id, "Registration awaiting confirmation");
        Ok(())
    }

    /// Promote a pending registration to a user.
    ///
    /// If the pending record cannot be removed afterwards the new user is
    /// deleted again so the registration can be retried.
    pub async fn create(&self, pre_user_id: Uuid) -> AppResult<Uuid> {
        let pre_user = self
            .pre_users
            .get(pre_user_id)
            .await?
            .ok_or_else(AppError::no_awaiting_confirm)?;

        let user_id = self
            .users
            .create(pre_user.clone().into())
            .await
            .map_err(|e| {
                warn!(%pre_user_id, error = %e, "Failed to create user from registration");
                AppError::user_creation()
            })?;

        if let Err(e) = self.pre_users.delete(&pre_user).await {
            warn!(%pre_user_id, error = %e, "Failed to remove registration, rolling back");
            if let Err(e) = self.users.delete(user_id).await {
                warn!(%user_id, error = %e, "Failed to roll back user creation");
            }
            return Err(AppError::user_creation());
        }

        info!(%user_id, "User account confirmed");
        Ok(user_id)
    }

    /// Create a confirmed user directly, skipping the confirm mail.
    pub async fn create_confirmed(&self, new_user: NewUser, is_admin: bool) -> AppResult<Uuid> {
        if self.find_by_email(&new_user.email).await?.is_some() {
            return Err(AppError::email_exists());
        }

        let user_id = self
            .users
            .create(CreateUser {
                name: new_user.name,
                email: new_user.email,
                password: self.hasher.hash_password(&new_user.password)?,
                is_admin,
                language: None,
                theme: None,
            })
            .await?;

        info!(%user_id, is_admin, "User account created");
        Ok(user_id)
    }

    /// Mail a fresh confirm token for a pending registration.
    pub async fn send_confirm_token(&self, email: &str) -> AppResult<()> {
        let pre_user = self
            .pre_users
            .get_by_email(email)
            .await?
            .ok_or_else(AppError::no_awaiting_confirm)?;

        let token = self.auth.generate_confirm_token(pre_user.id).await?;
        self.mail.send_confirm_account(&pre_user.email, &token);
        Ok(())
    }

    pub async fn login(&self, email: &str, password: &str) -> AppResult<TokenPair> {
        let Some(user) = self.find_by_email(email).await? else {
            if self.pre_users.exists_by_email(email).await? {
                return Err(AppError::confirmation_required());
            }
            return Err(AppError::user_not_found());
        };

        if !self.hasher.verify_password(password, &user.password)? {
            return Err(AppError::invalid_password());
        }

        info!(user_id = %user.id, "User logged in");
        self.auth.generate_tokens(&user).await
    }

    /// Close the caller's event channel, if it has one. Tokens stay valid
    /// until they expire or are consumed.
    pub fn logout(&self, user_id: Uuid, channel_id: Option<Uuid>) {
        match channel_id {
            Some(channel_id) => self.events.close_channel(user_id, channel_id),
            None => debug!(%user_id, "Logout without an event channel"),
        }
    }

    pub async fn get_tokens(&self, user_id: Uuid) -> AppResult<TokenPair> {
        let user = self.users.get(user_id).await?;
        self.auth.generate_tokens(&user).await
    }

    pub async fn get(&self, user_id: Uuid) -> AppResult<User> {
        self.users.get(user_id).await
    }

    /// Check `password` against the stored hash.
    pub async fn verify(&self, user_id: Uuid, password: &str) -> AppResult<()> {
        let user = self.users.get(user_id).await?;
        if self.hasher.verify_password(password, &user.password)? {
            Ok(())
        } else {
            Err(AppError::invalid_password())
        }
    }

    pub async fn update(&self, mut update: UpdateUser) -> AppResult<()> {
        if let Some(password) = update.password.take() {
            update.password = Some(self.hasher.hash_password(&password)?);
        }

        let user_id = update.id;
        self.users.update(update).await?;
        self.events.publish_user(EventAction::EntityUpdated, user_id);
        Ok(())
    }

    /// Replace the password after checking the current one. Every refresh
    /// token of the user is revoked.
    pub async fn change_password(
        &self,
        user_id: Uuid,
        current: &str,
        new_password: &str,
    ) -> AppResult<()> {
        self.verify(user_id, current).await?;
        self.users
            .update(UpdateUser {
                id: user_id,
                password: Some(self.hasher.hash_password(new_password)?),
                ..Default::default()
            })
            .await?;
        self.auth.revoke_refresh_tokens(user_id).await?;

        info!(%user_id, "Password changed");
        Ok(())
    }

    pub async fn delete(&self, user_id: Uuid, password: &str) -> AppResult<()> {
        self.verify(user_id, password).await?;
        self.users.delete(user_id).await?;
        self.auth.revoke_refresh_tokens(user_id).await?;

        info!(%user_id, "User deleted");
        Ok(())
    }

    /// Start a password reset and return the subject hash for the client cookie.
    ///
    /// The hash is returned for unknown emails too, so the response does not
    /// reveal whether an account exists.
    pub async fn send_reset_token(&self, email: &str) -> AppResult<String> {
        let subject = Uuid::new_v4();
        let subject_hash = self.auth.hash_reset_subject(subject)?;

        let Some(user) = self.find_by_email(email).await? else {
            debug!("Password reset requested for an unknown email");
            return Ok(subject_hash);
        };

        let token = self.auth.generate_reset_token(subject).await?;
        let ttl = self.auth.lifespan(TokenKind::Reset)?;
        self.actions
            .put(UserAction::ResetPassword, subject, user.id, ttl)
            .await?;
        self.mail.send_password_reset(&user.email, &token);

        info!(user_id = %user.id, "Password reset requested");
        Ok(subject_hash)
    }

    /// Finish a password reset for a verified reset subject.
    ///
    /// The pending action is removed whether or not the reset succeeds.
    pub async fn reset_password(&self, subject: Uuid, password: &str) -> AppResult<()> {
        let result = self.apply_reset(subject, password).await;
        if let Err(e) = self.actions.delete(UserAction::ResetPassword, subject).await {
            warn!(%subject, error = %e, "Failed to remove reset action");
        }
        result
    }

    async fn apply_reset(&self, subject: Uuid, password: &str) -> AppResult<()> {
        let user_id = self
            .actions
            .get(UserAction::ResetPassword, subject)
            .await?
            .ok_or_else(AppError::token_not_found)?;

        self.users
            .update(UpdateUser {
                id: user_id,
                password: Some(self.hasher.hash_password(password)?),
                ..Default::default()
            })
            .await?;
        self.auth.revoke_refresh_tokens(user_id).await?;

        info!(%user_id, "Password reset completed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::test_support::{Harness, harness, token_from};

    fn alice() -> NewUser {
        NewUser {
            name: "alice".into(),
            email: "alice@example.com".into(),
            password: "secret1".into(),
        }
    }

    /// Register alice and confirm her account.
    async fn confirmed(h: &mut Harness) -> Uuid {
        h.users.pre_create(alice()).await.unwrap();
        let token = token_from(&h.outbox.recv().await.unwrap());
        let claims = h.auth.verify_confirm_token(&token).await.unwrap();
        h.users.create(claims.sub).await.unwrap()
    }

    #[tokio::test]
    async fn test_register_confirm_and_login() {
        let mut h = harness();
        let user_id = confirmed(&mut h).await;

        let pair = h.users.login("alice@example.com", "secret1").await.unwrap();
        let claims = h
            .auth
            .verify_token(&pair.access_token, TokenKind::Access)
            .await
            .unwrap();
        assert_eq!(claims.sub, user_id);
    }

    #[tokio::test]
    async fn test_register_rejects_taken_email() {
        let mut h = harness();
        h.users.pre_create(alice()).await.unwrap();
        let err = h.users.pre_create(alice()).await.unwrap_err();
        assert!(err.is(messages::EMAIL_EXISTS));

        let token = token_from(&h.outbox.recv().await.unwrap());
        let claims = h.auth.verify_confirm_token(&token).await.unwrap();
        h.users.create(claims.sub).await.unwrap();

        let err = h.users.pre_create(alice()).await.unwrap_err();
        assert!(err.is(messages::EMAIL_EXISTS));
    }

    #[tokio::test]
    async fn test_login_before_confirmation() {
        let h = harness();
        h.users.pre_create(alice()).await.unwrap();
        let err = h
            .users
            .login("alice@example.com", "secret1")
            .await
            .unwrap_err();
        assert!(err.is(messages::CONFIRMATION_REQUIRED));

        let err = h
            .users
            .login("nobody@example.com", "secret1")
            .await
            .unwrap_err();
        assert!(err.is(messages::USER_NOT_FOUND));
    }

    #[tokio::test]
    async fn test_login_with_wrong_password() {
        let mut h = harness();
        confirmed(&mut h).await;
        let err = h
            .users
            .login("alice@example.com", "wrong-password")
            .await
            .unwrap_err();
        assert!(err.is(messages::INVALID_PASSWORD));
    }

    #[tokio::test]
    async fn test_confirm_is_not_repeatable() {
        let mut h = harness();
        h.users.pre_create(alice()).await.unwrap();
        let token = token_from(&h.outbox.recv().await.unwrap());
        let claims = h.auth.verify_confirm_token(&token).await.unwrap();

        h.users.create(claims.sub).await.unwrap();
        let err = h.users.create(claims.sub).await.unwrap_err();
        assert!(err.is(messages::NO_AWAITING_CONFIRM));
    }

    #[tokio::test]
    async fn test_resend_confirm_token() {
        let mut h = harness();
        let err = h
            .users
            .send_confirm_token("alice@example.com")
            .await
            .unwrap_err();
        assert!(err.is(messages::NO_AWAITING_CONFIRM));

        h.users.pre_create(alice()).await.unwrap();
        h.outbox.recv().await.unwrap();
        h.users.send_confirm_token("alice@example.com").await.unwrap();
        let resent = h.outbox.recv().await.unwrap();
        assert_eq!(resent.to, "alice@example.com");
    }

    #[tokio::test]
    async fn test_change_password_revokes_refresh_tokens() {
        let mut h = harness();
        let user_id = confirmed(&mut h).await;
        let pair = h.users.login("alice@example.com", "secret1").await.unwrap();

        let err = h
            .users
            .change_password(user_id, "bad", "secret2")
            .await
            .unwrap_err();
        assert!(err.is(messages::INVALID_PASSWORD));

        h.users
            .change_password(user_id, "secret1", "secret2")
            .await
            .unwrap();

        let err = h
            .auth
            .verify_token(&pair.refresh_token, TokenKind::Refresh)
            .await
            .unwrap_err();
        assert!(err.is(messages::TOKEN_NOT_FOUND));
        h.users.login("alice@example.com", "secret2").await.unwrap();
    }

    #[tokio::test]
    async fn test_password_reset_flow() {
        let mut h = harness();
        confirmed(&mut h).await;

        let cookie_hash = h.users.send_reset_token("alice@example.com").await.unwrap();
        let token = token_from(&h.outbox.recv().await.unwrap());
        let claims = h.auth.verify_reset_token(&token).await.unwrap();
        h.auth
            .verify_reset_subject(claims.sub, &cookie_hash)
            .unwrap();

        h.users.reset_password(claims.sub, "brand-new").await.unwrap();
        h.users.login("alice@example.com", "brand-new").await.unwrap();

        let err = h
            .users
            .reset_password(claims.sub, "again-new")
            .await
            .unwrap_err();
        assert!(err.is(messages::TOKEN_NOT_FOUND));
    }

    #[tokio::test]
    async fn test_reset_for_unknown_email_still_returns_hash() {
        let mut h = harness();
        let hash = h.users.send_reset_token("ghost@example.com").await.unwrap();
        assert!(!hash.is_empty());
        assert!(h.outbox.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_update_publishes_user_event() {
        let mut h = harness();
        let user_id = confirmed(&mut h).await;
        let mut sub = h.events.subscribe(user_id);

        h.users
            .update(UpdateUser {
                id: user_id,
                theme: Some("dark".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        let event = sub.recv().await.unwrap();
        assert_eq!(event.action(), EventAction::EntityUpdated);
        assert_eq!(h.users.get(user_id).await.unwrap().theme, "dark");
    }

    #[tokio::test]
    async fn test_logout_closes_only_the_given_channel() {
        let mut h = harness();
        let user_id = confirmed(&mut h).await;
        let mut closing = h.events.subscribe(user_id);
        let mut other = h.events.subscribe(user_id);

        h.users.logout(user_id, Some(closing.channel_id()));

        let event = closing.recv().await.unwrap();
        assert_eq!(event.action(), EventAction::ChannelClosed);
        let quiet = tokio::time::timeout(Duration::from_millis(50), other.recv()).await;
        assert!(quiet.is_err());
    }

    #[tokio::test]
    async fn test_delete_requires_password() {
        let mut h = harness();
        let user_id = confirmed(&mut h).await;

        let err = h.users.delete(user_id, "nope").await.unwrap_err();
        assert!(err.is(messages::INVALID_PASSWORD));

        h.users.delete(user_id, "secret1").await.unwrap();
        let err = h.users.get(user_id).await.unwrap_err();
        assert!(err.is(messages::USER_NOT_FOUND));
    }

    #[tokio::test]
    async fn test_create_confirmed_skips_registration() {
        let mut h = harness();
        let user_id = h.users.create_confirmed(alice(), true).await.unwrap();

        let user = h.users.get(user_id).await.unwrap();
        assert!(user.is_admin);
        assert_ne!(user.password, "secret1");
        h.users.login("alice@example.com", "secret1").await.unwrap();
        assert!(h.outbox.try_recv().is_err());

        let err = h.users.create_confirmed(alice(), false).await.unwrap_err();
        assert!(err.is(messages::EMAIL_EXISTS));
    }
}
