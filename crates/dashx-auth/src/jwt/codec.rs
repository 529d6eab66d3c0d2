//! Signing and verification with one key per token kind.

use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use dashx_core::config::AuthConfig;
use dashx_core::error::AppError;

use super::claims::{Claims, TokenKind};

/// Keys and lifespan of one token kind.
#[derive(Clone)]
struct KindKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifespan: Duration,
}

/// Signs and verifies tokens, looking up secret and lifespan by kind.
#[derive(Clone)]
pub struct JwtCodec {
    keys: HashMap<TokenKind, KindKeys>,
    validation: Validation,
}

impl std::fmt::Debug for JwtCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lifespans: HashMap<_, _> = self.keys.iter().map(|(k, v)| (*k, v.lifespan)).collect();
        f.debug_struct("JwtCodec")
            .field("lifespans", &lifespans)
            .finish()
    }
}

impl JwtCodec {
    pub fn new(config: &AuthConfig) -> Self {
        let table = [
            (TokenKind::Access, config.access.secret.as_str(), config.access.lifespan()),
            (TokenKind::Refresh, config.refresh.secret.as_str(), config.refresh.lifespan()),
            (TokenKind::Confirm, config.confirm.secret.as_str(), config.confirm.lifespan()),
            (TokenKind::Reset, config.reset.secret.as_str(), config.reset.lifespan()),
        ];

        let keys = table
            .into_iter()
            .map(|(kind, secret, lifespan)| {
                let keys = KindKeys {
                    encoding: EncodingKey::from_secret(secret.as_bytes()),
                    decoding: DecodingKey::from_secret(secret.as_bytes()),
                    lifespan,
                };
                (kind, keys)
            })
            .collect();

        // Expiry is exact: a token is dead at `iat + lifespan`.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self { keys, validation }
    }

    fn keys(&self, kind: TokenKind) -> Result<&KindKeys, AppError> {
        self.keys
            .get(&kind)
            .ok_or_else(|| AppError::internal(format!("No signing key for {kind} tokens")))
    }

    pub fn lifespan(&self, kind: TokenKind) -> Result<Duration, AppError> {
        Ok(self.keys(kind)?.lifespan)
    }

    /// Sign a fresh token of `kind` for `subject`.
    pub fn sign(
        &self,
        kind: TokenKind,
        subject: Uuid,
        is_admin: bool,
    ) -> Result<(String, Claims), AppError> {
        let keys = self.keys(kind)?;
        let iat = Utc::now().timestamp();
        let claims = Claims {
            sub: subject,
            jti: Uuid::new_v4(),
            iat,
            exp: iat + keys.lifespan.as_secs() as i64,
            is_admin,
            kind,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)
            .map_err(|e| AppError::internal(format!("Failed to encode {kind} token: {e}")))?;

        Ok((token, claims))
    }

    /// Check signature, expiry and kind. The error message names the cause;
    /// it is meant for logs, not for clients.
    pub fn verify(&self, kind: TokenKind, token: &str) -> Result<Claims, AppError> {
        let keys = self.keys(kind)?;
        let data = decode::<Claims>(token, &keys.decoding, &self.validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::authentication(format!("{kind} token has expired"))
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AppError::authentication(format!("Invalid {kind} token signature"))
                }
                _ => AppError::authentication(format!("{kind} token validation failed: {e}")),
            }
        })?;

        if data.claims.kind != kind {
            return Err(AppError::authentication(format!(
                "Expected {kind} token, got {}",
                data.claims.kind
            )));
        }

        Ok(data.claims)
    }
}
