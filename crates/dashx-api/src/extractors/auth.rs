//! Identity extractors. Each pulls the token from the `Authorization`
//! header and verifies it with the kind its route requires.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;
use uuid::Uuid;

use dashx_auth::{Claims, TokenKind};
use dashx_core::error::{AppError, ErrorKind};
use dashx_entity::user::User;

use crate::cookies::{RESET_COOKIE, clear_reset_cookie};
use crate::error::ApiError;
use crate::state::AppState;

/// Token from an `Authorization: <scheme> <token>` header.
///
/// The header must hold exactly two space-separated parts with a
/// non-empty token.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(AppError::missing_auth_token)?;

    let mut parts = header.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(_scheme), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(AppError::missing_auth_token()),
    }
}

/// Verify the request token as `kind`, collapsing verification failures
/// into the generic unauthorized error.
async fn verify(parts: &Parts, state: &AppState, kind: TokenKind) -> Result<Claims, AppError> {
    let token = bearer_token(&parts.headers)?;
    state.auth.verify_token(token, kind).await.map_err(mask)
}

fn mask(err: AppError) -> AppError {
    if err.kind == ErrorKind::Authentication {
        tracing::debug!(reason = %err.message, "Token rejected");
        AppError::unauthorized()
    } else {
        err
    }
}

/// The user behind a valid access token.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = verify(parts, state, TokenKind::Access).await?;
        let user = state.user_service.get(claims.sub).await?;
        Ok(Self(user))
    }
}

/// The user behind a refresh token. The token is consumed.
#[derive(Debug, Clone)]
pub struct RefreshUser(pub User);

impl FromRequestParts<AppState> for RefreshUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = verify(parts, state, TokenKind::Refresh).await?;
        let user = state.user_service.get(claims.sub).await?;
        Ok(Self(user))
    }
}

/// Pre-user id from a confirm token.
#[derive(Debug, Clone, Copy)]
pub struct ConfirmSubject(pub Uuid);

impl FromRequestParts<AppState> for ConfirmSubject {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = verify(parts, state, TokenKind::Confirm).await?;
        Ok(Self(claims.sub))
    }
}

/// Reset subject proven by both the reset token and the `rps` cookie.
///
/// A rejection also clears the cookie.
#[derive(Debug, Clone, Copy)]
pub struct ResetSubject(pub Uuid);

impl ResetSubject {
    async fn resolve(parts: &Parts, state: &AppState) -> Result<Uuid, AppError> {
        let jar = CookieJar::from_headers(&parts.headers);
        let cookie_hash = jar
            .get(RESET_COOKIE)
            .map(|c| c.value().to_string())
            .ok_or_else(|| mask(AppError::authentication("Reset subject cookie is missing")))?;

        let claims = verify(parts, state, TokenKind::Reset).await?;
        state
            .auth
            .verify_reset_subject(claims.sub, &cookie_hash)
            .map_err(mask)?;
        Ok(claims.sub)
    }
}

impl FromRequestParts<AppState> for ResetSubject {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match Self::resolve(parts, state).await {
            Ok(subject) => Ok(Self(subject)),
            Err(err) => {
                let jar = clear_reset_cookie(CookieJar::new(), &state.config.server);
                Err((jar, ApiError(err)).into_response())
            }
        }
    }
}
