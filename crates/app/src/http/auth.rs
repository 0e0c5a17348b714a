//! Request authentication extractors.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::{auth::models::AuthenticatedUser, context::AppContext, http::error::ApiError};

/// Any authenticated account, resolved from the `Authorization` header.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub AuthenticatedUser);

/// An authenticated account with the ADMIN role.
#[derive(Debug, Clone, Copy)]
pub struct AdminUser(pub AuthenticatedUser);

fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::unauthorized("missing bearer token"))
}

#[async_trait]
impl FromRequestParts<AppContext> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        context: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;

        let identity = context.auth.authenticate_bearer(token).await?;

        Ok(Self(identity))
    }
}

#[async_trait]
impl FromRequestParts<AppContext> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        context: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(identity) = CurrentUser::from_request_parts(parts, context).await?;

        if !identity.is_admin() {
            return Err(ApiError::forbidden("admin role required"));
        }

        Ok(Self(identity))
    }
}
