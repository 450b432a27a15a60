use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::CookieJar;
use tracing::warn;

use crate::{
    auth::{
        jwt::JwtKeys,
        repo_types::{Role, User},
    },
    error::AppError,
    state::AppState,
};

pub const ACCESS_COOKIE: &str = "accessToken";
pub const REFRESH_COOKIE: &str = "refreshToken";

/// Request context resolved by the gate and handed to the handler.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user: User,
}

/// Any authenticated, unblocked account.
pub struct CurrentUser(pub AuthContext);

/// An authenticated account with the admin role.
pub struct AdminUser(pub AuthContext);

fn bearer_token(parts: &Parts) -> Option<String> {
    let header = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?;
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .map(|t| t.trim().to_string())
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(ACCESS_COOKIE)
            .map(|c| c.value().to_string())
            .filter(|t| !t.is_empty())
            .or_else(|| bearer_token(parts))
            .ok_or_else(|| AppError::Unauthenticated("Unauthorized request.".into()))?;

        let claims = JwtKeys::from_ref(state).verify_access(&token).map_err(|e| {
            warn!("invalid or expired access token");
            e
        })?;

        let user = state
            .users
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| AppError::Unauthenticated("Invalid access token.".into()))?;

        if user.is_blocked {
            return Err(AppError::Forbidden("Account is blocked.".into()));
        }

        Ok(CurrentUser(AuthContext { user }))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(ctx) = CurrentUser::from_request_parts(parts, state).await?;
        if ctx.user.role != Role::Admin {
            warn!(user_id = %ctx.user.id, "non-admin on admin route");
            return Err(AppError::Forbidden("Admin access required.".into()));
        }
        Ok(AdminUser(ctx))
    }
}
