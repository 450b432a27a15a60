use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration, OffsetDateTime};
use tracing::{debug, error};
use uuid::Uuid;

use crate::{
    auth::{
        claims::{Claims, TokenKind},
        repo::UserRepo,
        repo_types::{Role, User},
    },
    config::JwtConfig,
    error::{AppError, AppResult},
    state::AppState,
};

/// Holds JWT signing and verification keys with config data.
#[derive(Clone)]
pub struct JwtKeys {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl From<&JwtConfig> for JwtKeys {
    fn from(cfg: &JwtConfig) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(cfg.access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(cfg.access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(cfg.refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(cfg.refresh_secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            access_ttl: Duration::minutes(cfg.ttl_minutes),
            refresh_ttl: Duration::minutes(cfg.refresh_ttl_minutes),
        }
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        JwtKeys::from(&state.config.jwt)
    }
}

impl JwtKeys {
    fn sign_with_kind(
        &self,
        user_id: Uuid,
        kind: TokenKind,
        role: Option<Role>,
    ) -> AppResult<String> {
        let now = OffsetDateTime::now_utc();
        let (ttl, key) = match kind {
            TokenKind::Access => (self.access_ttl, &self.access_encoding),
            TokenKind::Refresh => (self.refresh_ttl, &self.refresh_encoding),
        };
        let exp = now + ttl;
        let claims = Claims {
            sub: user_id,
            jti: Uuid::new_v4(),
            iat: now.unix_timestamp().max(0) as usize,
            exp: exp.unix_timestamp().max(0) as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            kind,
            role,
        };
        let token = encode(&Header::default(), &claims, key).map_err(|e| {
            error!(error = %e, kind = ?kind, "jwt sign failed");
            AppError::Internal(e.to_string())
        })?;
        debug!(user_id = %user_id, kind = ?kind, "jwt signed");
        Ok(token)
    }

    pub fn sign_access(&self, user_id: Uuid, role: Role) -> AppResult<String> {
        self.sign_with_kind(user_id, TokenKind::Access, Some(role))
    }

    pub fn sign_refresh(&self, user_id: Uuid) -> AppResult<String> {
        self.sign_with_kind(user_id, TokenKind::Refresh, None)
    }

    fn verify_with_kind(&self, token: &str, kind: TokenKind) -> AppResult<Claims> {
        let key = match kind {
            TokenKind::Access => &self.access_decoding,
            TokenKind::Refresh => &self.refresh_decoding,
        };
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, key, &validation)
            .map_err(|_| AppError::Unauthenticated("Invalid or expired token.".into()))?;
        if data.claims.kind != kind {
            return Err(AppError::Unauthenticated("Invalid or expired token.".into()));
        }
        debug!(user_id = %data.claims.sub, kind = ?kind, "jwt verified");
        Ok(data.claims)
    }

    pub fn verify_access(&self, token: &str) -> AppResult<Claims> {
        self.verify_with_kind(token, TokenKind::Access)
    }

    /// Signature and expiry only; the caller must compare against the stored token.
    pub fn verify_refresh(&self, token: &str) -> AppResult<Claims> {
        self.verify_with_kind(token, TokenKind::Refresh)
    }

    /// Mints a fresh pair and makes its refresh token the account's only valid one.
    pub async fn issue(&self, users: &dyn UserRepo, user: &User) -> AppResult<TokenPair> {
        let access_token = self.sign_access(user.id, user.role)?;
        let refresh_token = self.sign_refresh(user.id)?;
        users.set_refresh_token(user.id, Some(&refresh_token)).await?;
        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }
}
