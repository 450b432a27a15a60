use lazy_static::lazy_static;
use rand::{rngs::OsRng, Rng, RngCore};
use regex::Regex;
use sha2::{Digest, Sha256};
use time::Duration;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::RegisterRequest,
        jwt::{JwtKeys, TokenPair},
        password::{hash_password, validate_password, verify_password},
        repo_types::{NewUser, RegistrationType, Role, User},
    },
    config::AdminSeed,
    error::{AppError, AppResult},
    mail::{send_detached, Email},
    state::AppState,
};

pub const OTP_TTL: Duration = Duration::minutes(15);
pub const RESET_TOKEN_TTL: Duration = Duration::hours(1);

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Six decimal digits, uniform over 100000..=999999.
pub(crate) fn generate_otp() -> String {
    OsRng.gen_range(100_000..=999_999u32).to_string()
}

fn generate_reset_token() -> String {
    let mut bytes = [0u8; 20];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub(crate) fn hash_token(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}

fn otp_email(to: &str, name: &str, otp: &str) -> Email {
    Email {
        to: to.to_string(),
        subject: "Verify Your Account".into(),
        text: format!("Dear {name},\n\nYour OTP is: {otp}. It expires in 15 minutes."),
        html: Some(format!(
            "<p>Dear <strong>{name}</strong>,</p><p>Your verification code is</p>\
             <h2>{otp}</h2><p>It is valid for 15 minutes.</p>"
        )),
    }
}

#[instrument(skip(state, req), fields(registration_type = %req.registration_type.as_str()))]
pub async fn register(state: &AppState, req: RegisterRequest) -> AppResult<Uuid> {
    let email = normalize_email(&req.email);
    if !is_valid_email(&email) {
        warn!(%email, "invalid email");
        return Err(AppError::InvalidInput("Invalid email".into()));
    }
    if req.name.trim().is_empty() {
        return Err(AppError::InvalidInput("Name is required".into()));
    }
    validate_password(&req.password)?;

    if state.users.find_by_email(&email).await?.is_some() {
        warn!(%email, "email already registered");
        return Err(AppError::Conflict("User with this email already exists.".into()));
    }

    let now = state.now();
    let (trial_expires_at, is_paid) = req.registration_type.entitlement_defaults(now);
    let otp = generate_otp();

    let user = state
        .users
        .create(NewUser {
            name: req.name.trim().to_string(),
            email,
            phone: req.phone,
            gender: req.gender,
            course: req.course,
            message: req.message,
            password_hash: hash_password(&req.password)?,
            role: Role::User,
            is_verified: false,
            otp: Some(otp.clone()),
            otp_expiry: Some(now + OTP_TTL),
            registration_type: req.registration_type,
            trial_expires_at,
            is_paid,
        })
        .await?;

    send_detached(state.mailer.clone(), otp_email(&user.email, &user.name, &otp));

    info!(user_id = %user.id, "user registered");
    Ok(user.id)
}

#[instrument(skip(state, otp))]
pub async fn verify_otp(state: &AppState, email: &str, otp: &str) -> AppResult<()> {
    let email = normalize_email(email);
    let mut user = state
        .users
        .find_by_valid_otp(&email, otp.trim(), state.now())
        .await?
        .ok_or_else(|| AppError::InvalidOrExpired("Invalid or expired OTP.".into()))?;

    user.mark_verified();
    state.users.save(&user).await?;

    info!(user_id = %user.id, "account verified");
    Ok(())
}

#[instrument(skip(state, password))]
pub async fn login(state: &AppState, email: &str, password: &str) -> AppResult<(User, TokenPair)> {
    let email = normalize_email(email);
    let user = state
        .users
        .find_by_email(&email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found.".into()))?;

    if !verify_password(password, user.password_hash())? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::Unauthorized("Invalid credentials.".into()));
    }
    if !user.is_verified {
        warn!(user_id = %user.id, "login before verification");
        return Err(AppError::Unauthorized("Verify your email before logging in.".into()));
    }
    if user.is_blocked {
        warn!(user_id = %user.id, "login by blocked account");
        return Err(AppError::Forbidden("Account is blocked.".into()));
    }

    let keys = JwtKeys::from(&state.config.jwt);
    let tokens = keys.issue(state.users.as_ref(), &user).await?;

    info!(user_id = %user.id, "user logged in");
    Ok((user, tokens))
}

/// Rotates the session. Concurrent calls with the same token race; the last
/// persisted token wins and the other becomes unusable.
#[instrument(skip(state, incoming))]
pub async fn refresh(state: &AppState, incoming: Option<String>) -> AppResult<TokenPair> {
    let incoming = incoming
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthenticated("Refresh token missing.".into()))?;

    let keys = JwtKeys::from(&state.config.jwt);
    let claims = keys
        .verify_refresh(&incoming)
        .map_err(|_| AppError::Unauthenticated("Invalid refresh token.".into()))?;

    let user = state
        .users
        .find_by_id(claims.sub)
        .await?
        .filter(|u| u.refresh_token.as_deref() == Some(incoming.as_str()))
        .ok_or_else(|| {
            warn!(user_id = %claims.sub, "stale or unknown refresh token");
            AppError::Unauthenticated("Invalid refresh token.".into())
        })?;

    if user.is_blocked {
        return Err(AppError::Forbidden("Account is blocked.".into()));
    }

    let tokens = keys.issue(state.users.as_ref(), &user).await?;
    info!(user_id = %user.id, "session refreshed");
    Ok(tokens)
}

#[instrument(skip(state))]
pub async fn forgot_password(state: &AppState, email: &str) -> AppResult<()> {
    let email = normalize_email(email);
    let mut user = state
        .users
        .find_by_email(&email)
        .await?
        .ok_or_else(|| AppError::NotFound("Email not registered.".into()))?;

    let raw = generate_reset_token();
    user.forgot_password_token = Some(hash_token(&raw));
    user.forgot_password_expiry = Some(state.now() + RESET_TOKEN_TTL);
    state.users.save(&user).await?;

    state
        .mailer
        .send(Email {
            to: user.email.clone(),
            subject: "Password Reset Request".into(),
            text: format!("Your reset token is: {raw}\nIt expires in 1 hour."),
            html: None,
        })
        .await?;

    info!(user_id = %user.id, "password reset requested");
    Ok(())
}

/// Consumes a reset token: single use, expiry checked, revokes the session.
#[instrument(skip(state, token, new_password))]
pub async fn reset_password(state: &AppState, token: &str, new_password: &str) -> AppResult<()> {
    validate_password(new_password)?;

    let mut user = state
        .users
        .find_by_reset_token(&hash_token(token.trim()), state.now())
        .await?
        .ok_or_else(|| AppError::InvalidOrExpired("Invalid or expired reset token.".into()))?;

    user.set_password(new_password)?;
    user.forgot_password_token = None;
    user.forgot_password_expiry = None;
    state.users.save(&user).await?;
    state.users.set_refresh_token(user.id, None).await?;

    info!(user_id = %user.id, "password reset completed");
    Ok(())
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn logout(state: &AppState, user: &User) -> AppResult<()> {
    state.users.set_refresh_token(user.id, None).await?;
    info!("user logged out");
    Ok(())
}

#[instrument(skip(state, user, old_password, new_password), fields(user_id = %user.id))]
pub async fn change_password(
    state: &AppState,
    user: &User,
    old_password: &str,
    new_password: &str,
) -> AppResult<()> {
    if !verify_password(old_password, user.password_hash())? {
        return Err(AppError::Unauthorized("Old password is incorrect.".into()));
    }
    validate_password(new_password)?;

    let mut user = user.clone();
    user.set_password(new_password)?;
    state.users.save(&user).await?;
    info!("password changed");
    Ok(())
}

/// Creates the configured admin account if its email is free.
pub async fn seed_admin(state: &AppState, seed: &AdminSeed) -> AppResult<()> {
    let email = normalize_email(&seed.email);
    if state.users.find_by_email(&email).await?.is_some() {
        return Ok(());
    }
    validate_password(&seed.password)?;
    let user = state
        .users
        .create(NewUser {
            name: seed.name.clone(),
            email,
            phone: String::new(),
            gender: None,
            course: None,
            message: None,
            password_hash: hash_password(&seed.password)?,
            role: Role::Admin,
            is_verified: true,
            otp: None,
            otp_expiry: None,
            registration_type: RegistrationType::Register,
            trial_expires_at: None,
            is_paid: false,
        })
        .await?;
    info!(user_id = %user.id, "admin account seeded");
    Ok(())
}
