use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::auth::password::hash_password;
use crate::error::AppResult;

/// Trial window granted to `form` registrations.
pub const TRIAL_PERIOD: Duration = Duration::days(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// How the account was created; decides trial and payment defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RegistrationType {
    Form,
    Register,
    Plan,
    Other(String),
}

impl RegistrationType {
    pub fn as_str(&self) -> &str {
        match self {
            RegistrationType::Form => "form",
            RegistrationType::Register => "register",
            RegistrationType::Plan => "plan",
            RegistrationType::Other(s) => s,
        }
    }

    /// `(trial_expires_at, is_paid)` for a new account created at `now`.
    pub fn entitlement_defaults(&self, now: OffsetDateTime) -> (Option<OffsetDateTime>, bool) {
        match self {
            RegistrationType::Form => (Some(now + TRIAL_PERIOD), false),
            RegistrationType::Register => (None, false),
            RegistrationType::Plan | RegistrationType::Other(_) => (None, true),
        }
    }
}

impl From<String> for RegistrationType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "form" => RegistrationType::Form,
            "register" => RegistrationType::Register,
            "plan" => RegistrationType::Plan,
            _ => RegistrationType::Other(s),
        }
    }
}

impl From<RegistrationType> for String {
    fn from(r: RegistrationType) -> Self {
        r.as_str().to_string()
    }
}

/// Entitlement of a non-admin account. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessTier {
    Paid,
    Trial,
    Registered,
}

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub gender: Option<String>,
    pub course: Option<String>,
    pub message: Option<String>,
    password_hash: String,
    pub role: Role,
    pub is_verified: bool,
    pub otp: Option<String>,
    pub otp_expiry: Option<OffsetDateTime>,
    pub refresh_token: Option<String>,
    pub forgot_password_token: Option<String>,
    pub forgot_password_expiry: Option<OffsetDateTime>,
    #[sqlx(try_from = "String")]
    pub registration_type: RegistrationType,
    pub trial_expires_at: Option<OffsetDateTime>,
    pub is_paid: bool,
    pub is_blocked: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl User {
    /// Materializes a row for a freshly inserted account. Used by stores
    /// that do not round-trip through SQL.
    pub fn from_new(id: Uuid, new: NewUser, now: OffsetDateTime) -> Self {
        Self {
            id,
            name: new.name,
            email: new.email,
            phone: new.phone,
            gender: new.gender,
            course: new.course,
            message: new.message,
            password_hash: new.password_hash,
            role: new.role,
            is_verified: new.is_verified,
            otp: new.otp,
            otp_expiry: new.otp_expiry,
            refresh_token: None,
            forgot_password_token: None,
            forgot_password_expiry: None,
            registration_type: new.registration_type,
            trial_expires_at: new.trial_expires_at,
            is_paid: new.is_paid,
            is_blocked: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    /// Replaces the stored credential. The plain password is hashed here,
    /// so `save` only ever persists an already-hashed value.
    pub fn set_password(&mut self, plain: &str) -> AppResult<()> {
        self.password_hash = hash_password(plain)?;
        Ok(())
    }

    pub fn mark_verified(&mut self) {
        self.is_verified = true;
        self.otp = None;
        self.otp_expiry = None;
    }

    pub fn set_paid(&mut self, paid: bool) {
        self.is_paid = paid;
        if paid {
            self.trial_expires_at = None;
        }
    }

    pub fn trial_active(&self, now: OffsetDateTime) -> bool {
        self.registration_type == RegistrationType::Form
            && self.trial_expires_at.is_some_and(|t| t > now)
    }

    pub fn access_tier(&self, now: OffsetDateTime) -> AccessTier {
        if self.is_paid {
            AccessTier::Paid
        } else if self.trial_active(now) {
            AccessTier::Trial
        } else {
            AccessTier::Registered
        }
    }

    /// Whole days left in the trial, rounded up, never negative.
    pub fn trial_days_remaining(&self, now: OffsetDateTime) -> i64 {
        match (&self.registration_type, self.trial_expires_at) {
            (RegistrationType::Form, Some(expires)) => {
                let secs = (expires - now).whole_seconds();
                if secs <= 0 {
                    0
                } else {
                    (secs + 86_399) / 86_400
                }
            }
            _ => 0,
        }
    }
}

/// Insert payload; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub gender: Option<String>,
    pub course: Option<String>,
    pub message: Option<String>,
    pub password_hash: String,
    pub role: Role,
    pub is_verified: bool,
    pub otp: Option<String>,
    pub otp_expiry: Option<OffsetDateTime>,
    pub registration_type: RegistrationType,
    pub trial_expires_at: Option<OffsetDateTime>,
    pub is_paid: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub total_users: i64,
    pub paid_users: i64,
    pub blocked_users: i64,
    pub active_trials: i64,
}
