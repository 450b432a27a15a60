use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::{NewUser, Role, User, UserSummary};
use crate::db::PgStore;
use crate::error::AppResult;

/// Credential store. Implementations must treat `email` as already normalized.
#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Fails with `Conflict` if the email is taken.
    async fn create(&self, new: NewUser) -> AppResult<User>;
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;
    /// Matches email, otp and an unexpired `otp_expiry` in one lookup.
    async fn find_by_valid_otp(
        &self,
        email: &str,
        otp: &str,
        now: OffsetDateTime,
    ) -> AppResult<Option<User>>;
    async fn find_by_reset_token(
        &self,
        token_hash: &str,
        now: OffsetDateTime,
    ) -> AppResult<Option<User>>;
    /// Persists every mutable column except `refresh_token`, which only
    /// `set_refresh_token` writes.
    async fn save(&self, user: &User) -> AppResult<()>;
    async fn set_refresh_token(&self, id: Uuid, token: Option<&str>) -> AppResult<()>;
    async fn list_by_role(&self, role: Role) -> AppResult<Vec<User>>;
    async fn summary(&self, now: OffsetDateTime) -> AppResult<UserSummary>;
}

const USER_COLUMNS: &str = r#"
    id, name, email, phone, gender, course, message, password_hash, role,
    is_verified, otp, otp_expiry, refresh_token, forgot_password_token,
    forgot_password_expiry, registration_type, trial_expires_at, is_paid,
    is_blocked, created_at, updated_at
"#;

#[async_trait]
impl UserRepo for PgStore {
    async fn create(&self, new: NewUser) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, email, phone, gender, course, message, password_hash,
                               role, is_verified, otp, otp_expiry, registration_type,
                               trial_expires_at, is_paid)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.phone)
        .bind(&new.gender)
        .bind(&new.course)
        .bind(&new.message)
        .bind(&new.password_hash)
        .bind(new.role)
        .bind(new.is_verified)
        .bind(&new.otp)
        .bind(new.otp_expiry)
        .bind(new.registration_type.as_str())
        .bind(new.trial_expires_at)
        .bind(new.is_paid)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_valid_otp(
        &self,
        email: &str,
        otp: &str,
        now: OffsetDateTime,
    ) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1 AND otp = $2 AND otp_expiry > $3"
        ))
        .bind(email)
        .bind(otp)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_reset_token(
        &self,
        token_hash: &str,
        now: OffsetDateTime,
    ) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS} FROM users
            WHERE forgot_password_token = $1 AND forgot_password_expiry > $2
            "#
        ))
        .bind(token_hash)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn save(&self, user: &User) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE users SET
                name = $2, phone = $3, gender = $4, course = $5, message = $6,
                password_hash = $7, is_verified = $8, otp = $9, otp_expiry = $10,
                forgot_password_token = $11, forgot_password_expiry = $12,
                trial_expires_at = $13, is_paid = $14, is_blocked = $15,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.phone)
        .bind(&user.gender)
        .bind(&user.course)
        .bind(&user.message)
        .bind(user.password_hash())
        .bind(user.is_verified)
        .bind(&user.otp)
        .bind(user.otp_expiry)
        .bind(&user.forgot_password_token)
        .bind(user.forgot_password_expiry)
        .bind(user.trial_expires_at)
        .bind(user.is_paid)
        .bind(user.is_blocked)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn set_refresh_token(&self, id: Uuid, token: Option<&str>) -> AppResult<()> {
        sqlx::query("UPDATE users SET refresh_token = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_by_role(&self, role: Role) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE role = $1 ORDER BY created_at DESC"
        ))
        .bind(role)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn summary(&self, now: OffsetDateTime) -> AppResult<UserSummary> {
        let (total_users, paid_users, blocked_users, active_trials) =
            sqlx::query_as::<_, (i64, i64, i64, i64)>(
                r#"
                SELECT
                    COUNT(*) FILTER (WHERE role = 'user'),
                    COUNT(*) FILTER (WHERE role = 'user' AND is_paid),
                    COUNT(*) FILTER (WHERE role = 'user' AND is_blocked),
                    COUNT(*) FILTER (WHERE registration_type = 'form' AND trial_expires_at > $1)
                FROM users
                "#,
            )
            .bind(now)
            .fetch_one(&self.pool)
            .await?;
        Ok(UserSummary {
            total_users,
            paid_users,
            blocked_users,
            active_trials,
        })
    }
}
