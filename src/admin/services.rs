use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    admin::dto::{AddProgressRequest, Analytics, UpdateProfileRequest, RECENT_ACTIVITY_LIMIT},
    auth::repo_types::{Role, User},
    error::{AppError, AppResult},
    progress::repo_types::{NewProgress, Progress},
    state::AppState,
};

async fn load_user(state: &AppState, id: Uuid) -> AppResult<User> {
    state
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found.".into()))
}

pub async fn analytics(state: &AppState) -> AppResult<Analytics> {
    let summary = state.users.summary(state.now()).await?;
    let recent_activity = state.progress.recent(RECENT_ACTIVITY_LIMIT).await?;
    Ok(Analytics {
        summary,
        recent_activity,
    })
}

pub async fn list_students(state: &AppState) -> AppResult<Vec<User>> {
    state.users.list_by_role(Role::User).await
}

pub async fn get_user(state: &AppState, id: Uuid) -> AppResult<User> {
    load_user(state, id).await
}

/// Flips `is_blocked`. Blocking also drops the stored refresh token.
#[instrument(skip(state))]
pub async fn toggle_block(state: &AppState, id: Uuid) -> AppResult<User> {
    let mut user = load_user(state, id).await?;
    user.is_blocked = !user.is_blocked;
    state.users.save(&user).await?;
    if user.is_blocked {
        state.users.set_refresh_token(id, None).await?;
        user.refresh_token = None;
    }
    info!(user_id = %id, blocked = user.is_blocked, "block status changed");
    Ok(user)
}

#[instrument(skip(state))]
pub async fn set_payment(state: &AppState, id: Uuid, is_paid: bool) -> AppResult<User> {
    let mut user = load_user(state, id).await?;
    user.set_paid(is_paid);
    state.users.save(&user).await?;
    info!(user_id = %id, is_paid, "payment status changed");
    Ok(user)
}

pub async fn user_progress(state: &AppState, id: Uuid) -> AppResult<Vec<Progress>> {
    load_user(state, id).await?;
    state.progress.list_for_user(id).await
}

#[instrument(skip(state, admin, req), fields(admin_id = %admin.id))]
pub async fn add_progress(
    state: &AppState,
    admin: &User,
    user_id: Uuid,
    req: AddProgressRequest,
) -> AppResult<Progress> {
    load_user(state, user_id).await?;
    let row = state
        .progress
        .create(NewProgress {
            user_id,
            added_by: Some(admin.id),
            date: req.date.unwrap_or_else(|| state.now()),
            status: req.status,
            timing: req.timing,
            lesson: req.lesson,
            performance: req.performance,
            remarks: req.remarks,
        })
        .await?;
    info!(%user_id, progress_id = %row.id, "progress recorded");
    Ok(row)
}

pub async fn update_profile(
    state: &AppState,
    admin: &User,
    req: UpdateProfileRequest,
) -> AppResult<User> {
    let mut user = load_user(state, admin.id).await?;
    if let Some(name) = req.name.map(|n| n.trim().to_string()) {
        if name.is_empty() {
            return Err(AppError::InvalidInput("Name cannot be empty.".into()));
        }
        user.name = name;
    }
    if let Some(phone) = req.phone {
        user.phone = phone.trim().to_string();
    }
    state.users.save(&user).await?;
    Ok(user)
}
