use tracing::debug;

use crate::{
    auth::repo_types::User,
    error::AppResult,
    progress::repo_types::{Progress, ProgressStatus},
    state::AppState,
    users::dto::{Dashboard, DashboardProfile, DashboardStats},
};

/// Share of `present` records, two decimals with a `%` suffix.
pub fn attendance_percentage(records: &[Progress]) -> String {
    if records.is_empty() {
        return "0%".to_string();
    }
    let present = records
        .iter()
        .filter(|p| p.status == ProgressStatus::Present)
        .count();
    format!("{:.2}%", present as f64 / records.len() as f64 * 100.0)
}

pub async fn dashboard(state: &AppState, user: &User) -> AppResult<Dashboard> {
    let now = state.now();
    let history = state.progress.list_for_user(user.id).await?;
    debug!(user_id = %user.id, records = history.len(), "dashboard loaded");

    Ok(Dashboard {
        profile: DashboardProfile {
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            course: user.course.clone(),
            registration_type: user.registration_type.clone(),
            is_paid: user.is_paid,
            access_tier: user.access_tier(now),
        },
        stats: DashboardStats {
            trial_days_remaining: user.trial_days_remaining(now),
            attendance_percentage: attendance_percentage(&history),
            total_classes: history.len(),
        },
        progress_history: history,
    })
}
