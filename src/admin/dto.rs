use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::auth::repo_types::UserSummary;
use crate::progress::repo_types::{Performance, ProgressStatus, RecentProgress};

pub const RECENT_ACTIVITY_LIMIT: i64 = 10;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub summary: UserSummary,
    pub recent_activity: Vec<RecentProgress>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub is_paid: bool,
}

/// New attendance entry; `date` defaults to now.
#[derive(Debug, Deserialize)]
pub struct AddProgressRequest {
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub date: Option<OffsetDateTime>,
    pub status: ProgressStatus,
    pub timing: Option<String>,
    pub lesson: Option<String>,
    pub performance: Option<Performance>,
    pub remarks: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}
