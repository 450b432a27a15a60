use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "progress_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    Present,
    Absent,
    Late,
    Active,
    Inactive,
    Completed,
    Hold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "progress_performance", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Performance {
    Excellent,
    Good,
    Average,
    BelowAverage,
    Poor,
    Improving,
    NeedsWork,
}

/// Attendance/progress entry recorded by an admin for one user.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub id: Uuid,
    pub user_id: Uuid,
    pub added_by: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub status: ProgressStatus,
    pub timing: Option<String>,
    pub lesson: Option<String>,
    pub performance: Option<Performance>,
    pub remarks: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewProgress {
    pub user_id: Uuid,
    pub added_by: Option<Uuid>,
    pub date: OffsetDateTime,
    pub status: ProgressStatus,
    pub timing: Option<String>,
    pub lesson: Option<String>,
    pub performance: Option<Performance>,
    pub remarks: Option<String>,
}

/// A progress entry joined with its owner's name and email.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RecentProgress {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub progress: Progress,
    pub user_name: String,
    pub user_email: String,
}
