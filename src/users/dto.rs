use serde::Serialize;

use crate::auth::repo_types::{AccessTier, RegistrationType};
use crate::progress::repo_types::Progress;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardProfile {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub course: Option<String>,
    pub registration_type: RegistrationType,
    pub is_paid: bool,
    pub access_tier: AccessTier,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub trial_days_remaining: i64,
    /// e.g. `"66.67%"`.
    pub attendance_percentage: String,
    pub total_classes: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub profile: DashboardProfile,
    pub stats: DashboardStats,
    pub progress_history: Vec<Progress>,
}
