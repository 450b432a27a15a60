use serde::Deserialize;

use crate::auth::services::is_valid_email;
use crate::error::{AppError, AppResult};
use crate::mail::Email;

#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct TrialRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub course: String,
    pub gender: Option<String>,
    pub message: Option<String>,
}

fn require_all(fields: &[&str]) -> AppResult<()> {
    if fields.iter().any(|f| f.trim().is_empty()) {
        return Err(AppError::InvalidInput("All fields are required.".into()));
    }
    Ok(())
}

fn require_email(email: &str) -> AppResult<()> {
    if !is_valid_email(email.trim()) {
        return Err(AppError::InvalidInput("Invalid email format.".into()));
    }
    Ok(())
}

impl ContactRequest {
    pub fn validate(&self) -> AppResult<()> {
        require_all(&[&self.name, &self.phone, &self.email, &self.message])?;
        require_email(&self.email)
    }

    pub fn notification(&self, to: &str) -> Email {
        Email {
            to: to.to_string(),
            subject: format!("New contact message from {}", self.name.trim()),
            text: format!(
                "Name: {}\nEmail: {}\nPhone: {}\n\n{}",
                self.name.trim(),
                self.email.trim(),
                self.phone.trim(),
                self.message.trim()
            ),
            html: None,
        }
    }
}

impl TrialRequest {
    pub fn validate(&self) -> AppResult<()> {
        require_all(&[&self.name, &self.email, &self.phone, &self.course])?;
        require_email(&self.email)
    }

    pub fn notification(&self, to: &str) -> Email {
        Email {
            to: to.to_string(),
            subject: format!("Free trial request: {}", self.course.trim()),
            text: format!(
                "Name: {}\nEmail: {}\nPhone: {}\nCourse: {}\nGender: {}\n\n{}",
                self.name.trim(),
                self.email.trim(),
                self.phone.trim(),
                self.course.trim(),
                self.gender.as_deref().unwrap_or("-"),
                self.message.as_deref().unwrap_or_default()
            ),
            html: None,
        }
    }
}
