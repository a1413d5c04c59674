use crate::error::{AppError, AppResult};
use regex::Regex;
use std::sync::OnceLock;

/// Placeholder the client sends when the student has no second last name.
pub const NO_SECOND_LAST_NAME: &str = "N/A";

fn email_regex() -> &'static Regex {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$").expect("valid email regex")
    })
}

pub fn validate_email(email: &str) -> AppResult<()> {
    if email.len() > 254 || !email_regex().is_match(email) {
        return Err(AppError::ValidationError("Invalid email address".to_string()));
    }
    Ok(())
}

/// Trims and lowercases an email so lookups and unique constraints agree.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Maps the "N/A" sentinel (and blanks) to the empty string stored on users.
pub fn normalize_second_last_name(second_last_name: &str) -> String {
    let trimmed = second_last_name.trim();
    if trimmed.eq_ignore_ascii_case(NO_SECOND_LAST_NAME) {
        String::new()
    } else {
        trimmed.to_string()
    }
}

/// The tuple compared by the duplicate-identity check at registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullName {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub second_last_name: String,
}

impl FullName {
    pub fn new(first: &str, middle: &str, last: &str, second_last: &str) -> Self {
        Self {
            first_name: first.trim().to_string(),
            middle_name: middle.trim().to_string(),
            last_name: last.trim().to_string(),
            second_last_name: normalize_second_last_name(second_last),
        }
    }

    /// Display name: every present name part joined by single spaces.
    pub fn display_name(&self) -> String {
        [
            self.first_name.as_str(),
            self.middle_name.as_str(),
            self.last_name.as_str(),
            self.second_last_name.as_str(),
        ]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
    }
}
