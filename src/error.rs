use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use sea_orm::{DbErr, SqlErr};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Auth error: {0}")]
    AuthError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Expired: {0}")]
    Expired(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("External API error: {0}")]
    ExternalApiError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("HTTP request error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

impl AppError {
    /// Translates a store-level unique violation into `Conflict`, leaving
    /// every other database error untouched.
    pub fn from_db_unique(err: DbErr, message: &str) -> Self {
        if is_unique_violation(&err) {
            AppError::Conflict(message.to_string())
        } else {
            AppError::DatabaseError(err)
        }
    }

    pub fn status_code_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::ValidationError(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::AuthError(_) | AppError::JwtError(_) => {
                (StatusCode::UNAUTHORIZED, "AUTH_ERROR")
            }
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            AppError::Expired(_) => (StatusCode::GONE, "EXPIRED"),
            AppError::RateLimited(_) => (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED"),
            AppError::ExternalApiError(_) | AppError::ReqwestError(_) => {
                (StatusCode::BAD_GATEWAY, "EXTERNAL_API_ERROR")
            }
            AppError::DatabaseError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
            AppError::ConfigError(_)
            | AppError::InternalError(_)
            | AppError::SerdeJsonError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// The store's own wording of a unique violation (constraint name on
/// Postgres, column list on SQLite), or `None` for any other error.
pub fn unique_violation_detail(err: &DbErr) -> Option<String> {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => Some(detail),
        _ => None,
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status_code_and_code().0
    }

    fn error_response(&self) -> HttpResponse {
        let (status_code, error_code) = self.status_code_and_code();
        let message = match self {
            AppError::ValidationError(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::Forbidden(msg)
            | AppError::Expired(msg)
            | AppError::RateLimited(msg) => {
                log::warn!("{error_code}: {msg}");
                msg.clone()
            }
            AppError::AuthError(msg) => {
                log::warn!("Authentication error: {msg}");
                msg.clone()
            }
            AppError::JwtError(err) => {
                log::warn!("Token rejected: {err}");
                "Invalid or expired token".to_string()
            }
            AppError::ExternalApiError(msg) => {
                log::error!("External API error: {msg}");
                msg.clone()
            }
            AppError::ReqwestError(err) => {
                log::error!("Upstream request failed: {err}");
                "Upstream service unavailable".to_string()
            }
            AppError::DatabaseError(err) => {
                log::error!("Database error: {err}");
                "Database error".to_string()
            }
            _ => {
                log::error!("Internal error: {self}");
                "Internal server error".to_string()
            }
        };

        HttpResponse::build(status_code).json(json!({
            "success": false,
            "error": {
                "code": error_code,
                "message": message
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::NotFound("x".into()), 404, "NOT_FOUND"),
            (AppError::Conflict("x".into()), 409, "CONFLICT"),
            (AppError::Forbidden("x".into()), 403, "FORBIDDEN"),
            (AppError::ValidationError("x".into()), 400, "VALIDATION_ERROR"),
            (AppError::Expired("x".into()), 410, "EXPIRED"),
            (AppError::RateLimited("x".into()), 429, "RATE_LIMITED"),
            (AppError::ExternalApiError("x".into()), 502, "EXTERNAL_API_ERROR"),
            (AppError::AuthError("x".into()), 401, "AUTH_ERROR"),
        ];
        for (err, status, code) in cases {
            let (s, c) = err.status_code_and_code();
            assert_eq!(s.as_u16(), status);
            assert_eq!(c, code);
        }
    }

    #[test]
    fn test_non_unique_db_error_is_kept() {
        let err = AppError::from_db_unique(DbErr::RecordNotFound("x".into()), "dup");
        assert!(matches!(err, AppError::DatabaseError(_)));
    }
}
