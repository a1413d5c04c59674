use crate::models::UserResponse;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Staged registration payload. Nothing is written to `users` until the
/// emailed code is confirmed.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RequestCodeRequest {
    #[schema(example = "ana.quispe@example.com")]
    pub email: String,
    #[schema(example = "Ana")]
    pub first_name: String,
    #[serde(default)]
    #[schema(example = "María")]
    pub middle_name: Option<String>,
    #[schema(example = "Quispe")]
    pub last_name: String,
    /// "N/A" when the student has none.
    #[schema(example = "Mamani")]
    pub second_last_name: String,
    #[schema(example = "clave-segura")]
    pub password: String,
    #[serde(default)]
    #[schema(example = "+51987654321")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResendCodeRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConfirmCodeRequest {
    pub email: String,
    #[schema(example = "123456")]
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RefreshTokenRequest {
    pub refresh: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PasswordResetConfirmRequest {
    pub email: String,
    pub code: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RefreshResponse {
    pub access_token: String,
    pub expires_in: i64,
}
