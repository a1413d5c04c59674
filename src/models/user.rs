use crate::entities::{UserRole, user_entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub email: String,
    pub username: String,
    pub full_name: String,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub second_last_name: String,
    pub role: UserRole,
    pub phone: String,
    pub avatar: Option<String>,
    pub yape_qr: Option<String>,
    pub plin_qr: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<user_entity::Model> for UserResponse {
    fn from(user: user_entity::Model) -> Self {
        Self {
            full_name: user.full_name(),
            id: user.id,
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            middle_name: user.middle_name,
            last_name: user.last_name,
            second_last_name: user.second_last_name,
            role: user.role,
            phone: user.phone,
            avatar: user.avatar,
            yape_qr: user.yape_qr,
            plin_qr: user.plin_qr,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProfileEnrollment {
    pub enrollment_id: i32,
    pub course_id: i32,
    pub course_title: String,
    pub is_paid: bool,
    pub approved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub user: UserResponse,
    pub enrolled_courses_count: u64,
    pub approved_enrollments: Vec<ProfileEnrollment>,
}

/// Self-service profile patch. Email, username and role are read-only here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub second_last_name: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub yape_qr: Option<String>,
    pub plin_qr: Option<String>,
}

impl UpdateProfileRequest {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.middle_name.is_none()
            && self.last_name.is_none()
            && self.second_last_name.is_none()
            && self.phone.is_none()
            && self.avatar.is_none()
            && self.yape_qr.is_none()
            && self.plin_qr.is_none()
    }
}

/// Administrative patch: the profile fields plus the role.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct AdminUpdateUserRequest {
    #[serde(flatten)]
    pub profile: UpdateProfileRequest,
    pub role: Option<UserRole>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct UserListQuery {
    pub role: Option<UserRole>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}
